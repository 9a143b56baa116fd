//! Redis-backed chat history.
//!
//! Each room's history lives in a list at `chat_history:{room_id}`,
//! trimmed to a bounded length on every write and expiring after a quiet
//! period. Messages are stored in their wire JSON form.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use uuid::Uuid;

use huddle_domain::{ChatHistoryStore, Message, StoreError, StoreResult};

#[derive(Clone)]
pub struct RedisChatHistory {
    conn: ConnectionManager,
    max_len: i64,
    ttl_seconds: u64,
}

impl RedisChatHistory {
    pub fn new(conn: ConnectionManager, max_len: i64, ttl_seconds: u64) -> Self {
        Self {
            conn,
            max_len,
            ttl_seconds,
        }
    }

    fn key(room_id: Uuid) -> String {
        format!("chat_history:{room_id}")
    }
}

fn backend(err: redis::RedisError) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl ChatHistoryStore for RedisChatHistory {
    async fn save_chat_message(&self, message: &Message) -> StoreResult<()> {
        let key = Self::key(message.room_id);
        let payload = message.to_json()?;

        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(&key, payload).await.map_err(backend)?;
        conn.ltrim::<_, ()>(&key, -(self.max_len as isize), -1)
            .await
            .map_err(backend)?;
        conn.expire::<_, ()>(&key, self.ttl_seconds as i64)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn get_chat_history(&self, room_id: Uuid, limit: i64) -> StoreResult<Vec<Message>> {
        let key = Self::key(room_id);

        let mut conn = self.conn.clone();
        let entries: Vec<String> = conn
            .lrange(&key, -(limit as isize), -1)
            .await
            .map_err(backend)?;

        entries
            .iter()
            .map(|entry| Message::from_json(entry).map_err(StoreError::from))
            .collect()
    }

    async fn delete_chat_history(&self, room_id: Uuid) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::key(room_id)).await.map_err(backend)?;
        Ok(())
    }
}
