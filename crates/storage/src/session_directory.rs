//! Redis-backed presence directory.
//!
//! One JSON record per user at `session:{user_id}` with a TTL, plus a
//! per-room set at `room_sessions:{room_id}` for the active-user lookup.
//! Records vanish on TTL expiry, so the room index is pruned lazily.

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use uuid::Uuid;

use huddle_domain::{SessionDirectory, UserSession};

#[derive(Clone)]
pub struct RedisSessionDirectory {
    conn: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisSessionDirectory {
    pub fn new(conn: ConnectionManager, ttl_seconds: u64) -> Self {
        Self { conn, ttl_seconds }
    }

    fn session_key(user_id: Uuid) -> String {
        format!("session:{user_id}")
    }

    fn room_key(room_id: Uuid) -> String {
        format!("room_sessions:{room_id}")
    }

    async fn write_session(&self, session: &UserSession) -> Result<()> {
        let payload = serde_json::to_string(session).context("failed to serialize session")?;

        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::session_key(session.user_id), payload, self.ttl_seconds)
            .await
            .context("failed to store session")?;

        if let Some(room_id) = session.room_id {
            conn.sadd::<_, _, ()>(Self::room_key(room_id), session.user_id.to_string())
                .await
                .context("failed to index session by room")?;
        }
        Ok(())
    }
}

#[async_trait]
impl SessionDirectory for RedisSessionDirectory {
    async fn create_session(&self, session: &UserSession) -> Result<()> {
        self.write_session(session).await
    }

    async fn get_session(&self, user_id: Uuid) -> Result<Option<UserSession>> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn
            .get(Self::session_key(user_id))
            .await
            .context("failed to read session")?;

        payload
            .map(|p| serde_json::from_str(&p).context("failed to deserialize session"))
            .transpose()
    }

    async fn update_session(&self, session: &UserSession) -> Result<()> {
        self.write_session(session).await
    }

    async fn delete_session(&self, user_id: Uuid) -> Result<()> {
        let mut conn = self.conn.clone();

        // Unlink from the room index before the record disappears.
        if let Some(session) = self.get_session(user_id).await? {
            if let Some(room_id) = session.room_id {
                conn.srem::<_, _, ()>(Self::room_key(room_id), user_id.to_string())
                    .await
                    .context("failed to remove session from room index")?;
            }
        }

        conn.del::<_, ()>(Self::session_key(user_id))
            .await
            .context("failed to delete session")?;
        Ok(())
    }

    async fn get_active_users(&self, room_id: Uuid) -> Result<Vec<Uuid>> {
        let mut conn = self.conn.clone();
        let members: Vec<String> = conn
            .smembers(Self::room_key(room_id))
            .await
            .context("failed to read room index")?;

        let mut active = Vec::with_capacity(members.len());
        for member in members {
            let user_id = Uuid::parse_str(&member).context("malformed user id in room index")?;

            // Sessions expire on their own; prune index entries whose
            // record is gone.
            let exists: bool = conn
                .exists(Self::session_key(user_id))
                .await
                .context("failed to check session liveness")?;
            if exists {
                active.push(user_id);
            } else {
                conn.srem::<_, _, ()>(Self::room_key(room_id), member)
                    .await
                    .context("failed to prune stale room index entry")?;
            }
        }
        Ok(active)
    }
}
