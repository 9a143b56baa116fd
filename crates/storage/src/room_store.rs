//! SQLite-backed room store.
//!
//! Rooms are persisted as whole aggregates: scalar columns for the fields
//! queries filter on, and the roster as a JSON column. Timestamps are
//! stored as RFC 3339 text, so expiry comparisons happen in Rust after
//! loading rather than in SQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use huddle_domain::{Participant, Room, RoomStore, StoreError, StoreResult};

#[derive(Clone)]
pub struct SqliteRoomStore {
    pool: SqlitePool,
}

impl SqliteRoomStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn room_from_row(row: &sqlx::sqlite::SqliteRow) -> StoreResult<Room> {
        let id: String = row.try_get("id").map_err(backend)?;
        let host_id: String = row.try_get("host_id").map_err(backend)?;
        let created_at: String = row.try_get("created_at").map_err(backend)?;
        let expires_at: String = row.try_get("expires_at").map_err(backend)?;
        let participants: String = row.try_get("participants").map_err(backend)?;
        let max_capacity: i64 = row.try_get("max_capacity").map_err(backend)?;

        Ok(Room {
            id: parse_uuid(&id)?,
            name: row.try_get("name").map_err(backend)?,
            host_id: parse_uuid(&host_id)?,
            is_waiting_room: row.try_get("is_waiting_room").map_err(backend)?,
            created_at: parse_timestamp(&created_at)?,
            expires_at: parse_timestamp(&expires_at)?,
            participants: serde_json::from_str::<Vec<Participant>>(&participants)?,
            max_capacity: max_capacity as usize,
        })
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn parse_uuid(value: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn parse_timestamp(value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

#[async_trait]
impl RoomStore for SqliteRoomStore {
    async fn create(&self, room: &Room) -> StoreResult<()> {
        let participants = serde_json::to_string(&room.participants)?;
        sqlx::query(
            "INSERT INTO rooms (id, name, host_id, is_waiting_room, created_at, expires_at, max_capacity, participants)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(room.id.to_string())
        .bind(&room.name)
        .bind(room.host_id.to_string())
        .bind(room.is_waiting_room)
        .bind(room.created_at.to_rfc3339())
        .bind(room.expires_at.to_rfc3339())
        .bind(room.max_capacity as i64)
        .bind(participants)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Room>> {
        let row = sqlx::query("SELECT * FROM rooms WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.map(|row| Self::room_from_row(&row)).transpose()
    }

    async fn get_by_host(&self, host_id: Uuid) -> StoreResult<Vec<Room>> {
        let rows = sqlx::query("SELECT * FROM rooms WHERE host_id = ? ORDER BY created_at")
            .bind(host_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        rows.iter().map(Self::room_from_row).collect()
    }

    async fn update(&self, room: &Room) -> StoreResult<()> {
        let participants = serde_json::to_string(&room.participants)?;
        let result = sqlx::query(
            "UPDATE rooms
             SET name = ?, host_id = ?, is_waiting_room = ?, expires_at = ?, max_capacity = ?, participants = ?
             WHERE id = ?",
        )
        .bind(&room.name)
        .bind(room.host_id.to_string())
        .bind(room.is_waiting_room)
        .bind(room.expires_at.to_rfc3339())
        .bind(room.max_capacity as i64)
        .bind(participants)
        .bind(room.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn get_active_rooms(&self) -> StoreResult<Vec<Room>> {
        let rows = sqlx::query("SELECT * FROM rooms")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        let rooms: StoreResult<Vec<Room>> = rows.iter().map(Self::room_from_row).collect();
        Ok(rooms?.into_iter().filter(|r| !r.is_expired()).collect())
    }

    async fn cleanup_expired_rooms(&self) -> StoreResult<u64> {
        let rows = sqlx::query("SELECT * FROM rooms")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        let mut removed = 0u64;
        for row in &rows {
            let room = Self::room_from_row(row)?;
            if !room.is_expired() {
                continue;
            }
            let result = sqlx::query("DELETE FROM rooms WHERE id = ?")
                .bind(room.id.to_string())
                .execute(&self.pool)
                .await
                .map_err(backend)?;
            removed += result.rows_affected();
        }

        if removed > 0 {
            info!(removed, "expired rooms cleaned up");
        }
        Ok(removed)
    }
}
