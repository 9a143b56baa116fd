//! SQLite-backed user store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use huddle_domain::{StoreError, StoreResult, User, UserStore};

#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> StoreResult<User> {
        let id: String = row.try_get("id").map_err(backend)?;
        let created_at: String = row.try_get("created_at").map_err(backend)?;

        Ok(User {
            id: Uuid::parse_str(&id).map_err(|e| StoreError::Serialization(e.to_string()))?,
            provider_id: row.try_get("provider_id").map_err(backend)?,
            email: row.try_get("email").map_err(backend)?,
            name: row.try_get("name").map_err(backend)?,
            avatar_url: row.try_get("avatar_url").map_err(backend)?,
            created_at: parse_timestamp(&created_at)?,
        })
    }

    async fn fetch_one_by(&self, column: &str, value: &str) -> StoreResult<Option<User>> {
        let query = format!("SELECT * FROM users WHERE {column} = ?");
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.map(|row| Self::user_from_row(&row)).transpose()
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn parse_timestamp(value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn create(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO users (id, provider_id, email, name, avatar_url, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.provider_id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.avatar_url)
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.fetch_one_by("id", &id.to_string()).await
    }

    async fn get_by_provider_id(&self, provider_id: &str) -> StoreResult<Option<User>> {
        self.fetch_one_by("provider_id", provider_id).await
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.fetch_one_by("email", email).await
    }

    async fn update(&self, user: &User) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE users SET provider_id = ?, email = ?, name = ?, avatar_url = ? WHERE id = ?",
        )
        .bind(&user.provider_id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.avatar_url)
        .bind(user.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
