//! Huddle Storage Crate
//!
//! Concrete backends for the domain's store and directory contracts:
//! SQLite for rooms and users, Redis for chat history and presence.

pub mod chat_history;
pub mod connection;
pub mod migrations;
pub mod room_store;
pub mod session_directory;
pub mod user_store;

pub use chat_history::RedisChatHistory;
pub use connection::prepare_database;
pub use migrations::run_migrations;
pub use room_store::SqliteRoomStore;
pub use session_directory::RedisSessionDirectory;
pub use user_store::SqliteUserStore;

use huddle_config::DatabaseConfig;
use sqlx::SqlitePool;

/// Prepare the database connection and apply migrations.
pub async fn initialize_database(config: &DatabaseConfig) -> anyhow::Result<SqlitePool> {
    let pool = prepare_database(config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
