use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use sqlx::SqlitePool;
use tracing::{info, warn};

use huddle_config::AppConfig;
use huddle_domain::RoomStore;
use huddle_orchestrator::{MessageOrchestrator, RoomOrchestrator, UserOrchestrator};
use huddle_realtime::BroadcastNotifier;
use huddle_storage::{
    initialize_database, RedisChatHistory, RedisSessionDirectory, SqliteRoomStore, SqliteUserStore,
};

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::INFO)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Capacity of the in-process event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

pub type RoomService =
    RoomOrchestrator<SqliteRoomStore, SqliteUserStore, RedisSessionDirectory, BroadcastNotifier>;
pub type MessageService =
    MessageOrchestrator<RedisChatHistory, SqliteRoomStore, SqliteUserStore, BroadcastNotifier>;
pub type UserService = UserOrchestrator<SqliteUserStore, RedisSessionDirectory>;

pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub redis_conn: ConnectionManager,
    pub notifier: BroadcastNotifier,
    pub rooms: RoomService,
    pub messages: MessageService,
    pub users: UserService,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database).await?;

        let redis_client = redis::Client::open(config.redis.url.as_str())
            .with_context(|| format!("invalid redis url {}", config.redis.url))?;
        let redis_conn = ConnectionManager::new(redis_client)
            .await
            .with_context(|| format!("failed to connect to redis at {}", config.redis.url))?;
        info!(url = %config.redis.url, "redis connection established");

        let room_store = SqliteRoomStore::new(db_pool.clone());
        let user_store = SqliteUserStore::new(db_pool.clone());
        let history = RedisChatHistory::new(
            redis_conn.clone(),
            config.rooms.history_limit,
            config.rooms.history_ttl_seconds,
        );
        let sessions = RedisSessionDirectory::new(redis_conn.clone(), config.sessions.ttl_seconds);
        let notifier = BroadcastNotifier::new(EVENT_CHANNEL_CAPACITY);

        let rooms = RoomOrchestrator::new(
            room_store.clone(),
            user_store.clone(),
            sessions.clone(),
            notifier.clone(),
        );
        let messages = MessageOrchestrator::new(
            history,
            room_store,
            user_store.clone(),
            notifier.clone(),
        );
        let users = UserOrchestrator::new(user_store, sessions);

        info!("backend services ready");
        Ok(Self {
            db_pool,
            redis_conn,
            notifier,
            rooms,
            messages,
            users,
        })
    }
}

/// Periodically remove expired rooms from the store.
pub fn spawn_expiry_sweeper<R>(store: R, every: std::time::Duration) -> tokio::task::JoinHandle<()>
where
    R: RoomStore + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match store.cleanup_expired_rooms().await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "expiry sweep removed rooms"),
                Err(error) => warn!(?error, "expiry sweep failed"),
            }
        }
    })
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
