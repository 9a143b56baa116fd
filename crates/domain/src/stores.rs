//! Durable-store contracts. Implementations live in the storage crate;
//! orchestrators depend only on these traits.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::StoreResult;
use crate::message::Message;
use crate::room::Room;
use crate::user::User;

/// Persistence for room aggregates.
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn create(&self, room: &Room) -> StoreResult<()>;

    /// `None` means the room does not exist; backend faults are errors.
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Room>>;

    async fn get_by_host(&self, host_id: Uuid) -> StoreResult<Vec<Room>>;

    async fn update(&self, room: &Room) -> StoreResult<()>;

    async fn delete(&self, id: Uuid) -> StoreResult<()>;

    /// Rooms whose expiry has not passed yet.
    async fn get_active_rooms(&self) -> StoreResult<Vec<Room>>;

    /// Remove every expired room, returning how many were deleted.
    async fn cleanup_expired_rooms(&self) -> StoreResult<u64>;
}

/// Persistence for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: &User) -> StoreResult<()>;

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn get_by_provider_id(&self, provider_id: &str) -> StoreResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn update(&self, user: &User) -> StoreResult<()>;

    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

/// Bounded per-room chat history.
#[async_trait]
pub trait ChatHistoryStore: Send + Sync {
    async fn save_chat_message(&self, message: &Message) -> StoreResult<()>;

    /// Most recent `limit` messages in chronological order.
    async fn get_chat_history(&self, room_id: Uuid, limit: i64) -> StoreResult<Vec<Message>>;

    async fn delete_chat_history(&self, room_id: Uuid) -> StoreResult<()>;
}
