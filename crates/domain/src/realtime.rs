//! Real-time collaborator contracts: presence directory and client
//! notification fan-out. Both are advisory; orchestrators call them
//! through [`crate::effects::best_effort`] after the durable write commits.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::message::Message;
use crate::room::Room;
use crate::session::UserSession;

/// Fan-out of room and message events to connected clients.
#[async_trait]
pub trait RealtimeNotifier: Send + Sync {
    async fn notify_room_joined(&self, room_id: Uuid, user_id: Uuid, display_name: &str) -> Result<()>;

    async fn notify_room_left(&self, room_id: Uuid, user_id: Uuid, display_name: &str) -> Result<()>;

    async fn notify_user_muted(&self, room_id: Uuid, user_id: Uuid, is_muted: bool) -> Result<()>;

    async fn broadcast_chat_message(&self, message: &Message) -> Result<()>;

    async fn send_direct_message(&self, message: &Message) -> Result<()>;

    async fn notify_room_update(&self, room: &Room) -> Result<()>;
}

/// Shared presence directory keyed by user.
#[async_trait]
pub trait SessionDirectory: Send + Sync {
    async fn create_session(&self, session: &UserSession) -> Result<()>;

    async fn get_session(&self, user_id: Uuid) -> Result<Option<UserSession>>;

    async fn update_session(&self, session: &UserSession) -> Result<()>;

    async fn delete_session(&self, user_id: Uuid) -> Result<()>;

    /// Users with a live session in the given room.
    async fn get_active_users(&self, room_id: Uuid) -> Result<Vec<Uuid>>;
}
