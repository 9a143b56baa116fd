//! Chat message orchestration: authorization, history persistence, and
//! broadcast fan-out.

use tracing::debug;
use uuid::Uuid;

use huddle_domain::{
    best_effort, ChatHistoryStore, Message, MessageError, MessageResult, RealtimeNotifier, Room,
    RoomStore, UserStore,
};

/// History page size when the caller does not supply a positive limit.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Routes chat messages through authorization, durable history, and the
/// real-time channel.
pub struct MessageOrchestrator<H, R, U, N> {
    history: H,
    rooms: R,
    users: U,
    notifier: N,
}

impl<H, R, U, N> MessageOrchestrator<H, R, U, N>
where
    H: ChatHistoryStore,
    R: RoomStore,
    U: UserStore,
    N: RealtimeNotifier,
{
    pub fn new(history: H, rooms: R, users: U, notifier: N) -> Self {
        Self {
            history,
            rooms,
            users,
            notifier,
        }
    }

    /// Send a chat message into a room. History persistence is the critical
    /// write; the broadcast is advisory.
    pub async fn send_message(
        &self,
        sender_id: Uuid,
        room_id: Uuid,
        text: &str,
    ) -> MessageResult<Message> {
        let sender = self
            .users
            .get_by_id(sender_id)
            .await?
            .ok_or(MessageError::UserNotFound { id: sender_id })?;

        let room = self.load_room(room_id).await?;
        if room.is_expired() {
            return Err(MessageError::RoomExpired);
        }
        if !room.is_participant(sender_id) {
            return Err(MessageError::NotParticipant { user_id: sender_id });
        }

        let message = Message::chat(sender_id, room_id, text, sender.name.clone());
        if !message.is_valid() {
            return Err(MessageError::InvalidMessage);
        }

        self.history.save_chat_message(&message).await?;
        best_effort(
            "broadcast_chat_message",
            self.notifier.broadcast_chat_message(&message).await,
        );

        debug!(%room_id, %sender_id, message_id = %message.id, "chat message sent");
        Ok(message)
    }

    /// Fetch the most recent chat messages for a participant. A
    /// non-positive limit falls back to [`DEFAULT_HISTORY_LIMIT`].
    pub async fn get_history(
        &self,
        user_id: Uuid,
        room_id: Uuid,
        limit: i64,
    ) -> MessageResult<Vec<Message>> {
        let room = self.load_room(room_id).await?;
        if !room.is_participant(user_id) {
            return Err(MessageError::NotParticipant { user_id });
        }

        let limit = if limit <= 0 { DEFAULT_HISTORY_LIMIT } else { limit };
        Ok(self.history.get_chat_history(room_id, limit).await?)
    }

    /// Erase a room's chat history. Host only.
    pub async fn delete_history(&self, acting_user_id: Uuid, room_id: Uuid) -> MessageResult<()> {
        let room = self.load_room(room_id).await?;
        if !room.is_host(acting_user_id) {
            return Err(MessageError::NotHost {
                user_id: acting_user_id,
            });
        }

        self.history.delete_chat_history(room_id).await?;
        Ok(())
    }

    async fn load_room(&self, room_id: Uuid) -> MessageResult<Room> {
        self.rooms
            .get_by_id(room_id)
            .await?
            .ok_or(MessageError::RoomNotFound { id: room_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_stores::{
        MemoryChatHistory, MemoryRoomStore, MemoryUserStore, RecordingNotifier,
    };
    use huddle_domain::{MessagePayload, Room, User};

    struct Fixture {
        orch: MessageOrchestrator<MemoryChatHistory, MemoryRoomStore, MemoryUserStore, RecordingNotifier>,
        history: MemoryChatHistory,
        notifier: RecordingNotifier,
        host_id: Uuid,
        guest_id: Uuid,
        room_id: Uuid,
        rooms: MemoryRoomStore,
        users: MemoryUserStore,
    }

    async fn fixture() -> Fixture {
        let history = MemoryChatHistory::new();
        let rooms = MemoryRoomStore::new();
        let users = MemoryUserStore::new();
        let notifier = RecordingNotifier::new();

        let host = User::new("google-alice", "alice@example.com", "Alice", "");
        let guest = User::new("google-bob", "bob@example.com", "Bob", "");
        let host_id = host.id;
        let guest_id = guest.id;
        users.insert(host);
        users.insert(guest);

        let mut room = Room::new("standup", host_id, false);
        room.add_participant(host_id).unwrap();
        room.add_participant(guest_id).unwrap();
        let room_id = room.id;
        rooms.create(&room).await.unwrap();

        let orch = MessageOrchestrator::new(
            history.clone(),
            rooms.clone(),
            users.clone(),
            notifier.clone(),
        );
        Fixture {
            orch,
            history,
            notifier,
            host_id,
            guest_id,
            room_id,
            rooms,
            users,
        }
    }

    #[tokio::test]
    async fn test_send_message_persists_and_broadcasts() {
        let f = fixture().await;

        let message = f.orch.send_message(f.guest_id, f.room_id, "hello").await.unwrap();

        assert_eq!(message.sender_user_id, Some(f.guest_id));
        match &message.payload {
            MessagePayload::Chat { message, user_name } => {
                assert_eq!(message, "hello");
                assert_eq!(user_name, "Bob");
            }
            other => panic!("expected chat payload, got {other:?}"),
        }

        let stored = f.history.get_chat_history(f.room_id, 10).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, message.id);
        assert_eq!(f.notifier.broadcast_ids(), vec![message.id]);
    }

    #[tokio::test]
    async fn test_send_message_unknown_sender() {
        let f = fixture().await;
        let ghost = Uuid::new_v4();

        let result = f.orch.send_message(ghost, f.room_id, "hi").await;
        assert!(matches!(result, Err(MessageError::UserNotFound { id }) if id == ghost));
        assert_eq!(f.history.save_calls(), 0);
    }

    #[tokio::test]
    async fn test_send_message_unknown_room() {
        let f = fixture().await;
        let missing = Uuid::new_v4();

        let result = f.orch.send_message(f.guest_id, missing, "hi").await;
        assert!(matches!(result, Err(MessageError::RoomNotFound { id }) if id == missing));
    }

    #[tokio::test]
    async fn test_send_message_expired_room() {
        let f = fixture().await;
        f.rooms.expire(f.room_id);

        let result = f.orch.send_message(f.guest_id, f.room_id, "hi").await;
        assert!(matches!(result, Err(MessageError::RoomExpired)));
        assert_eq!(f.history.save_calls(), 0);
    }

    #[tokio::test]
    async fn test_send_message_non_participant_never_touches_history() {
        let f = fixture().await;
        let outsider = User::new("google-eve", "eve@example.com", "Eve", "");
        let outsider_id = outsider.id;
        f.users.insert(outsider);

        let result = f.orch.send_message(outsider_id, f.room_id, "hi").await;
        assert!(matches!(
            result,
            Err(MessageError::NotParticipant { user_id }) if user_id == outsider_id
        ));
        assert_eq!(f.history.save_calls(), 0);
        assert!(f.notifier.broadcast_ids().is_empty());
    }

    #[tokio::test]
    async fn test_send_message_survives_broadcast_failure() {
        let f = fixture().await;
        let orch = MessageOrchestrator::new(
            f.history.clone(),
            f.rooms.clone(),
            f.users.clone(),
            RecordingNotifier::failing(),
        );

        let message = orch.send_message(f.host_id, f.room_id, "still works").await.unwrap();
        let stored = f.history.get_chat_history(f.room_id, 10).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, message.id);
    }

    #[tokio::test]
    async fn test_get_history_requires_participation() {
        let f = fixture().await;
        f.orch.send_message(f.host_id, f.room_id, "one").await.unwrap();

        let outsider = User::new("google-eve", "eve@example.com", "Eve", "");
        let outsider_id = outsider.id;
        f.users.insert(outsider);

        let result = f.orch.get_history(outsider_id, f.room_id, 10).await;
        assert!(matches!(result, Err(MessageError::NotParticipant { .. })));

        let history = f.orch.get_history(f.guest_id, f.room_id, 10).await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_get_history_default_limit() {
        let f = fixture().await;
        for i in 0..60 {
            f.orch
                .send_message(f.host_id, f.room_id, &format!("msg {i}"))
                .await
                .unwrap();
        }

        let history = f.orch.get_history(f.host_id, f.room_id, 0).await.unwrap();
        assert_eq!(history.len() as i64, DEFAULT_HISTORY_LIMIT);

        let negative = f.orch.get_history(f.host_id, f.room_id, -5).await.unwrap();
        assert_eq!(negative.len() as i64, DEFAULT_HISTORY_LIMIT);
    }

    #[tokio::test]
    async fn test_delete_history_host_only() {
        let f = fixture().await;
        f.orch.send_message(f.host_id, f.room_id, "one").await.unwrap();

        let result = f.orch.delete_history(f.guest_id, f.room_id).await;
        assert!(matches!(
            result,
            Err(MessageError::NotHost { user_id }) if user_id == f.guest_id
        ));
        assert_eq!(f.history.get_chat_history(f.room_id, 10).await.unwrap().len(), 1);

        f.orch.delete_history(f.host_id, f.room_id).await.unwrap();
        assert!(f.history.get_chat_history(f.room_id, 10).await.unwrap().is_empty());
    }
}
