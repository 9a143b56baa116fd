//! Room lifecycle orchestration.
//!
//! Each operation follows the same shape: load the aggregate, apply the
//! domain operation, persist the result (the critical write), then run the
//! advisory side effects (session directory, client notifications) through
//! the best-effort policy.

use chrono::Duration;
use tracing::info;
use uuid::Uuid;

use huddle_domain::{
    best_effort, RealtimeNotifier, Room, RoomError, RoomResult, RoomStore, SessionDirectory,
    UserSession, UserStore,
};

/// Coordinates room state between the durable store, the session
/// directory, and the real-time channel.
pub struct RoomOrchestrator<R, U, S, N> {
    rooms: R,
    users: U,
    sessions: S,
    notifier: N,
}

impl<R, U, S, N> RoomOrchestrator<R, U, S, N>
where
    R: RoomStore,
    U: UserStore,
    S: SessionDirectory,
    N: RealtimeNotifier,
{
    pub fn new(rooms: R, users: U, sessions: S, notifier: N) -> Self {
        Self {
            rooms,
            users,
            sessions,
            notifier,
        }
    }

    /// Create a room with the given user as host. The host is seated on the
    /// roster before the room is first persisted, so an empty hosted room is
    /// never observable.
    pub async fn create_room(
        &self,
        host_id: Uuid,
        name: &str,
        is_waiting_room: bool,
    ) -> RoomResult<Room> {
        self.users
            .get_by_id(host_id)
            .await?
            .ok_or(RoomError::HostNotFound { id: host_id })?;

        let mut room = Room::new(name, host_id, is_waiting_room);
        room.add_participant(host_id)?;
        self.rooms.create(&room).await?;

        info!(room_id = %room.id, %host_id, "room created");
        Ok(room)
    }

    /// Seat a user in a room. The roster update is the critical write;
    /// presence and notification failures are logged and swallowed.
    pub async fn join_room(&self, user_id: Uuid, room_id: Uuid) -> RoomResult<Room> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(RoomError::UserNotFound { id: user_id })?;

        let mut room = self.load_room(room_id).await?;
        if room.is_expired() {
            return Err(RoomError::RoomExpired);
        }

        room.add_participant(user_id)?;
        self.rooms.update(&room).await?;

        let session = UserSession::joined(user_id, room_id, room.is_host(user_id));
        best_effort("create_session", self.sessions.create_session(&session).await);
        best_effort(
            "notify_room_joined",
            self.notifier
                .notify_room_joined(room_id, user_id, &user.name)
                .await,
        );

        Ok(room)
    }

    /// Remove a user from a room. When the last participant leaves, the
    /// room is deleted instead of updated.
    pub async fn leave_room(&self, user_id: Uuid, room_id: Uuid) -> RoomResult<()> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(RoomError::UserNotFound { id: user_id })?;

        let mut room = self.load_room(room_id).await?;
        room.remove_participant(user_id)?;

        if room.participants.is_empty() {
            self.rooms.delete(room_id).await?;
            info!(%room_id, "room deleted after last participant left");
        } else {
            self.rooms.update(&room).await?;
        }

        best_effort("delete_session", self.sessions.delete_session(user_id).await);
        best_effort(
            "notify_room_left",
            self.notifier
                .notify_room_left(room_id, user_id, &user.name)
                .await,
        );

        Ok(())
    }

    /// Host-initiated mute of a participant.
    pub async fn mute_participant(
        &self,
        acting_user_id: Uuid,
        room_id: Uuid,
        target_user_id: Uuid,
    ) -> RoomResult<()> {
        let mut room = self.load_room(room_id).await?;
        room.mute_participant(acting_user_id, target_user_id)?;
        self.rooms.update(&room).await?;

        self.publish_mute_state(room_id, target_user_id, true).await;
        Ok(())
    }

    /// Self-service unmute. No authority check: users always control their
    /// own microphone.
    pub async fn unmute_participant(&self, user_id: Uuid, room_id: Uuid) -> RoomResult<()> {
        let mut room = self.load_room(room_id).await?;
        room.unmute_participant(user_id)?;
        self.rooms.update(&room).await?;

        self.publish_mute_state(room_id, user_id, false).await;
        Ok(())
    }

    /// Fetch a room, rejecting expired ones. Expired rooms are left in
    /// place for the sweeper to collect.
    pub async fn get_room(&self, room_id: Uuid) -> RoomResult<Room> {
        let room = self.load_room(room_id).await?;
        if room.is_expired() {
            return Err(RoomError::RoomExpired);
        }
        Ok(room)
    }

    /// Rooms hosted by a user, with expired ones filtered out.
    pub async fn get_user_rooms(&self, host_id: Uuid) -> RoomResult<Vec<Room>> {
        let rooms = self.rooms.get_by_host(host_id).await?;
        Ok(rooms.into_iter().filter(|r| !r.is_expired()).collect())
    }

    /// Push a room's expiry out by `hours`. Host only.
    pub async fn extend_room_expiry(
        &self,
        acting_user_id: Uuid,
        room_id: Uuid,
        hours: i64,
    ) -> RoomResult<Room> {
        let mut room = self.load_room(room_id).await?;
        if !room.is_host(acting_user_id) {
            return Err(RoomError::NotHost {
                user_id: acting_user_id,
            });
        }

        room.extend_expiry(Duration::hours(hours));
        self.rooms.update(&room).await?;

        best_effort("notify_room_update", self.notifier.notify_room_update(&room).await);
        Ok(room)
    }

    async fn load_room(&self, room_id: Uuid) -> RoomResult<Room> {
        self.rooms
            .get_by_id(room_id)
            .await?
            .ok_or(RoomError::RoomNotFound { id: room_id })
    }

    /// Mirror a mute change into the session directory and notify clients.
    /// A missing session just means the user connected without presence.
    async fn publish_mute_state(&self, room_id: Uuid, user_id: Uuid, is_muted: bool) {
        let refresh: anyhow::Result<()> = async {
            if let Some(mut session) = self.sessions.get_session(user_id).await? {
                session.is_muted = is_muted;
                self.sessions.update_session(&session).await?;
            }
            Ok(())
        }
        .await;
        best_effort("refresh_session_mute", refresh);
        best_effort(
            "notify_user_muted",
            self.notifier.notify_user_muted(room_id, user_id, is_muted).await,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_stores::{
        MemoryRoomStore, MemorySessionDirectory, MemoryUserStore, RecordingNotifier,
    };
    use huddle_domain::User;

    fn orchestrator() -> (
        RoomOrchestrator<MemoryRoomStore, MemoryUserStore, MemorySessionDirectory, RecordingNotifier>,
        MemoryRoomStore,
        MemoryUserStore,
        MemorySessionDirectory,
        RecordingNotifier,
    ) {
        let rooms = MemoryRoomStore::new();
        let users = MemoryUserStore::new();
        let sessions = MemorySessionDirectory::new();
        let notifier = RecordingNotifier::new();
        let orch = RoomOrchestrator::new(
            rooms.clone(),
            users.clone(),
            sessions.clone(),
            notifier.clone(),
        );
        (orch, rooms, users, sessions, notifier)
    }

    fn seed_user(users: &MemoryUserStore, name: &str) -> Uuid {
        let user = User::new(format!("google-{name}"), format!("{name}@example.com"), name, "");
        let id = user.id;
        users.insert(user);
        id
    }

    #[tokio::test]
    async fn test_create_room_seats_host() {
        let (orch, rooms, users, _, _) = orchestrator();
        let host_id = seed_user(&users, "alice");

        let room = orch.create_room(host_id, "standup", false).await.unwrap();

        assert_eq!(room.host_id, host_id);
        assert!(room.is_participant(host_id));
        assert!(room.get_participant(host_id).unwrap().is_host);

        let stored = rooms.get_by_id(room.id).await.unwrap().unwrap();
        assert_eq!(stored.participant_count(), 1);
    }

    #[tokio::test]
    async fn test_create_room_unknown_host() {
        let (orch, rooms, _, _, _) = orchestrator();
        let ghost = Uuid::new_v4();

        let result = orch.create_room(ghost, "standup", false).await;
        assert!(matches!(result, Err(RoomError::HostNotFound { id }) if id == ghost));
        assert_eq!(rooms.len(), 0);
    }

    #[tokio::test]
    async fn test_join_room_persists_and_notifies() {
        let (orch, rooms, users, sessions, notifier) = orchestrator();
        let host_id = seed_user(&users, "alice");
        let guest_id = seed_user(&users, "bob");
        let room = orch.create_room(host_id, "standup", false).await.unwrap();

        let joined = orch.join_room(guest_id, room.id).await.unwrap();

        assert!(joined.is_participant(guest_id));
        assert_eq!(
            rooms.get_by_id(room.id).await.unwrap().unwrap().participant_count(),
            2
        );
        let session = sessions.get_session(guest_id).await.unwrap().unwrap();
        assert_eq!(session.room_id, Some(room.id));
        assert!(!session.is_host);
        assert!(notifier.joined_names().contains(&"bob".to_string()));
    }

    #[tokio::test]
    async fn test_join_unknown_user() {
        let (orch, _, users, _, _) = orchestrator();
        let host_id = seed_user(&users, "alice");
        let room = orch.create_room(host_id, "standup", false).await.unwrap();

        let ghost = Uuid::new_v4();
        let result = orch.join_room(ghost, room.id).await;
        assert!(matches!(result, Err(RoomError::UserNotFound { id }) if id == ghost));
    }

    #[tokio::test]
    async fn test_join_unknown_room() {
        let (orch, _, users, _, _) = orchestrator();
        let user_id = seed_user(&users, "alice");

        let missing = Uuid::new_v4();
        let result = orch.join_room(user_id, missing).await;
        assert!(matches!(result, Err(RoomError::RoomNotFound { id }) if id == missing));
    }

    #[tokio::test]
    async fn test_join_expired_room() {
        let (orch, rooms, users, _, _) = orchestrator();
        let host_id = seed_user(&users, "alice");
        let guest_id = seed_user(&users, "bob");
        let room = orch.create_room(host_id, "standup", false).await.unwrap();
        rooms.expire(room.id);

        let result = orch.join_room(guest_id, room.id).await;
        assert!(matches!(result, Err(RoomError::RoomExpired)));
    }

    #[tokio::test]
    async fn test_join_survives_advisory_failures() {
        let rooms = MemoryRoomStore::new();
        let users = MemoryUserStore::new();
        let orch = RoomOrchestrator::new(
            rooms.clone(),
            users.clone(),
            MemorySessionDirectory::failing(),
            RecordingNotifier::failing(),
        );
        let host_id = seed_user(&users, "alice");
        let guest_id = seed_user(&users, "bob");
        let room = orch.create_room(host_id, "standup", false).await.unwrap();

        // Presence and notifications are down; the join still commits.
        let joined = orch.join_room(guest_id, room.id).await.unwrap();
        assert!(joined.is_participant(guest_id));
        assert_eq!(
            rooms.get_by_id(room.id).await.unwrap().unwrap().participant_count(),
            2
        );
    }

    #[tokio::test]
    async fn test_leave_room_updates_roster() {
        let (orch, rooms, users, sessions, notifier) = orchestrator();
        let host_id = seed_user(&users, "alice");
        let guest_id = seed_user(&users, "bob");
        let room = orch.create_room(host_id, "standup", false).await.unwrap();
        orch.join_room(guest_id, room.id).await.unwrap();

        orch.leave_room(guest_id, room.id).await.unwrap();

        let stored = rooms.get_by_id(room.id).await.unwrap().unwrap();
        assert!(!stored.is_participant(guest_id));
        assert!(sessions.get_session(guest_id).await.unwrap().is_none());
        assert!(notifier.left_ids().contains(&guest_id));
    }

    #[tokio::test]
    async fn test_last_leave_deletes_room() {
        let (orch, rooms, users, _, _) = orchestrator();
        let host_id = seed_user(&users, "alice");
        let room = orch.create_room(host_id, "standup", false).await.unwrap();

        let updates_before = rooms.update_calls();
        orch.leave_room(host_id, room.id).await.unwrap();

        // Delete, never an update with an empty roster.
        assert!(rooms.get_by_id(room.id).await.unwrap().is_none());
        assert_eq!(rooms.update_calls(), updates_before);
        assert_eq!(rooms.delete_calls(), 1);
    }

    #[tokio::test]
    async fn test_leave_room_with_deleted_user() {
        let (orch, rooms, users, _, _) = orchestrator();
        let host_id = seed_user(&users, "alice");
        let guest_id = seed_user(&users, "bob");
        let room = orch.create_room(host_id, "standup", false).await.unwrap();
        orch.join_room(guest_id, room.id).await.unwrap();

        users.delete(guest_id).await.unwrap();

        let result = orch.leave_room(guest_id, room.id).await;
        assert!(matches!(
            result,
            Err(RoomError::UserNotFound { id }) if id == guest_id
        ));

        // The roster is untouched when the user lookup fails.
        let stored = rooms.get_by_id(room.id).await.unwrap().unwrap();
        assert!(stored.is_participant(guest_id));
    }

    #[tokio::test]
    async fn test_leave_room_not_participant() {
        let (orch, _, users, _, _) = orchestrator();
        let host_id = seed_user(&users, "alice");
        let stranger = seed_user(&users, "eve");
        let room = orch.create_room(host_id, "standup", false).await.unwrap();

        let result = orch.leave_room(stranger, room.id).await;
        assert!(matches!(result, Err(RoomError::ParticipantNotFound { .. })));
    }

    #[tokio::test]
    async fn test_mute_flow() {
        let (orch, rooms, users, sessions, notifier) = orchestrator();
        let host_id = seed_user(&users, "alice");
        let guest_id = seed_user(&users, "bob");
        let room = orch.create_room(host_id, "standup", false).await.unwrap();
        orch.join_room(guest_id, room.id).await.unwrap();

        orch.mute_participant(host_id, room.id, guest_id).await.unwrap();

        let stored = rooms.get_by_id(room.id).await.unwrap().unwrap();
        assert!(stored.get_participant(guest_id).unwrap().is_muted);
        assert!(sessions.get_session(guest_id).await.unwrap().unwrap().is_muted);
        assert_eq!(notifier.mute_changes(), vec![(guest_id, true)]);

        orch.unmute_participant(guest_id, room.id).await.unwrap();
        let stored = rooms.get_by_id(room.id).await.unwrap().unwrap();
        assert!(!stored.get_participant(guest_id).unwrap().is_muted);
        assert_eq!(notifier.mute_changes(), vec![(guest_id, true), (guest_id, false)]);
    }

    #[tokio::test]
    async fn test_mute_by_non_host() {
        let (orch, rooms, users, _, _) = orchestrator();
        let host_id = seed_user(&users, "alice");
        let guest_id = seed_user(&users, "bob");
        let room = orch.create_room(host_id, "standup", false).await.unwrap();
        orch.join_room(guest_id, room.id).await.unwrap();

        let result = orch.mute_participant(guest_id, room.id, host_id).await;
        assert!(matches!(result, Err(RoomError::NotHost { .. })));

        let stored = rooms.get_by_id(room.id).await.unwrap().unwrap();
        assert!(!stored.get_participant(host_id).unwrap().is_muted);
    }

    #[tokio::test]
    async fn test_mute_without_session_record() {
        let (orch, rooms, users, sessions, _) = orchestrator();
        let host_id = seed_user(&users, "alice");
        let guest_id = seed_user(&users, "bob");
        let room = orch.create_room(host_id, "standup", false).await.unwrap();
        orch.join_room(guest_id, room.id).await.unwrap();
        sessions.delete_session(guest_id).await.unwrap();

        // Missing presence must not block the mute.
        orch.mute_participant(host_id, room.id, guest_id).await.unwrap();
        let stored = rooms.get_by_id(room.id).await.unwrap().unwrap();
        assert!(stored.get_participant(guest_id).unwrap().is_muted);
    }

    #[tokio::test]
    async fn test_get_room_rejects_expired_without_deleting() {
        let (orch, rooms, users, _, _) = orchestrator();
        let host_id = seed_user(&users, "alice");
        let room = orch.create_room(host_id, "standup", false).await.unwrap();
        rooms.expire(room.id);

        let result = orch.get_room(room.id).await;
        assert!(matches!(result, Err(RoomError::RoomExpired)));
        // Still present for the sweeper.
        assert!(rooms.get_by_id(room.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_get_user_rooms_filters_expired() {
        let (orch, rooms, users, _, _) = orchestrator();
        let host_id = seed_user(&users, "alice");
        let live = orch.create_room(host_id, "live", false).await.unwrap();
        let stale = orch.create_room(host_id, "stale", false).await.unwrap();
        rooms.expire(stale.id);

        let listed = orch.get_user_rooms(host_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, live.id);
    }

    #[tokio::test]
    async fn test_extend_expiry_host_only() {
        let (orch, _, users, _, notifier) = orchestrator();
        let host_id = seed_user(&users, "alice");
        let guest_id = seed_user(&users, "bob");
        let room = orch.create_room(host_id, "standup", false).await.unwrap();
        orch.join_room(guest_id, room.id).await.unwrap();

        let result = orch.extend_room_expiry(guest_id, room.id, 2).await;
        assert!(matches!(result, Err(RoomError::NotHost { .. })));

        let extended = orch.extend_room_expiry(host_id, room.id, 2).await.unwrap();
        assert_eq!(extended.expires_at - room.expires_at, Duration::hours(2));
        assert_eq!(notifier.room_updates(), vec![room.id]);
    }
}
