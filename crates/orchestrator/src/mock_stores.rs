//! In-memory collaborator implementations for tests.
//!
//! Each store keeps its data behind an `Arc<RwLock<..>>` so a clone can be
//! handed to the orchestrator while the test keeps its own handle for
//! assertions. The `failing()` constructors simulate an unreachable backend
//! for exercising the best-effort policy.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use huddle_domain::{
    ChatHistoryStore, Message, RealtimeNotifier, Room, RoomStore, SessionDirectory, StoreResult,
    User, UserSession, UserStore,
};

#[derive(Clone, Default)]
pub struct MemoryRoomStore {
    rooms: Arc<RwLock<HashMap<Uuid, Room>>>,
    updates: Arc<AtomicUsize>,
    deletes: Arc<AtomicUsize>,
}

impl MemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rooms.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Force a room's expiry into the past.
    pub fn expire(&self, room_id: Uuid) {
        if let Some(room) = self.rooms.write().unwrap().get_mut(&room_id) {
            room.expires_at = Utc::now() - Duration::hours(1);
        }
    }

    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    async fn create(&self, room: &Room) -> StoreResult<()> {
        self.rooms.write().unwrap().insert(room.id, room.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Room>> {
        Ok(self.rooms.read().unwrap().get(&id).cloned())
    }

    async fn get_by_host(&self, host_id: Uuid) -> StoreResult<Vec<Room>> {
        Ok(self
            .rooms
            .read()
            .unwrap()
            .values()
            .filter(|r| r.host_id == host_id)
            .cloned()
            .collect())
    }

    async fn update(&self, room: &Room) -> StoreResult<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.rooms.write().unwrap().insert(room.id, room.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.rooms.write().unwrap().remove(&id);
        Ok(())
    }

    async fn get_active_rooms(&self) -> StoreResult<Vec<Room>> {
        Ok(self
            .rooms
            .read()
            .unwrap()
            .values()
            .filter(|r| !r.is_expired())
            .cloned()
            .collect())
    }

    async fn cleanup_expired_rooms(&self) -> StoreResult<u64> {
        let mut rooms = self.rooms.write().unwrap();
        let before = rooms.len();
        rooms.retain(|_, r| !r.is_expired());
        Ok((before - rooms.len()) as u64)
    }
}

#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    updates: Arc<AtomicUsize>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        self.users.write().unwrap().insert(user.id, user);
    }

    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: &User) -> StoreResult<()> {
        self.users.write().unwrap().insert(user.id, user.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().unwrap().get(&id).cloned())
    }

    async fn get_by_provider_id(&self, provider_id: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.provider_id == provider_id)
            .cloned())
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update(&self, user: &User) -> StoreResult<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.users.write().unwrap().insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.users.write().unwrap().remove(&id);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryChatHistory {
    messages: Arc<RwLock<HashMap<Uuid, Vec<Message>>>>,
    saves: Arc<AtomicUsize>,
}

impl MemoryChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_calls(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatHistoryStore for MemoryChatHistory {
    async fn save_chat_message(&self, message: &Message) -> StoreResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.messages
            .write()
            .unwrap()
            .entry(message.room_id)
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn get_chat_history(&self, room_id: Uuid, limit: i64) -> StoreResult<Vec<Message>> {
        let messages = self.messages.read().unwrap();
        let Some(all) = messages.get(&room_id) else {
            return Ok(Vec::new());
        };
        let skip = all.len().saturating_sub(limit as usize);
        Ok(all[skip..].to_vec())
    }

    async fn delete_chat_history(&self, room_id: Uuid) -> StoreResult<()> {
        self.messages.write().unwrap().remove(&room_id);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemorySessionDirectory {
    sessions: Arc<RwLock<HashMap<Uuid, UserSession>>>,
    failing: bool,
}

impl MemorySessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory whose every call fails, as if the backend were down.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            return Err(anyhow!("session directory unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionDirectory for MemorySessionDirectory {
    async fn create_session(&self, session: &UserSession) -> Result<()> {
        self.check()?;
        self.sessions
            .write()
            .unwrap()
            .insert(session.user_id, session.clone());
        Ok(())
    }

    async fn get_session(&self, user_id: Uuid) -> Result<Option<UserSession>> {
        self.check()?;
        Ok(self.sessions.read().unwrap().get(&user_id).cloned())
    }

    async fn update_session(&self, session: &UserSession) -> Result<()> {
        self.check()?;
        self.sessions
            .write()
            .unwrap()
            .insert(session.user_id, session.clone());
        Ok(())
    }

    async fn delete_session(&self, user_id: Uuid) -> Result<()> {
        self.check()?;
        self.sessions.write().unwrap().remove(&user_id);
        Ok(())
    }

    async fn get_active_users(&self, room_id: Uuid) -> Result<Vec<Uuid>> {
        self.check()?;
        Ok(self
            .sessions
            .read()
            .unwrap()
            .values()
            .filter(|s| s.room_id == Some(room_id))
            .map(|s| s.user_id)
            .collect())
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    joins: Arc<RwLock<Vec<(Uuid, Uuid, String)>>>,
    leaves: Arc<RwLock<Vec<(Uuid, Uuid, String)>>>,
    mutes: Arc<RwLock<Vec<(Uuid, bool)>>>,
    broadcasts: Arc<RwLock<Vec<Uuid>>>,
    directs: Arc<RwLock<Vec<Uuid>>>,
    updates: Arc<RwLock<Vec<Uuid>>>,
    failing: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every call fails, as if no clients were reachable.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            return Err(anyhow!("notifier unavailable"));
        }
        Ok(())
    }

    pub fn joined_names(&self) -> Vec<String> {
        self.joins.read().unwrap().iter().map(|(_, _, n)| n.clone()).collect()
    }

    pub fn left_ids(&self) -> Vec<Uuid> {
        self.leaves.read().unwrap().iter().map(|(_, id, _)| *id).collect()
    }

    pub fn mute_changes(&self) -> Vec<(Uuid, bool)> {
        self.mutes.read().unwrap().clone()
    }

    pub fn broadcast_ids(&self) -> Vec<Uuid> {
        self.broadcasts.read().unwrap().clone()
    }

    pub fn direct_ids(&self) -> Vec<Uuid> {
        self.directs.read().unwrap().clone()
    }

    pub fn room_updates(&self) -> Vec<Uuid> {
        self.updates.read().unwrap().clone()
    }
}

#[async_trait]
impl RealtimeNotifier for RecordingNotifier {
    async fn notify_room_joined(&self, room_id: Uuid, user_id: Uuid, display_name: &str) -> Result<()> {
        self.check()?;
        self.joins
            .write()
            .unwrap()
            .push((room_id, user_id, display_name.to_string()));
        Ok(())
    }

    async fn notify_room_left(&self, room_id: Uuid, user_id: Uuid, display_name: &str) -> Result<()> {
        self.check()?;
        self.leaves
            .write()
            .unwrap()
            .push((room_id, user_id, display_name.to_string()));
        Ok(())
    }

    async fn notify_user_muted(&self, _room_id: Uuid, user_id: Uuid, is_muted: bool) -> Result<()> {
        self.check()?;
        self.mutes.write().unwrap().push((user_id, is_muted));
        Ok(())
    }

    async fn broadcast_chat_message(&self, message: &Message) -> Result<()> {
        self.check()?;
        self.broadcasts.write().unwrap().push(message.id);
        Ok(())
    }

    async fn send_direct_message(&self, message: &Message) -> Result<()> {
        self.check()?;
        self.directs.write().unwrap().push(message.id);
        Ok(())
    }

    async fn notify_room_update(&self, room: &Room) -> Result<()> {
        self.check()?;
        self.updates.write().unwrap().push(room.id);
        Ok(())
    }
}
