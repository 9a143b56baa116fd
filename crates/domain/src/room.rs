//! Room aggregate: participant roster, capacity, expiry, and host authority.
//!
//! Every operation here is a pure, synchronous transformation of an in-memory
//! `Room` value. Orchestrators own the load-mutate-persist cycle; the aggregate
//! only guarantees its invariants against the snapshot it was called on.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{RoomError, RoomResult};

/// Default participant capacity for a newly created room.
pub const DEFAULT_MAX_CAPACITY: usize = 10;

/// Lifetime of a freshly created room, in hours.
pub const DEFAULT_ROOM_LIFETIME_HOURS: i64 = 24;

/// A bounded-lifetime meeting room with one host and a capped roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub host_id: Uuid,
    pub is_waiting_room: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub participants: Vec<Participant>,
    pub max_capacity: usize,
}

/// A user's membership record within a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: Uuid,
    pub is_host: bool,
    pub is_muted: bool,
    pub joined_at: DateTime<Utc>,
}

impl Room {
    /// Create a new room expiring `DEFAULT_ROOM_LIFETIME_HOURS` from now.
    pub fn new(name: impl Into<String>, host_id: Uuid, is_waiting_room: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            host_id,
            is_waiting_room,
            created_at: now,
            expires_at: now + Duration::hours(DEFAULT_ROOM_LIFETIME_HOURS),
            participants: Vec::new(),
            max_capacity: DEFAULT_MAX_CAPACITY,
        }
    }

    /// Add a participant to the roster.
    ///
    /// Check order is pinned: duplicate, then capacity, then expiry.
    pub fn add_participant(&mut self, user_id: Uuid) -> RoomResult<()> {
        if self.participants.iter().any(|p| p.user_id == user_id) {
            return Err(RoomError::DuplicateParticipant { user_id });
        }

        if self.participants.len() >= self.max_capacity {
            return Err(RoomError::CapacityExceeded {
                max_capacity: self.max_capacity,
            });
        }

        if self.is_expired() {
            return Err(RoomError::RoomExpired);
        }

        self.participants.push(Participant {
            user_id,
            is_host: user_id == self.host_id,
            is_muted: false,
            joined_at: Utc::now(),
        });
        Ok(())
    }

    /// Remove a participant, preserving the relative order of the rest.
    pub fn remove_participant(&mut self, user_id: Uuid) -> RoomResult<()> {
        match self.participants.iter().position(|p| p.user_id == user_id) {
            Some(index) => {
                self.participants.remove(index);
                Ok(())
            }
            None => Err(RoomError::ParticipantNotFound { user_id }),
        }
    }

    /// Look up a participant by user ID.
    pub fn get_participant(&self, user_id: Uuid) -> RoomResult<&Participant> {
        self.participants
            .iter()
            .find(|p| p.user_id == user_id)
            .ok_or(RoomError::ParticipantNotFound { user_id })
    }

    fn get_participant_mut(&mut self, user_id: Uuid) -> RoomResult<&mut Participant> {
        self.participants
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or(RoomError::ParticipantNotFound { user_id })
    }

    /// Mute a participant. Only the host may do this.
    pub fn mute_participant(&mut self, acting_user_id: Uuid, target_user_id: Uuid) -> RoomResult<()> {
        if acting_user_id != self.host_id {
            return Err(RoomError::NotHost {
                user_id: acting_user_id,
            });
        }

        self.get_participant_mut(target_user_id)?.is_muted = true;
        Ok(())
    }

    /// Unmute a participant. Deliberately not host-gated: unmute is
    /// self-service and callers pass the session owner's own ID.
    pub fn unmute_participant(&mut self, user_id: Uuid) -> RoomResult<()> {
        self.get_participant_mut(user_id)?.is_muted = false;
        Ok(())
    }

    /// Check if a user is the host.
    pub fn is_host(&self, user_id: Uuid) -> bool {
        self.host_id == user_id
    }

    /// Check if a user is on the roster.
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.participants.iter().any(|p| p.user_id == user_id)
    }

    /// Current roster size.
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Check if the room is past its expiry.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Check if the roster is at capacity.
    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.max_capacity
    }

    /// Push the expiry out by `duration`.
    ///
    /// The aggregate is mechanism only: the host-authority check for this
    /// operation belongs to the orchestrator.
    pub fn extend_expiry(&mut self, duration: Duration) {
        self.expires_at += duration;
    }
}
