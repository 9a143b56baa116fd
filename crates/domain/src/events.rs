//! Events emitted towards connected clients after a room or message
//! operation commits.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::Message;
use crate::room::Room;

/// Notification fanned out over the real-time channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RoomEvent {
    ParticipantJoined {
        room_id: Uuid,
        user_id: Uuid,
        display_name: String,
    },
    ParticipantLeft {
        room_id: Uuid,
        user_id: Uuid,
        display_name: String,
    },
    MuteChanged {
        room_id: Uuid,
        user_id: Uuid,
        is_muted: bool,
    },
    ChatBroadcast {
        room_id: Uuid,
        message: Message,
    },
    DirectMessage {
        room_id: Uuid,
        target_id: Uuid,
        message: Message,
    },
    RoomUpdated {
        room_id: Uuid,
        room: Room,
    },
}

impl RoomEvent {
    /// The room this event concerns.
    pub fn room_id(&self) -> Uuid {
        match self {
            Self::ParticipantJoined { room_id, .. }
            | Self::ParticipantLeft { room_id, .. }
            | Self::MuteChanged { room_id, .. }
            | Self::ChatBroadcast { room_id, .. }
            | Self::DirectMessage { room_id, .. }
            | Self::RoomUpdated { room_id, .. } => *room_id,
        }
    }

    /// Wire name of the event variant, matching its serialized tag.
    pub fn event_type_name(&self) -> &'static str {
        match self {
            Self::ParticipantJoined { .. } => "participant_joined",
            Self::ParticipantLeft { .. } => "participant_left",
            Self::MuteChanged { .. } => "mute_changed",
            Self::ChatBroadcast { .. } => "chat_broadcast",
            Self::DirectMessage { .. } => "direct_message",
            Self::RoomUpdated { .. } => "room_updated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tagging() {
        let room_id = Uuid::new_v4();
        let event = RoomEvent::MuteChanged {
            room_id,
            user_id: Uuid::new_v4(),
            is_muted: true,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "mute_changed");
        assert_eq!(json["data"]["is_muted"], true);
        assert_eq!(event.event_type_name(), "mute_changed");
        assert_eq!(event.room_id(), room_id);
    }
}
