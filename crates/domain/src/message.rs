//! Real-time message envelope: chat, WebRTC signaling, and control messages.
//!
//! The payload is a variant union keyed by the message kind; routing is
//! decided by `is_broadcast` for chat/presence and by the presence of a
//! target for everything else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminant for every message that crosses the real-time channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    // WebRTC signaling
    WebrtcOffer,
    WebrtcAnswer,
    IceCandidate,

    // Room management
    JoinRoom,
    LeaveRoom,
    UserJoined,
    UserLeft,

    // Chat
    ChatMessage,

    // Control
    MuteUser,
    AdmitUser,
    ScreenShare,
}

/// Typed payload, decoded according to the envelope's kind tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessagePayload {
    #[serde(rename_all = "camelCase")]
    IceCandidate {
        candidate: String,
        sdp_mid: String,
        #[serde(rename = "sdpMLineIndex")]
        sdp_mline_index: i32,
    },
    #[serde(rename_all = "camelCase")]
    Chat { message: String, user_name: String },
    #[serde(rename_all = "camelCase")]
    Webrtc {
        sdp: String,
        #[serde(rename = "type")]
        kind: String,
    },
    #[serde(rename_all = "camelCase")]
    Control {
        action: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_id: Option<Uuid>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Opaque payload for kinds without a dedicated shape.
    Value(serde_json::Value),
}

/// A single unit of real-time communication, never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_user_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<Uuid>,
    pub room_id: Uuid,
    pub payload: MessagePayload,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Construct a message with a fresh ID and the current timestamp.
    pub fn new(
        kind: MessageKind,
        sender_user_id: Option<Uuid>,
        room_id: Uuid,
        payload: MessagePayload,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            sender_user_id,
            target_user_id: None,
            room_id,
            payload,
            timestamp: Utc::now(),
        }
    }

    /// Construct a chat message carrying the sender's display name.
    pub fn chat(
        sender_id: Uuid,
        room_id: Uuid,
        message: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Self {
        Self::new(
            MessageKind::ChatMessage,
            Some(sender_id),
            room_id,
            MessagePayload::Chat {
                message: message.into(),
                user_name: user_name.into(),
            },
        )
    }

    /// Construct a WebRTC offer routed to exactly one peer.
    pub fn webrtc_offer(sender_id: Uuid, target_id: Uuid, room_id: Uuid, sdp: impl Into<String>) -> Self {
        let mut msg = Self::new(
            MessageKind::WebrtcOffer,
            Some(sender_id),
            room_id,
            MessagePayload::Webrtc {
                sdp: sdp.into(),
                kind: "offer".to_string(),
            },
        );
        msg.target_user_id = Some(target_id);
        msg
    }

    /// Construct a WebRTC answer routed to exactly one peer.
    pub fn webrtc_answer(sender_id: Uuid, target_id: Uuid, room_id: Uuid, sdp: impl Into<String>) -> Self {
        let mut msg = Self::new(
            MessageKind::WebrtcAnswer,
            Some(sender_id),
            room_id,
            MessagePayload::Webrtc {
                sdp: sdp.into(),
                kind: "answer".to_string(),
            },
        );
        msg.target_user_id = Some(target_id);
        msg
    }

    /// Construct an ICE candidate routed to exactly one peer.
    pub fn ice_candidate(
        sender_id: Uuid,
        target_id: Uuid,
        room_id: Uuid,
        candidate: impl Into<String>,
        sdp_mid: impl Into<String>,
        sdp_mline_index: i32,
    ) -> Self {
        let mut msg = Self::new(
            MessageKind::IceCandidate,
            Some(sender_id),
            room_id,
            MessagePayload::IceCandidate {
                candidate: candidate.into(),
                sdp_mid: sdp_mid.into(),
                sdp_mline_index,
            },
        );
        msg.target_user_id = Some(target_id);
        msg
    }

    /// Validate sender/target requirements for this message's kind.
    pub fn is_valid(&self) -> bool {
        if self.room_id.is_nil() {
            return false;
        }

        match self.kind {
            MessageKind::ChatMessage | MessageKind::MuteUser | MessageKind::AdmitUser => {
                self.sender_user_id.is_some()
            }
            MessageKind::WebrtcOffer | MessageKind::WebrtcAnswer | MessageKind::IceCandidate => {
                self.sender_user_id.is_some() && self.target_user_id.is_some()
            }
            _ => true,
        }
    }

    /// A message is direct iff it carries a target peer.
    pub fn is_direct(&self) -> bool {
        self.target_user_id.is_some()
    }

    /// Chat and presence notifications fan out to the whole roster. Every
    /// other kind (signaling, control) is routed by the caller based on the
    /// target, not by this predicate.
    pub fn is_broadcast(&self) -> bool {
        matches!(
            self.kind,
            MessageKind::ChatMessage | MessageKind::UserJoined | MessageKind::UserLeft
        )
    }

    /// Serialize to the wire/history JSON form.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialize from the wire/history JSON form.
    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }
}
