//! In-process event fan-out.
//!
//! Room and message events are published on a tokio broadcast channel.
//! Gateway tasks subscribe and forward events to their connected clients;
//! publishing with no subscribers is a normal condition, not an error.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use huddle_domain::{Message, RealtimeNotifier, Room, RoomEvent};

#[derive(Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<RoomEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to the event stream. Slow subscribers miss events once
    /// the channel buffer wraps.
    pub fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.sender.subscribe()
    }

    fn publish(&self, event: RoomEvent) {
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(receivers, "room event published");
            }
            Err(broadcast::error::SendError(event)) => {
                debug!(
                    event_type = event.event_type_name(),
                    room_id = %event.room_id(),
                    "no subscribers for room event"
                );
            }
        }
    }
}

#[async_trait]
impl RealtimeNotifier for BroadcastNotifier {
    async fn notify_room_joined(&self, room_id: Uuid, user_id: Uuid, display_name: &str) -> Result<()> {
        self.publish(RoomEvent::ParticipantJoined {
            room_id,
            user_id,
            display_name: display_name.to_string(),
        });
        Ok(())
    }

    async fn notify_room_left(&self, room_id: Uuid, user_id: Uuid, display_name: &str) -> Result<()> {
        self.publish(RoomEvent::ParticipantLeft {
            room_id,
            user_id,
            display_name: display_name.to_string(),
        });
        Ok(())
    }

    async fn notify_user_muted(&self, room_id: Uuid, user_id: Uuid, is_muted: bool) -> Result<()> {
        self.publish(RoomEvent::MuteChanged {
            room_id,
            user_id,
            is_muted,
        });
        Ok(())
    }

    async fn broadcast_chat_message(&self, message: &Message) -> Result<()> {
        self.publish(RoomEvent::ChatBroadcast {
            room_id: message.room_id,
            message: message.clone(),
        });
        Ok(())
    }

    async fn send_direct_message(&self, message: &Message) -> Result<()> {
        let target_id = message
            .target_user_id
            .ok_or_else(|| anyhow!("direct message without a target"))?;
        self.publish(RoomEvent::DirectMessage {
            room_id: message.room_id,
            target_id,
            message: message.clone(),
        });
        Ok(())
    }

    async fn notify_room_update(&self, room: &Room) -> Result<()> {
        self.publish(RoomEvent::RoomUpdated {
            room_id: room.id,
            room: room.clone(),
        });
        Ok(())
    }
}
