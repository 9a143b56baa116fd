//! Core domain model for Huddle meeting rooms.
//!
//! Entities (rooms, users, messages, sessions), their invariants, and the
//! collaborator traits the orchestrators are written against. Everything
//! here is backend-agnostic; the storage and realtime crates provide the
//! concrete implementations.

pub mod effects;
pub mod errors;
pub mod events;
pub mod message;
pub mod realtime;
pub mod room;
pub mod session;
pub mod stores;
pub mod user;

pub use effects::{best_effort, Advisory};
pub use errors::{
    MessageError, MessageResult, RoomError, RoomResult, StoreError, StoreResult, UserError,
    UserResult,
};
pub use events::RoomEvent;
pub use message::{Message, MessageKind, MessagePayload};
pub use realtime::{RealtimeNotifier, SessionDirectory};
pub use room::{Participant, Room, DEFAULT_MAX_CAPACITY, DEFAULT_ROOM_LIFETIME_HOURS};
pub use session::UserSession;
pub use stores::{ChatHistoryStore, RoomStore, UserStore};
pub use user::User;
