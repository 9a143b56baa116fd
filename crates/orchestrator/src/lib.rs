//! Orchestration layer for Huddle.
//!
//! Composes the domain aggregates with the durable stores and the
//! real-time collaborators. Durable writes are authoritative; presence
//! and notifications run under the best-effort policy and never fail an
//! operation that already committed.

pub mod messages;
pub mod mock_stores;
pub mod rooms;
pub mod users;

pub use messages::{MessageOrchestrator, DEFAULT_HISTORY_LIMIT};
pub use rooms::RoomOrchestrator;
pub use users::UserOrchestrator;
