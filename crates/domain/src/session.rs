//! Presence record published to the session directory while a user is
//! connected. Sessions are advisory: losing one never corrupts room state.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub user_id: Uuid,
    pub connection_id: String,
    pub room_id: Option<Uuid>,
    pub is_host: bool,
    pub is_muted: bool,
    pub node_id: String,
    /// Unix timestamp of the last activity on this session.
    pub last_seen: i64,
}

impl UserSession {
    /// Session record for a user who just joined a room.
    pub fn joined(user_id: Uuid, room_id: Uuid, is_host: bool) -> Self {
        Self {
            user_id,
            connection_id: String::new(),
            room_id: Some(room_id),
            is_host,
            is_muted: false,
            node_id: String::new(),
            last_seen: Utc::now().timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_session() {
        let user_id = Uuid::new_v4();
        let room_id = Uuid::new_v4();
        let session = UserSession::joined(user_id, room_id, true);

        assert_eq!(session.user_id, user_id);
        assert_eq!(session.room_id, Some(room_id));
        assert!(session.is_host);
        assert!(!session.is_muted);
        assert!(session.last_seen > 0);
    }
}
