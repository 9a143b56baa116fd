//! User identity as mirrored from the external auth provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account keyed internally by UUID and externally by the auth
/// provider's subject ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub provider_id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        provider_id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        avatar_url: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider_id: provider_id.into(),
            email: email.into(),
            name: name.into(),
            avatar_url: avatar_url.into(),
            created_at: Utc::now(),
        }
    }

    /// A user record must carry at least an email and a display name.
    pub fn is_valid(&self) -> bool {
        !self.email.is_empty() && !self.name.is_empty()
    }

    /// Apply a partial profile update. Empty strings mean "keep the
    /// current value", so callers can patch a single field.
    pub fn update_profile(&mut self, name: &str, avatar_url: &str) {
        if !name.is_empty() {
            self.name = name.to_string();
        }
        if !avatar_url.is_empty() {
            self.avatar_url = avatar_url.to_string();
        }
    }
}
