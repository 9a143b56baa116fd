//! User identity orchestration: provider-keyed signup, login refresh, and
//! profile updates.

use tracing::info;
use uuid::Uuid;

use huddle_domain::{best_effort, SessionDirectory, User, UserError, UserResult, UserStore};

/// Manages user accounts mirrored from the auth provider.
pub struct UserOrchestrator<U, S> {
    users: U,
    sessions: S,
}

impl<U, S> UserOrchestrator<U, S>
where
    U: UserStore,
    S: SessionDirectory,
{
    pub fn new(users: U, sessions: S) -> Self {
        Self { users, sessions }
    }

    /// Create a user keyed by the provider's subject ID. Idempotent: when
    /// the provider ID is already known, the existing record is returned
    /// unmodified.
    pub async fn create_user(
        &self,
        provider_id: &str,
        email: &str,
        name: &str,
        avatar_url: &str,
    ) -> UserResult<User> {
        if let Some(existing) = self.users.get_by_provider_id(provider_id).await? {
            return Ok(existing);
        }

        let user = User::new(provider_id, email, name, avatar_url);
        if !user.is_valid() {
            return Err(UserError::InvalidUser);
        }

        self.users.create(&user).await?;
        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Resolve a login from the auth provider. Unknown users are created;
    /// known users get their profile refreshed when the provider reports a
    /// different name or avatar.
    pub async fn login_user(
        &self,
        provider_id: &str,
        email: &str,
        name: &str,
        avatar_url: &str,
    ) -> UserResult<User> {
        let Some(mut user) = self.users.get_by_provider_id(provider_id).await? else {
            return self.create_user(provider_id, email, name, avatar_url).await;
        };

        if user.name != name || user.avatar_url != avatar_url {
            user.update_profile(name, avatar_url);
            self.users.update(&user).await?;
        }
        Ok(user)
    }

    /// Patch a user's display name and avatar. Empty fields keep their
    /// current value.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        name: &str,
        avatar_url: &str,
    ) -> UserResult<User> {
        let mut user = self.load_user(user_id).await?;

        user.update_profile(name, avatar_url);
        if !user.is_valid() {
            return Err(UserError::InvalidUser);
        }

        self.users.update(&user).await?;
        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> UserResult<User> {
        self.load_user(user_id).await
    }

    pub async fn get_user_by_provider_id(&self, provider_id: &str) -> UserResult<User> {
        self.users
            .get_by_provider_id(provider_id)
            .await?
            .ok_or(UserError::UserNotFound)
    }

    pub async fn get_user_by_email(&self, email: &str) -> UserResult<User> {
        self.users
            .get_by_email(email)
            .await?
            .ok_or(UserError::UserNotFound)
    }

    /// Delete a user account. The presence record is torn down best-effort
    /// before the durable delete.
    pub async fn delete_user(&self, user_id: Uuid) -> UserResult<()> {
        self.load_user(user_id).await?;

        best_effort("delete_session", self.sessions.delete_session(user_id).await);
        self.users.delete(user_id).await?;

        info!(%user_id, "user deleted");
        Ok(())
    }

    async fn load_user(&self, user_id: Uuid) -> UserResult<User> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(UserError::UserNotFound)
    }
}
