//! User service - profile sync and caller resolution.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use domain::{Actor, SyncUser, User, UserRole};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Upsert the caller's profile. The stored role comes from the admin
    /// allow-list only; a requested role is advisory.
    async fn sync_user(&self, profile: SyncUser) -> AppResult<User>;

    /// Load the persisted profile for a firebase UID
    async fn get_by_firebase_uid(&self, firebase_uid: &str) -> AppResult<User>;

    /// Resolve the caller of a request. Unknown identifiers are unauthenticated.
    async fn resolve_actor(&self, firebase_uid: &str) -> AppResult<Actor>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn sync_user(&self, profile: SyncUser) -> AppResult<User> {
        let role = UserRole::from_allow_list(self.config.is_admin_email(&profile.email));

        if profile.requested_role == Some(UserRole::Admin) && !role.is_admin() {
            tracing::warn!(
                firebase_uid = %profile.firebase_uid,
                email = %profile.email,
                "Admin role requested by an email not on the allow-list, storing as user"
            );
        }

        let user = self.uow.users().upsert(profile, role).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "User synced");

        Ok(user)
    }

    async fn get_by_firebase_uid(&self, firebase_uid: &str) -> AppResult<User> {
        self.uow
            .users()
            .find_by_firebase_uid(firebase_uid)
            .await?
            .ok_or_not_found()
    }

    async fn resolve_actor(&self, firebase_uid: &str) -> AppResult<Actor> {
        let user = self
            .uow
            .users()
            .find_by_firebase_uid(firebase_uid)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(Actor::from(&user))
    }
}
