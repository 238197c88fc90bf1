//! User repository implementation.

use async_trait::async_trait;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::errors::{AppError, AppResult};
use domain::{SyncUser, User, UserRole};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by the identity provider's UID
    async fn find_by_firebase_uid(&self, firebase_uid: &str) -> AppResult<Option<User>>;

    /// Insert or refresh the profile keyed by `firebase_uid`, storing `role`
    async fn upsert(&self, profile: SyncUser, role: UserRole) -> AppResult<User>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_firebase_uid(&self, firebase_uid: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::FirebaseUid.eq(firebase_uid))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn upsert(&self, profile: SyncUser, role: UserRole) -> AppResult<User> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            firebase_uid: Set(profile.firebase_uid),
            email: Set(profile.email),
            display_name: Set(profile.display_name),
            photo_url: Set(profile.photo_url),
            role: Set(role.into()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // Existing rows keep their id and created_at
        let model = UserEntity::insert(active_model)
            .on_conflict(
                OnConflict::column(user::Column::FirebaseUid)
                    .update_columns([
                        user::Column::Email,
                        user::Column::DisplayName,
                        user::Column::PhotoUrl,
                        user::Column::Role,
                        user::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(User::from(model))
    }
}
