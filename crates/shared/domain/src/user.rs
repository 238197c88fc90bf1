//! User domain entity and the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{ROLE_ADMIN, ROLE_USER};
use crate::error::{DomainError, DomainResult};
use crate::order::Order;

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Role a synced user ends up with. Only the allow-list decides.
    pub fn from_allow_list(allow_listed: bool) -> UserRole {
        if allow_listed {
            UserRole::Admin
        } else {
            UserRole::User
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

impl From<String> for UserRole {
    fn from(s: String) -> Self {
        UserRole::from(s.as_str())
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "{}", ROLE_ADMIN),
            UserRole::User => write!(f, "{}", ROLE_USER),
        }
    }
}

/// User domain entity, keyed by the identity provider's UID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub firebase_uid: String,
    pub email: String,
    pub display_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Profile data submitted when a user signs in or signs up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncUser {
    pub firebase_uid: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    /// Role the client asked for; never trusted on its own
    pub requested_role: Option<UserRole>,
}

/// The caller of a request, resolved from the persisted user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub firebase_uid: String,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
}

impl Actor {
    /// Check if the caller has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Check if the caller placed the order
    pub fn owns(&self, order: &Order) -> bool {
        self.firebase_uid == order.firebase_uid
    }

    /// Require admin role
    pub fn require_admin(&self) -> DomainResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }

    /// Require ownership of the order
    pub fn require_owner(&self, order: &Order) -> DomainResult<()> {
        if self.owns(order) {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }

    /// Require ownership of the order or admin role
    pub fn require_owner_or_admin(&self, order: &Order) -> DomainResult<()> {
        if self.owns(order) || self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            firebase_uid: user.firebase_uid.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
        }
    }
}
