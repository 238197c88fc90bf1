//! User handlers.

use axum::{
    extract::{Extension, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use domain::{SyncUser, User, UserRole};

use crate::api::extractors::{CallerUid, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::errors::AppResult;
use crate::utils::validate_not_blank;

/// Profile submitted after sign-in
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SyncUserRequest {
    #[validate(email(message = "must be a valid email address"))]
    #[schema(example = "ayesha@example.com")]
    pub email: String,
    #[serde(rename = "displayName")]
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Ayesha Khan")]
    pub display_name: String,
    #[serde(rename = "photoURL", default)]
    #[validate(url(message = "must be a URL"))]
    pub photo_url: Option<String>,
    /// Requested role. Advisory only, the server decides.
    #[schema(example = "user")]
    pub role: Option<String>,
}

impl SyncUserRequest {
    fn into_profile(self, firebase_uid: String) -> SyncUser {
        SyncUser {
            firebase_uid,
            email: self.email.trim().to_string(),
            display_name: self.display_name.trim().to_string(),
            photo_url: self.photo_url.filter(|p| !p.trim().is_empty()),
            requested_role: self.role.as_deref().map(UserRole::from),
        }
    }
}

/// Routes that need a persisted caller
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_current_user))
}

/// Routes reachable before the caller has a profile
pub fn user_sync_routes() -> Router<AppState> {
    Router::new().route("/sync", post(sync_user))
}

/// Create or refresh the caller's profile
#[utoipa::path(
    post,
    path = "/users/sync",
    tag = "Users",
    security(("user_id" = [])),
    request_body = SyncUserRequest,
    responses(
        (status = 200, description = "Profile stored", body = User),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing X-User-Id header")
    )
)]
pub async fn sync_user(
    State(state): State<AppState>,
    CallerUid(uid): CallerUid,
    ValidatedJson(payload): ValidatedJson<SyncUserRequest>,
) -> AppResult<Json<User>> {
    let user = state
        .services
        .users()
        .sync_user(payload.into_profile(uid))
        .await?;

    Ok(Json(user))
}

/// Get the caller's persisted profile
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Current user profile", body = User),
        (status = 401, description = "Unknown caller")
    )
)]
pub async fn get_current_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<User>> {
    let user = state
        .services
        .users()
        .get_by_firebase_uid(&current_user.firebase_uid)
        .await?;

    Ok(Json(user))
}
