//! Caller identity middleware.
//!
//! Every protected request carries `X-User-Id: <firebaseUid>`. The
//! middleware resolves it to the persisted user on every request, so the
//! role in effect is always the stored one.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::api::extractors::CallerUid;
use crate::api::AppState;
use crate::errors::AppError;
use domain::Actor;

/// Authenticated caller, available to handlers as `Extension<CurrentUser>`
pub type CurrentUser = Actor;

/// Resolve the caller and inject the `CurrentUser` into request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = request.into_parts();
    let CallerUid(uid) = CallerUid::from_parts(&parts)?;

    let current_user = state.services.users().resolve_actor(&uid).await.map_err(|e| {
        if matches!(e, AppError::Unauthorized) {
            tracing::debug!(firebase_uid = %uid, "Unknown caller");
        }
        e
    })?;

    parts.extensions.insert(current_user);

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Require admin role, returns Forbidden error if not admin.
pub fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    user.require_admin().map_err(AppError::from)
}
