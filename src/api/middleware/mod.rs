//! API middleware.

mod auth;
mod rate_limit;

pub use auth::{auth_middleware, require_admin, CurrentUser};
pub use rate_limit::{rate_limit_checkout_middleware, rate_limit_middleware, RateLimitError};
