//! Rate limiting middleware using Redis cache.
//!
//! Without Redis the limiter is off. With Redis, a failed counter update
//! denies the request.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::api::AppState;
use crate::config::{
    RATE_LIMIT_CHECKOUT_REQUESTS, RATE_LIMIT_CHECKOUT_WINDOW_SECONDS, RATE_LIMIT_REQUESTS,
    RATE_LIMIT_WINDOW_SECONDS, USER_ID_HEADER,
};

/// Rate limit error response
#[derive(Debug)]
pub struct RateLimitError {
    pub retry_after: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert("Retry-After", HeaderValue::from(self.retry_after));
        headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));

        (
            StatusCode::TOO_MANY_REQUESTS,
            headers,
            "Too many requests. Please try again later.",
        )
            .into_response()
    }
}

/// One limiter configuration
#[derive(Debug, Clone, Copy)]
struct Limit {
    scope: &'static str,
    max_requests: u64,
    window_seconds: u64,
}

const GENERAL: Limit = Limit {
    scope: "general",
    max_requests: RATE_LIMIT_REQUESTS,
    window_seconds: RATE_LIMIT_WINDOW_SECONDS,
};

const CHECKOUT: Limit = Limit {
    scope: "checkout",
    max_requests: RATE_LIMIT_CHECKOUT_REQUESTS,
    window_seconds: RATE_LIMIT_CHECKOUT_WINDOW_SECONDS,
};

/// Extract client identifier for rate limiting.
///
/// Prefers the caller's UID, then proxy headers, then the peer address.
fn get_client_identifier(request: &Request) -> String {
    let header = |name| header_value(request, name);

    if let Some(uid) = header(USER_ID_HEADER) {
        return format!("uid:{}", uid);
    }

    // First IP in the chain is the original client
    if let Some(ip) = header("X-Forwarded-For").and_then(|f| f.split(',').next()) {
        return format!("ip:{}", ip.trim());
    }

    if let Some(real_ip) = header("X-Real-IP") {
        return format!("ip:{}", real_ip);
    }

    if let Some(connect_info) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return format!("ip:{}", connect_info.0.ip());
    }

    "unknown".to_string()
}

fn header_value<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request
        .headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

async fn enforce(
    limit: Limit,
    state: &AppState,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    let Some(cache) = state.cache.as_ref() else {
        return Ok(next.run(request).await);
    };

    let client_id = get_client_identifier(&request);
    let key = format!("{}:{}", limit.scope, client_id);

    let (count, allowed) = match cache
        .check_rate_limit(&key, limit.max_requests, limit.window_seconds)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, scope = limit.scope, "Rate limit check failed, denying request");
            return Err(RateLimitError {
                retry_after: limit.window_seconds,
            });
        }
    };

    if !allowed {
        tracing::warn!(client = %client_id, scope = limit.scope, count, "Rate limit exceeded");
        return Err(RateLimitError {
            retry_after: limit.window_seconds,
        });
    }

    let mut response = next.run(request).await;

    let remaining = limit.max_requests.saturating_sub(count);
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(limit.max_requests));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(remaining));

    Ok(response)
}

/// General rate limiting middleware.
/// Limits requests to RATE_LIMIT_REQUESTS per RATE_LIMIT_WINDOW_SECONDS.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    enforce(GENERAL, &state, request, next).await
}

/// Stricter rate limiting for placing orders.
/// Other requests pass straight through.
pub async fn rate_limit_checkout_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    if request.method() != axum::http::Method::POST {
        return Ok(next.run(request).await);
    }
    enforce(CHECKOUT, &state, request, next).await
}
