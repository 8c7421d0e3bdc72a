use crate::domain::payment::{ErrorEnvelope, ErrorPayload};
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Timelike, Utc};
use redis::AsyncCommands;

const WINDOW_TTL_SECS: i64 = 120;

#[derive(Clone)]
pub struct RateLimitState {
    pub redis_client: redis::Client,
    pub max_per_minute: i64,
}

/// Health and ops endpoints are never throttled.
pub fn is_exempt(path: &str) -> bool {
    path == "/health" || path.starts_with("/ops/")
}

pub fn client_ip(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

pub fn window_key(ip: &str, now: DateTime<Utc>) -> String {
    format!("rate:{}:{}", ip, now.format("%Y%m%d%H%M"))
}

fn too_many_requests(now: DateTime<Utc>) -> Response {
    let retry_after = 60 - u64::from(now.second());
    let mut resp = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorEnvelope {
            status: "error",
            error: ErrorPayload {
                code: "RATE_LIMITED".to_string(),
                message: "too many payment requests, slow down".to_string(),
                details: None,
            },
        }),
    )
        .into_response();
    resp.headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    resp
}

/// Fixed one-minute window per client IP over the payment API. Lets
/// traffic through when Redis is unavailable.
pub async fn enforce(
    State(state): State<RateLimitState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if is_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    let now = Utc::now();
    let key = window_key(&client_ip(&request), now);

    match state.redis_client.get_multiplexed_async_connection().await {
        Ok(mut conn) => {
            let count: i64 = conn.incr(&key, 1).await.unwrap_or(1);
            if count == 1 {
                let _: bool = conn.expire(&key, WINDOW_TTL_SECS).await.unwrap_or(false);
            }
            if count > state.max_per_minute {
                tracing::warn!(key = %key, count, limit = state.max_per_minute, "rate limit exceeded");
                return too_many_requests(now);
            }
        }
        Err(e) => tracing::debug!(error = %e, "rate limiter unavailable, allowing request"),
    }

    next.run(request).await
}
