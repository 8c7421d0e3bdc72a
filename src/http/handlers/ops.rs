use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Readiness {
    pub ready: bool,
    pub store: bool,
    pub redis: bool,
    /// Which gateway strategy the process was started with.
    pub gateway: &'static str,
}

async fn redis_reachable(client: &redis::Client) -> bool {
    match client.get_multiplexed_async_connection().await {
        Ok(mut conn) => redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .is_ok(),
        Err(_) => false,
    }
}

pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let service = &state.payment_service;
    let store = match service.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "payment store not reachable");
            false
        }
    };
    let redis = redis_reachable(&state.redis_client).await;

    let report = Readiness {
        ready: store && redis,
        store,
        redis,
        gateway: service.gateway.name(),
    };
    let code = if report.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(report))
}

pub async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"alive": true})))
}
