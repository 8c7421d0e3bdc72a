use crate::http::handlers::{ops, payments};
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;

pub fn router(state: AppState) -> Router {
    let payment_routes = Router::new()
        .route("/create/:vehicle_id", post(payments::create_order))
        .route("/verify", post(payments::verify_payment))
        .route("/status/:vehicle_id", get(payments::payment_status))
        .route("/send-link/:vehicle_id", post(payments::send_payment_link))
        .route("/callback", get(payments::payment_callback))
        .route("/callback/", get(payments::payment_callback));

    Router::new()
        .route("/health", get(payments::health))
        .route("/ops/readiness", get(ops::readiness))
        .route("/ops/liveness", get(ops::liveness))
        .nest("/api/pdi/payment", payment_routes)
        .with_state(state)
}
