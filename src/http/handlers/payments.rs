use crate::domain::caller::Caller;
use crate::domain::error::PaymentError;
use crate::domain::payment::{CallbackQuery, OrderView, PaymentStatus, VerifyPaymentRequest};
use crate::http::error::ApiError;
use crate::service::payment_service::InitiateOutcome;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

pub async fn create_order(
    State(state): State<AppState>,
    caller: Caller,
    Path(vehicle_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let service = &state.payment_service;
    let outcome = service.initiate_order(vehicle_id, &caller).await?;

    let record = outcome.record();
    let view = OrderView {
        vehicle_id: record.vehicle_id,
        model: record.vehicle_model.clone(),
        amount: record.amount.major(),
        amount_minor: record.amount.to_minor_units(),
        currency: service.currency.clone(),
        order_id: record.external_reference.clone(),
        payment_status: record.status,
        key_id: service.gateway.key_id().to_string(),
    };

    let (code, status, message) = match outcome {
        InitiateOutcome::Created(_) => (StatusCode::CREATED, "success", "order created"),
        InitiateOutcome::AlreadyCompleted(_) => (
            StatusCode::OK,
            "info",
            "payment already completed for this vehicle",
        ),
    };
    Ok((
        code,
        Json(json!({"status": status, "message": message, "data": view})),
    ))
}

pub async fn verify_payment(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body.map_err(|e| ApiError(PaymentError::Validation(e.body_text())))?;
    let outcome = state.payment_service.verify_payment(&caller, &req).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "message": "payment verified successfully",
            "data": {"vehicle_id": outcome.vehicle_id, "new_status": outcome.new_status}
        })),
    ))
}

pub async fn payment_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(vehicle_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.payment_service.status(vehicle_id, &caller).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "payment_current_status": view.payment_status,
            "data": view
        })),
    ))
}

pub async fn send_payment_link(
    State(state): State<AppState>,
    caller: Caller,
    Path(vehicle_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state
        .payment_service
        .send_payment_link(vehicle_id, &caller)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"status": "success", "message": "payment link sent", "data": view})),
    ))
}

pub async fn payment_callback(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<CallbackQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.payment_service.handle_callback(&caller, &query).await?;

    if outcome.status == PaymentStatus::Success {
        return Ok((
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "payment verified and updated",
                "data": {
                    "vehicle_id": outcome.vehicle_id,
                    "payment_status": outcome.status,
                    "transaction_id": outcome.transaction_id
                }
            })),
        ));
    }

    Ok((
        StatusCode::BAD_REQUEST,
        Json(json!({
            "status": "failed",
            "message": format!("payment not completed, current status: {}", outcome.link_status),
            "data": {"vehicle_id": outcome.vehicle_id, "payment_status": outcome.status}
        })),
    ))
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
