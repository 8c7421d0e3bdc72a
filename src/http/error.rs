use crate::domain::error::PaymentError;
use crate::domain::payment::{ErrorEnvelope, ErrorPayload};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub struct ApiError(pub PaymentError);

impl From<PaymentError> for ApiError {
    fn from(e: PaymentError) -> Self {
        ApiError(e)
    }
}

pub fn status_for(e: &PaymentError) -> StatusCode {
    match e {
        PaymentError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
        PaymentError::Validation(_) | PaymentError::SignatureInvalid { .. } => StatusCode::BAD_REQUEST,
        PaymentError::Gateway(g) if g.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
        PaymentError::Gateway(_) => StatusCode::BAD_GATEWAY,
        PaymentError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);

        if let PaymentError::SignatureInvalid { vehicle_id } = self.0 {
            return (
                status,
                Json(serde_json::json!({
                    "status": "failed",
                    "message": "payment verification failed, invalid signature",
                    "data": {"vehicle_id": vehicle_id, "new_status": "failed"}
                })),
            )
                .into_response();
        }

        if let PaymentError::Store(e) = &self.0 {
            tracing::error!(error = ?e, "payment store failure");
        }

        let details = match &self.0 {
            PaymentError::Gateway(g) => Some(g.to_string()),
            _ => None,
        };
        let message = match &self.0 {
            PaymentError::Gateway(_) => "payment gateway error".to_string(),
            PaymentError::Store(_) => "internal error".to_string(),
            other => other.to_string(),
        };

        (
            status,
            Json(ErrorEnvelope {
                status: "error",
                error: ErrorPayload {
                    code: self.0.code().to_string(),
                    message,
                    details,
                },
            }),
        )
            .into_response()
    }
}
