use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway timed out after {0} ms")]
    Timeout(u64),
    #[error("gateway returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("gateway unreachable: {0}")]
    Network(String),
    #[error("unexpected gateway response: {0}")]
    Malformed(String),
}

impl GatewayError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Timeout(_))
    }
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("{0}")]
    PermissionDenied(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// The gateway rejected the payment confirmation. The record has
    /// already been moved to `failed` when this is returned.
    #[error("payment verification failed for vehicle {vehicle_id}")]
    SignatureInvalid { vehicle_id: i64 },
    #[error("storage failure: {0}")]
    Store(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::PermissionDenied(_) => "PERMISSION_DENIED",
            PaymentError::NotFound(_) => "NOT_FOUND",
            PaymentError::Validation(_) => "VALIDATION_ERROR",
            PaymentError::Gateway(e) if e.is_timeout() => "GATEWAY_TIMEOUT",
            PaymentError::Gateway(_) => "GATEWAY_ERROR",
            PaymentError::SignatureInvalid { .. } => "SIGNATURE_INVALID",
            PaymentError::Store(_) => "INTERNAL_ERROR",
        }
    }
}
