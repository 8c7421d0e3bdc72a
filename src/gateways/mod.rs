use crate::config::AppConfig;
use crate::domain::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod mock;
pub mod razorpay;

#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub receipt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRecipient {
    pub name: String,
    #[serde(rename = "contact")]
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct LinkRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    pub recipient: LinkRecipient,
    pub callback_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedLink {
    pub link_id: String,
    pub short_url: String,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    Valid,
    Invalid,
}

/// What the redirect claimed about a payment link. Live gateways must not
/// rely on it.
#[derive(Debug, Clone, Default)]
pub struct CallbackClaim {
    pub payment_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkStatus {
    pub status: String,
    pub last_payment_id: Option<String>,
}

impl LinkStatus {
    pub fn is_paid(&self) -> bool {
        self.status == "paid"
    }
}

#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    /// Public key handed to checkout clients alongside an order id.
    fn key_id(&self) -> &str;

    async fn create_order(&self, request: OrderRequest) -> Result<String, GatewayError>;

    async fn create_link(&self, request: LinkRequest) -> Result<CreatedLink, GatewayError>;

    async fn verify_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<SignatureCheck, GatewayError>;

    async fn fetch_link_status(
        &self,
        link_id: &str,
        claim: &CallbackClaim,
    ) -> Result<LinkStatus, GatewayError>;
}

/// Picks the gateway for the whole process. Nothing downstream branches on
/// the mode again.
pub fn from_config(cfg: &AppConfig) -> Arc<dyn PaymentGateway> {
    if cfg.razorpay_live {
        Arc::new(razorpay::RazorpayGateway {
            base_url: cfg.razorpay_base_url.clone(),
            key_id: cfg.razorpay_key_id.clone(),
            key_secret: cfg.razorpay_key_secret.clone(),
            timeout_ms: cfg.gateway_timeout_ms,
            client: reqwest::Client::new(),
        })
    } else {
        let mut mock = mock::MockGateway::default();
        if !cfg.razorpay_key_id.is_empty() {
            mock.key_id = cfg.razorpay_key_id.clone();
        }
        Arc::new(mock)
    }
}

pub(crate) fn short_hex_id(prefix: &str) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &hex[..10])
}
