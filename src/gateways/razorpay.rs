use crate::domain::error::GatewayError;
use crate::gateways::{
    CallbackClaim, CreatedLink, LinkRequest, LinkStatus, OrderRequest, PaymentGateway,
    SignatureCheck,
};
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub struct RazorpayGateway {
    pub base_url: String,
    pub key_id: String,
    pub key_secret: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct OrderBody {
    id: String,
}

#[derive(Debug, Deserialize)]
struct LinkBody {
    id: String,
    short_url: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct LinkPayment {
    payment_id: String,
}

#[derive(Debug, Deserialize)]
struct FetchedLinkBody {
    status: String,
    #[serde(default)]
    payments: Option<Vec<LinkPayment>>,
}

impl RazorpayGateway {
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        let resp = request
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout(self.timeout_ms)
                } else {
                    GatewayError::Network(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        resp.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout(self.timeout_ms)
            } else {
                GatewayError::Malformed(e.to_string())
            }
        })
    }
}

/// Razorpay checkout signature: hex HMAC-SHA256 of `order_id|payment_id`.
pub fn expected_signature(secret: &str, order_id: &str, payment_id: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

pub fn signature_matches(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    match expected_signature(secret, order_id, payment_id) {
        Some(expected) => expected
            .as_bytes()
            .ct_eq(signature.trim().to_ascii_lowercase().as_bytes())
            .into(),
        None => false,
    }
}

#[async_trait::async_trait]
impl PaymentGateway for RazorpayGateway {
    fn name(&self) -> &'static str {
        "razorpay"
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }

    async fn create_order(&self, request: OrderRequest) -> Result<String, GatewayError> {
        let body = json!({
            "amount": request.amount_minor,
            "currency": request.currency,
            "receipt": request.receipt,
            "payment_capture": 1
        });
        let order: OrderBody = self
            .send(self.client.post(format!("{}/v1/orders", self.base_url)).json(&body))
            .await?;
        Ok(order.id)
    }

    async fn create_link(&self, request: LinkRequest) -> Result<CreatedLink, GatewayError> {
        let body = json!({
            "amount": request.amount_minor,
            "currency": request.currency,
            "accept_partial": false,
            "description": request.description,
            "customer": request.recipient,
            "notify": {"sms": true, "email": true},
            "reminder_enable": true,
            "callback_url": request.callback_url,
            "callback_method": "get"
        });
        let link: LinkBody = self
            .send(
                self.client
                    .post(format!("{}/v1/payment_links", self.base_url))
                    .json(&body),
            )
            .await?;
        Ok(CreatedLink {
            link_id: link.id,
            short_url: link.short_url,
            status: link.status,
        })
    }

    async fn verify_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<SignatureCheck, GatewayError> {
        if self.key_secret.is_empty() {
            return Err(GatewayError::Malformed("razorpay key secret is not configured".to_string()));
        }
        if signature_matches(&self.key_secret, order_id, payment_id, signature) {
            Ok(SignatureCheck::Valid)
        } else {
            Ok(SignatureCheck::Invalid)
        }
    }

    async fn fetch_link_status(
        &self,
        link_id: &str,
        _claim: &CallbackClaim,
    ) -> Result<LinkStatus, GatewayError> {
        let link: FetchedLinkBody = self
            .send(
                self.client
                    .get(format!("{}/v1/payment_links/{}", self.base_url, link_id)),
            )
            .await?;
        let last_payment_id = link
            .payments
            .unwrap_or_default()
            .pop()
            .map(|p| p.payment_id);
        Ok(LinkStatus {
            status: link.status,
            last_payment_id,
        })
    }
}
