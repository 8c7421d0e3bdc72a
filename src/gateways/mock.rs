use crate::domain::error::GatewayError;
use crate::gateways::{
    short_hex_id, CallbackClaim, CreatedLink, LinkRequest, LinkStatus, OrderRequest,
    PaymentGateway, SignatureCheck,
};

/// Payment id that makes simulated verification fail.
pub const FORCE_FAIL_PAYMENT_ID: &str = "PAYMENT_FAILED";

pub const MOCK_ORDER_PREFIX: &str = "order_mock";
pub const MOCK_LINK_PREFIX: &str = "plink_mock";
pub const MOCK_PAYMENT_PREFIX: &str = "pay_mock";

/// Simulated gateway: no network, ids tagged `mock` so they can never be
/// mistaken for live traffic.
pub struct MockGateway {
    pub key_id: String,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            key_id: "rzp_test_mock".to_string(),
        }
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }

    async fn create_order(&self, _request: OrderRequest) -> Result<String, GatewayError> {
        Ok(short_hex_id(MOCK_ORDER_PREFIX))
    }

    async fn create_link(&self, _request: LinkRequest) -> Result<CreatedLink, GatewayError> {
        let link_id = short_hex_id(MOCK_LINK_PREFIX);
        Ok(CreatedLink {
            short_url: format!("https://mock-payment.com/{}", link_id),
            link_id,
            status: "created".to_string(),
        })
    }

    async fn verify_signature(
        &self,
        _order_id: &str,
        payment_id: &str,
        _signature: &str,
    ) -> Result<SignatureCheck, GatewayError> {
        if payment_id == FORCE_FAIL_PAYMENT_ID {
            Ok(SignatureCheck::Invalid)
        } else {
            Ok(SignatureCheck::Valid)
        }
    }

    async fn fetch_link_status(
        &self,
        _link_id: &str,
        claim: &CallbackClaim,
    ) -> Result<LinkStatus, GatewayError> {
        let status = claim.status.clone().unwrap_or_else(|| "created".to_string());
        let last_payment_id = if status == "paid" {
            Some(
                claim
                    .payment_id
                    .clone()
                    .unwrap_or_else(|| short_hex_id(MOCK_PAYMENT_PREFIX)),
            )
        } else {
            claim.payment_id.clone()
        };
        Ok(LinkStatus {
            status,
            last_payment_id,
        })
    }
}
