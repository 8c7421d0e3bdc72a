use pdi_payments::domain::error::GatewayError;
use pdi_payments::gateways::razorpay::{expected_signature, RazorpayGateway};
use pdi_payments::gateways::{
    CallbackClaim, LinkRecipient, LinkRequest, OrderRequest, PaymentGateway, SignatureCheck,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer, timeout_ms: u64) -> RazorpayGateway {
    RazorpayGateway {
        base_url: server.uri(),
        key_id: "rzp_test_key".to_string(),
        key_secret: "rzp_test_secret".to_string(),
        timeout_ms,
        client: reqwest::Client::new(),
    }
}

fn order() -> OrderRequest {
    OrderRequest {
        amount_minor: 75_050,
        currency: "INR".to_string(),
        receipt: "vehicle_9".to_string(),
    }
}

#[tokio::test]
async fn create_order_posts_minor_units() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .and(header_exists("authorization"))
        .and(body_partial_json(json!({"amount": 75_050, "currency": "INR", "receipt": "vehicle_9"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "order_Lx1", "entity": "order", "amount": 75_050, "status": "created"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = gateway(&server, 2_000).create_order(order()).await.unwrap();
    assert_eq!(id, "order_Lx1");
}

#[tokio::test]
async fn create_link_sends_customer_contact() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_links"))
        .and(body_partial_json(json!({
            "amount": 50_000,
            "customer": {"name": "Ravi Kumar", "contact": "9876543210", "email": "ravi@example.com"},
            "callback_method": "get"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "plink_Ab12",
            "short_url": "https://rzp.io/i/Ab12",
            "status": "created"
        })))
        .mount(&server)
        .await;

    let link = gateway(&server, 2_000)
        .create_link(LinkRequest {
            amount_minor: 50_000,
            currency: "INR".to_string(),
            description: "PDI inspection fee for Nexon EV".to_string(),
            recipient: LinkRecipient {
                name: "Ravi Kumar".to_string(),
                phone: "9876543210".to_string(),
                email: "ravi@example.com".to_string(),
            },
            callback_url: "http://localhost:8000/api/pdi/payment/callback/".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(link.link_id, "plink_Ab12");
    assert_eq!(link.short_url, "https://rzp.io/i/Ab12");
    assert_eq!(link.status, "created");
}

#[tokio::test]
async fn link_status_uses_latest_payment_not_the_claim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/payment_links/plink_Ab12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "plink_Ab12",
            "status": "paid",
            "payments": [
                {"payment_id": "pay_first", "status": "failed"},
                {"payment_id": "pay_second", "status": "captured"}
            ]
        })))
        .mount(&server)
        .await;

    let claim = CallbackClaim {
        payment_id: Some("pay_forged".to_string()),
        status: Some("paid".to_string()),
    };
    let status = gateway(&server, 2_000)
        .fetch_link_status("plink_Ab12", &claim)
        .await
        .unwrap();
    assert!(status.is_paid());
    assert_eq!(status.last_payment_id.as_deref(), Some("pay_second"));
}

#[tokio::test]
async fn unpaid_link_without_payments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/payment_links/plink_new"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "plink_new", "status": "created", "payments": null})),
        )
        .mount(&server)
        .await;

    let status = gateway(&server, 2_000)
        .fetch_link_status("plink_new", &CallbackClaim::default())
        .await
        .unwrap();
    assert!(!status.is_paid());
    assert!(status.last_payment_id.is_none());
}

#[tokio::test]
async fn non_success_status_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"code": "BAD_REQUEST_ERROR", "description": "Authentication failed"}
        })))
        .mount(&server)
        .await;

    let err = gateway(&server, 2_000).create_order(order()).await.unwrap_err();
    match err {
        GatewayError::Rejected { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Authentication failed"));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn slow_gateway_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "order_late"}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let err = gateway(&server, 50).create_order(order()).await.unwrap_err();
    assert!(err.is_timeout(), "got {:?}", err);
}

#[tokio::test]
async fn unparseable_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = gateway(&server, 2_000).create_order(order()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Malformed(_)));
}

#[tokio::test]
async fn live_signature_check_uses_key_secret() {
    let server = MockServer::start().await;
    let gw = gateway(&server, 2_000);
    let sig = expected_signature("rzp_test_secret", "order_1", "pay_1").unwrap();

    assert_eq!(
        gw.verify_signature("order_1", "pay_1", &sig).await.unwrap(),
        SignatureCheck::Valid
    );
    assert_eq!(
        gw.verify_signature("order_1", "PAYMENT_FAILED", &sig).await.unwrap(),
        SignatureCheck::Invalid
    );
}
