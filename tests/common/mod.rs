#![allow(dead_code)]

use pdi_payments::auth::policy::{AuthorizationPolicy, OwnershipMode};
use pdi_payments::domain::caller::{Caller, Role};
use pdi_payments::domain::error::GatewayError;
use pdi_payments::domain::payment::{Amount, CustomerContact, PaymentRecord, PaymentStatus};
use pdi_payments::gateways::mock::MockGateway;
use pdi_payments::gateways::{
    CallbackClaim, CreatedLink, LinkRequest, LinkStatus, OrderRequest, PaymentGateway,
    SignatureCheck,
};
use pdi_payments::repo::memory_store::MemoryPaymentStore;
use pdi_payments::service::payment_service::PaymentService;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const OWNER_CUSTOMER_ID: i64 = 42;
pub const OWNER_EMAIL: &str = "ravi@example.com";

/// Simulated gateway that counts every call. It can be switched to time
/// out, or to report paid links that list no payment.
#[derive(Default)]
pub struct CountingGateway {
    inner: MockGateway,
    pub orders: AtomicUsize,
    pub links: AtomicUsize,
    pub verifications: AtomicUsize,
    pub link_fetches: AtomicUsize,
    pub last_order_amount: Mutex<Option<i64>>,
    pub time_out: AtomicBool,
    pub paid_without_payment_id: AtomicBool,
}

impl CountingGateway {
    pub fn total_calls(&self) -> usize {
        self.orders.load(Ordering::SeqCst)
            + self.links.load(Ordering::SeqCst)
            + self.verifications.load(Ordering::SeqCst)
            + self.link_fetches.load(Ordering::SeqCst)
    }

    fn check_timeout(&self) -> Result<(), GatewayError> {
        if self.time_out.load(Ordering::SeqCst) {
            Err(GatewayError::Timeout(2500))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl PaymentGateway for CountingGateway {
    fn name(&self) -> &'static str {
        "counting-mock"
    }

    fn key_id(&self) -> &str {
        self.inner.key_id()
    }

    async fn create_order(&self, request: OrderRequest) -> Result<String, GatewayError> {
        self.orders.fetch_add(1, Ordering::SeqCst);
        self.check_timeout()?;
        *self.last_order_amount.lock().unwrap() = Some(request.amount_minor);
        self.inner.create_order(request).await
    }

    async fn create_link(&self, request: LinkRequest) -> Result<CreatedLink, GatewayError> {
        self.links.fetch_add(1, Ordering::SeqCst);
        self.check_timeout()?;
        self.inner.create_link(request).await
    }

    async fn verify_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<SignatureCheck, GatewayError> {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        self.check_timeout()?;
        self.inner.verify_signature(order_id, payment_id, signature).await
    }

    async fn fetch_link_status(
        &self,
        link_id: &str,
        claim: &CallbackClaim,
    ) -> Result<LinkStatus, GatewayError> {
        self.link_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_timeout()?;
        if self.paid_without_payment_id.load(Ordering::SeqCst) {
            return Ok(LinkStatus {
                status: "paid".to_string(),
                last_payment_id: None,
            });
        }
        self.inner.fetch_link_status(link_id, claim).await
    }
}

pub struct Harness {
    pub service: PaymentService,
    pub store: MemoryPaymentStore,
    pub gateway: Arc<CountingGateway>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_ownership(OwnershipMode::CustomerId)
    }

    pub fn with_ownership(ownership: OwnershipMode) -> Self {
        let store = MemoryPaymentStore::new();
        let gateway = Arc::new(CountingGateway::default());
        let service = PaymentService {
            store: Arc::new(store.clone()),
            gateway: gateway.clone(),
            policy: AuthorizationPolicy::new(ownership),
            currency: "INR".to_string(),
            callback_url: "http://localhost:8000/api/pdi/payment/callback/".to_string(),
        };
        Self {
            service,
            store,
            gateway,
        }
    }

    pub async fn record(&self, vehicle_id: i64) -> PaymentRecord {
        use pdi_payments::repo::payment_store::PaymentStore;
        self.store.read(vehicle_id).await.unwrap().unwrap()
    }
}

pub fn vehicle(vehicle_id: i64, amount: &str) -> PaymentRecord {
    PaymentRecord {
        vehicle_id,
        vehicle_model: "Nexon EV".to_string(),
        status: PaymentStatus::Pending,
        external_reference: None,
        payment_link_id: None,
        amount: Amount::new(Decimal::from_str(amount).unwrap()).unwrap(),
        owner: Some(CustomerContact {
            customer_id: OWNER_CUSTOMER_ID,
            name: "Ravi Kumar".to_string(),
            phone: "9876543210".to_string(),
            email: OWNER_EMAIL.to_string(),
        }),
    }
}

fn caller(user_id: i64, email: &str, customer_id: Option<i64>, roles: Vec<Role>) -> Caller {
    Caller {
        user_id,
        email: email.to_string(),
        customer_id,
        roles,
        is_staff: false,
        is_superuser: false,
    }
}

pub fn owner() -> Caller {
    caller(1, OWNER_EMAIL, Some(OWNER_CUSTOMER_ID), vec![Role::Customer])
}

pub fn staff() -> Caller {
    caller(2, "desk@carify.example", None, vec![Role::Staff])
}

pub fn stranger() -> Caller {
    caller(3, "someone@example.com", Some(7), vec![Role::Customer])
}
