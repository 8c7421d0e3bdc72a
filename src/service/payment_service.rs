use crate::auth::policy::{Action, AuthorizationPolicy};
use crate::domain::caller::Caller;
use crate::domain::error::{GatewayError, PaymentError};
use crate::domain::payment::{
    CallbackQuery, LinkView, PaymentRecord, PaymentStatus, StatusView, VerifyPaymentRequest,
};
use crate::gateways::{CallbackClaim, LinkRecipient, LinkRequest, OrderRequest, PaymentGateway, SignatureCheck};
use crate::repo::payment_store::{LockedRecord, PaymentStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct PaymentService {
    pub store: Arc<dyn PaymentStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub policy: AuthorizationPolicy,
    pub currency: String,
    pub callback_url: String,
}

#[derive(Debug, Clone)]
pub enum InitiateOutcome {
    Created(PaymentRecord),
    AlreadyCompleted(PaymentRecord),
}

impl InitiateOutcome {
    pub fn record(&self) -> &PaymentRecord {
        match self {
            InitiateOutcome::Created(r) | InitiateOutcome::AlreadyCompleted(r) => r,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifyOutcome {
    pub vehicle_id: i64,
    pub new_status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallbackOutcome {
    pub vehicle_id: i64,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    /// Status the gateway reported for the link.
    pub link_status: String,
}

impl PaymentService {
    /// Creates a gateway order for the vehicle's stored fee. A vehicle that
    /// is already paid is returned as-is without touching the gateway; any
    /// other state mints a fresh order id, replacing the previous one.
    pub async fn initiate_order(
        &self,
        vehicle_id: i64,
        caller: &Caller,
    ) -> Result<InitiateOutcome, PaymentError> {
        let locked = self.lock(vehicle_id).await?;
        let current = locked.record().clone();
        self.deny_logged(caller, &current, Action::Initiate)?;

        if current.status == PaymentStatus::Success {
            tracing::info!(vehicle_id, "payment already completed, skipping order creation");
            return Ok(InitiateOutcome::AlreadyCompleted(current));
        }

        let order_id = self
            .gateway
            .create_order(OrderRequest {
                amount_minor: current.amount.to_minor_units(),
                currency: self.currency.clone(),
                receipt: format!("vehicle_{}", vehicle_id),
            })
            .await
            .map_err(|e| gateway_failure(vehicle_id, "create_order", e))?;

        let mut updated = current.clone();
        updated.external_reference = Some(order_id);
        updated.status = PaymentStatus::Pending;
        locked.commit(&updated).await?;

        tracing::info!(
            vehicle_id,
            gateway = self.gateway.name(),
            order_id = updated.external_reference.as_deref().unwrap_or_default(),
            previous_status = current.status.as_str(),
            "payment order created"
        );
        Ok(InitiateOutcome::Created(updated))
    }

    pub async fn verify_payment(
        &self,
        caller: &Caller,
        req: &VerifyPaymentRequest,
    ) -> Result<VerifyOutcome, PaymentError> {
        if req.razorpay_order_id.trim().is_empty() || req.razorpay_payment_id.trim().is_empty() {
            return Err(PaymentError::Validation(
                "razorpay_order_id and razorpay_payment_id are required".to_string(),
            ));
        }

        let vehicle_id = req.vehicle_id;
        let locked = self.lock(vehicle_id).await?;
        let current = locked.record().clone();
        self.deny_logged(caller, &current, Action::Verify)?;

        // Success and failure both close the order attempt; a retry goes
        // through a fresh initiate.
        let settled = match current.status {
            PaymentStatus::Success => Some("payment already completed for this vehicle"),
            PaymentStatus::Failed => Some("payment attempt already failed, create a new order to retry"),
            PaymentStatus::Pending | PaymentStatus::Created => None,
        };
        if let Some(message) = settled {
            tracing::warn!(
                vehicle_id,
                status = current.status.as_str(),
                "verify on settled payment rejected"
            );
            return Err(PaymentError::Validation(message.to_string()));
        }

        if current.external_reference.as_deref() != Some(req.razorpay_order_id.as_str()) {
            tracing::warn!(
                vehicle_id,
                presented = %req.razorpay_order_id,
                "order id does not match stored reference"
            );
            return Err(PaymentError::Validation(
                "order id mismatch, possible fraud attempt".to_string(),
            ));
        }

        let check = self
            .gateway
            .verify_signature(
                &req.razorpay_order_id,
                &req.razorpay_payment_id,
                &req.razorpay_signature,
            )
            .await
            .map_err(|e| gateway_failure(vehicle_id, "verify_signature", e))?;

        let mut updated = current;
        match check {
            SignatureCheck::Valid => {
                updated.status = PaymentStatus::Success;
                updated.external_reference = Some(req.razorpay_payment_id.clone());
                locked.commit(&updated).await?;
                tracing::info!(vehicle_id, payment_id = %req.razorpay_payment_id, "payment verified");
                Ok(VerifyOutcome {
                    vehicle_id,
                    new_status: PaymentStatus::Success,
                })
            }
            SignatureCheck::Invalid => {
                updated.status = PaymentStatus::Failed;
                locked.commit(&updated).await?;
                tracing::warn!(vehicle_id, "payment signature rejected, marked failed");
                Err(PaymentError::SignatureInvalid { vehicle_id })
            }
        }
    }

    pub async fn status(&self, vehicle_id: i64, caller: &Caller) -> Result<StatusView, PaymentError> {
        let record = self
            .store
            .read(vehicle_id)
            .await?
            .ok_or_else(|| vehicle_not_found(vehicle_id))?;
        self.deny_logged(caller, &record, Action::ViewStatus)?;
        Ok(StatusView::from(&record))
    }

    pub async fn send_payment_link(
        &self,
        vehicle_id: i64,
        caller: &Caller,
    ) -> Result<LinkView, PaymentError> {
        let locked = self.lock(vehicle_id).await?;
        let current = locked.record().clone();
        self.deny_logged(caller, &current, Action::SendLink)?;

        let customer = current
            .owner
            .as_ref()
            .filter(|c| c.is_contactable())
            .ok_or_else(|| {
                PaymentError::Validation(
                    "customer details are missing for this vehicle, cannot send link".to_string(),
                )
            })?;

        let link = self
            .gateway
            .create_link(LinkRequest {
                amount_minor: current.amount.to_minor_units(),
                currency: self.currency.clone(),
                description: format!("Payment for Vehicle #{} - {}", vehicle_id, current.vehicle_model),
                recipient: LinkRecipient {
                    name: customer.name.clone(),
                    phone: customer.phone.clone(),
                    email: customer.email.clone(),
                },
                callback_url: self.callback_url.clone(),
            })
            .await
            .map_err(|e| gateway_failure(vehicle_id, "create_link", e))?;

        let mut updated = current;
        updated.payment_link_id = Some(link.link_id.clone());
        updated.status = PaymentStatus::parse(&link.status);
        locked.commit(&updated).await?;

        tracing::info!(vehicle_id, link_id = %link.link_id, "payment link created");
        Ok(LinkView {
            vehicle_id,
            model: updated.vehicle_model,
            payment_status: updated.status,
            payment_link_id: updated.payment_link_id,
            payment_link_url: link.short_url,
        })
    }

    /// Reconciles a payment-link redirect. The outcome comes from the
    /// gateway strategy, never from the query string, except in simulated
    /// mode where the strategy itself echoes the claim.
    pub async fn handle_callback(
        &self,
        caller: &Caller,
        query: &CallbackQuery,
    ) -> Result<CallbackOutcome, PaymentError> {
        let link_id = query
            .razorpay_payment_link_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PaymentError::Validation("missing payment link id".to_string()))?;

        let not_found =
            || PaymentError::NotFound("no vehicle found associated with this payment link".to_string());
        let vehicle_id = self
            .store
            .vehicle_for_link(link_id)
            .await?
            .ok_or_else(not_found)?;

        let locked = self.lock(vehicle_id).await?;
        let current = locked.record().clone();
        if current.payment_link_id.as_deref() != Some(link_id) {
            return Err(not_found());
        }
        self.deny_logged(caller, &current, Action::Callback)?;

        if current.status == PaymentStatus::Success {
            tracing::info!(vehicle_id, link_id, "callback for completed payment ignored");
            return Ok(CallbackOutcome {
                vehicle_id,
                status: PaymentStatus::Success,
                transaction_id: current.external_reference,
                link_status: "paid".to_string(),
            });
        }

        let claim = CallbackClaim {
            payment_id: query.razorpay_payment_id.clone().filter(|s| !s.is_empty()),
            status: query.razorpay_payment_link_status.clone(),
        };
        let fetched = self
            .gateway
            .fetch_link_status(link_id, &claim)
            .await
            .map_err(|e| gateway_failure(vehicle_id, "fetch_link_status", e))?;

        let mut updated = current;
        if fetched.is_paid() {
            let payment_id = fetched
                .last_payment_id
                .clone()
                .or(claim.payment_id)
                .ok_or_else(|| {
                    gateway_failure(
                        vehicle_id,
                        "fetch_link_status",
                        GatewayError::Malformed("paid link has no payment id".to_string()),
                    )
                })?;
            updated.status = PaymentStatus::Success;
            updated.external_reference = Some(payment_id);
        } else {
            updated.status = PaymentStatus::Failed;
        }
        locked.commit(&updated).await?;

        tracing::info!(
            vehicle_id,
            link_id,
            link_status = %fetched.status,
            new_status = updated.status.as_str(),
            "payment link callback reconciled"
        );
        Ok(CallbackOutcome {
            vehicle_id,
            status: updated.status,
            transaction_id: updated.external_reference,
            link_status: fetched.status,
        })
    }

    async fn lock(&self, vehicle_id: i64) -> Result<Box<dyn LockedRecord>, PaymentError> {
        self.store
            .lock(vehicle_id)
            .await?
            .ok_or_else(|| vehicle_not_found(vehicle_id))
    }

    fn deny_logged(
        &self,
        caller: &Caller,
        record: &PaymentRecord,
        action: Action,
    ) -> Result<(), PaymentError> {
        self.policy.authorize(caller, record, action).map_err(|e| {
            tracing::warn!(
                vehicle_id = record.vehicle_id,
                user_id = caller.user_id,
                ?action,
                "payment action denied"
            );
            e
        })
    }
}

fn vehicle_not_found(vehicle_id: i64) -> PaymentError {
    PaymentError::NotFound(format!("vehicle {} not found", vehicle_id))
}

fn gateway_failure(vehicle_id: i64, call: &'static str, e: GatewayError) -> PaymentError {
    tracing::warn!(vehicle_id, call, error = %e, "gateway call failed");
    PaymentError::Gateway(e)
}
