use crate::domain::caller::Caller;
use crate::domain::error::PaymentError;
use crate::domain::payment::PaymentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Initiate,
    Verify,
    ViewStatus,
    SendLink,
    Callback,
}

/// How a non-privileged caller is matched to the customer behind a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnershipMode {
    /// Caller's linked customer id equals the record owner's id, for every action.
    #[default]
    CustomerId,
    /// Initiation matches by id, every other action by contact email.
    /// Kept only for clients built against the older email-matching behaviour.
    LegacyEmail,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationPolicy {
    pub ownership: OwnershipMode,
}

impl AuthorizationPolicy {
    pub fn new(ownership: OwnershipMode) -> Self {
        Self { ownership }
    }

    pub fn authorize(
        &self,
        caller: &Caller,
        record: &PaymentRecord,
        action: Action,
    ) -> Result<(), PaymentError> {
        if caller.is_privileged() {
            return Ok(());
        }
        if action != Action::SendLink && self.is_owner(caller, record, action) {
            return Ok(());
        }
        Err(PaymentError::PermissionDenied(denial_message(action).to_string()))
    }

    fn is_owner(&self, caller: &Caller, record: &PaymentRecord, action: Action) -> bool {
        let Some(owner) = &record.owner else {
            return false;
        };
        match (self.ownership, action) {
            (OwnershipMode::LegacyEmail, Action::Initiate) | (OwnershipMode::CustomerId, _) => {
                caller.customer_id == Some(owner.customer_id)
            }
            (OwnershipMode::LegacyEmail, _) => {
                !caller.email.is_empty() && caller.email == owner.email
            }
        }
    }
}

fn denial_message(action: Action) -> &'static str {
    match action {
        Action::Initiate => "you can only make payments for your own vehicle",
        Action::Verify => "you can only verify payments for your own vehicle",
        Action::ViewStatus => "you are not authorized to view this vehicle's status",
        Action::SendLink => "only staff can send payment links",
        Action::Callback => "you are not authorized to process this payment callback",
    }
}
