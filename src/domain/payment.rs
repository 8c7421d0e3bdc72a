use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Created,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Created => "created",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
        }
    }

    /// Maps a stored or gateway-reported status string. Razorpay link
    /// statuses other than `created` never reach the record directly, so
    /// anything unknown is treated as `pending`.
    pub fn parse(s: &str) -> PaymentStatus {
        match s {
            "created" => PaymentStatus::Created,
            "success" => PaymentStatus::Success,
            "failed" => PaymentStatus::Failed,
            _ => PaymentStatus::Pending,
        }
    }
}

/// Inspection fee in major currency units. Only built through
/// [`Amount::new`], so it always charges at least one minor unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Option<Amount> {
        let amount = Amount(value);
        (value > Decimal::ZERO && amount.to_minor_units() > 0).then_some(amount)
    }

    pub fn major(&self) -> Decimal {
        self.0
    }

    /// Paise for INR, rounded half away from zero. Fees are stored with two
    /// decimals, where this equals plain truncation.
    pub fn to_minor_units(&self) -> i64 {
        (self.0 * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerContact {
    pub customer_id: i64,
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl CustomerContact {
    pub fn is_contactable(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.phone.trim().is_empty()
            && !self.email.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    pub vehicle_id: i64,
    pub vehicle_model: String,
    pub status: PaymentStatus,
    pub external_reference: Option<String>,
    pub payment_link_id: Option<String>,
    pub amount: Amount,
    pub owner: Option<CustomerContact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentRequest {
    pub vehicle_id: i64,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    pub razorpay_payment_id: Option<String>,
    pub razorpay_payment_link_id: Option<String>,
    pub razorpay_payment_link_status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub vehicle_id: i64,
    pub model: String,
    pub amount: Decimal,
    pub amount_minor: i64,
    pub currency: String,
    pub order_id: Option<String>,
    pub payment_status: PaymentStatus,
    pub key_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub vehicle_id: i64,
    pub model: String,
    pub payment_status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub amount: Decimal,
}

impl From<&PaymentRecord> for StatusView {
    fn from(record: &PaymentRecord) -> Self {
        StatusView {
            vehicle_id: record.vehicle_id,
            model: record.vehicle_model.clone(),
            payment_status: record.status,
            transaction_id: record.external_reference.clone(),
            amount: record.amount.major(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkView {
    pub vehicle_id: i64,
    pub model: String,
    pub payment_status: PaymentStatus,
    pub payment_link_id: Option<String>,
    pub payment_link_url: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub status: &'static str,
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn amount(s: &str) -> Amount {
        Amount::new(Decimal::from_str(s).unwrap()).unwrap()
    }

    #[test]
    fn converts_whole_rupees_to_paise() {
        assert_eq!(amount("500.0").to_minor_units(), 50_000);
        assert_eq!(amount("1").to_minor_units(), 100);
    }

    #[test]
    fn rounds_fractional_paise_half_up() {
        assert_eq!(amount("499.995").to_minor_units(), 50_000);
        assert_eq!(amount("0.014").to_minor_units(), 1);
        assert_eq!(amount("19.99").to_minor_units(), 1_999);
    }

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(Amount::new(Decimal::ZERO).is_none());
        assert!(Amount::new(Decimal::from(-5)).is_none());
    }

    #[test]
    fn rejects_amounts_below_one_paisa() {
        assert!(Amount::new(Decimal::from_str("0.004").unwrap()).is_none());
        assert!(Amount::new(Decimal::from_str("0.005").unwrap()).is_some());
    }

    #[test]
    fn unknown_status_strings_fall_back_to_pending() {
        assert_eq!(PaymentStatus::parse("success"), PaymentStatus::Success);
        assert_eq!(PaymentStatus::parse("expired"), PaymentStatus::Pending);
    }

    #[test]
    fn contact_requires_every_channel() {
        let mut c = CustomerContact {
            customer_id: 1,
            name: "Asha".to_string(),
            phone: "9876543210".to_string(),
            email: "asha@example.com".to_string(),
        };
        assert!(c.is_contactable());
        c.phone = " ".to_string();
        assert!(!c.is_contactable());
    }
}
