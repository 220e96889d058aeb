// Donation Schemas - monetary gift requests

use serde::Deserialize;

use crate::core::DocId;
use crate::entities::{DonationStatus, EntDonation};
use crate::error::AppResult;
use crate::schemas::validation::{non_blank, FieldValidator, Validator, CURRENCY_PATTERN};

pub const DEFAULT_CURRENCY: &str = "USD";
pub const MIN_DONATION_AMOUNT: f64 = 0.01;

/// POST /donations
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateDonationRequest {
    pub recipient_id: Option<DocId>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub message: Option<String>,
    pub is_anonymous: Option<bool>,
    pub payment_method: Option<String>,
}

impl CreateDonationRequest {
    /// Status and transaction id are assigned here, never taken from input
    pub fn into_donation(self, donor_id: DocId, transaction_id: String) -> AppResult<EntDonation> {
        let mut v = Validator::new();
        v.required("recipientId", &self.recipient_id);
        match self.amount {
            Some(amount) => {
                v.check_number(
                    "amount",
                    amount,
                    &[FieldValidator::Range(MIN_DONATION_AMOUNT, f64::MAX)],
                );
            }
            None => {
                v.push("amount is required");
            }
        }
        v.optional_str(
            "currency",
            self.currency.as_deref(),
            &[FieldValidator::Pattern(CURRENCY_PATTERN)],
        )?;
        v.optional_str("message", self.message.as_deref(), &[FieldValidator::MaxLength(500)])?;
        v.required_str(
            "paymentMethod",
            self.payment_method.as_deref(),
            &[FieldValidator::MaxLength(50)],
        )?;
        v.finish("Invalid donation")?;

        Ok(EntDonation {
            donor_id,
            recipient_id: self.recipient_id.unwrap_or(donor_id),
            amount: self.amount.unwrap_or(MIN_DONATION_AMOUNT),
            currency: non_blank(self.currency).unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            message: self.message.unwrap_or_default(),
            is_anonymous: self.is_anonymous.unwrap_or(false),
            status: DonationStatus::Pending,
            payment_method: non_blank(self.payment_method).unwrap_or_default(),
            transaction_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let request: CreateDonationRequest = serde_json::from_value(json!({
            "recipientId": "42",
            "amount": 5,
            "paymentMethod": "card"
        }))
        .unwrap();

        let donation = request.into_donation(DocId::new(7), "tx-1".to_string()).unwrap();
        assert_eq!(donation.recipient_id, DocId::new(42));
        assert_eq!(donation.currency, "USD");
        assert_eq!(donation.status, DonationStatus::Pending);
        assert!(!donation.is_anonymous);
        assert_eq!(donation.transaction_id, "tx-1");
    }

    #[test]
    fn test_rejects_small_amount_and_bad_currency() {
        let request: CreateDonationRequest = serde_json::from_value(json!({
            "recipientId": "42",
            "amount": 0.001,
            "currency": "usd",
            "paymentMethod": "card"
        }))
        .unwrap();

        match request.into_donation(DocId::new(7), "tx-1".to_string()) {
            Err(AppError::Validation { details, .. }) => {
                assert_eq!(
                    details,
                    vec!["amount must be at least 0.01", "currency format is invalid"]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_status_is_not_accepted() {
        let result = serde_json::from_value::<CreateDonationRequest>(json!({
            "recipientId": "42",
            "amount": 5,
            "paymentMethod": "card",
            "status": "completed"
        }));
        assert!(result.is_err());
    }
}
