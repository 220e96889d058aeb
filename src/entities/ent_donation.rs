// EntDonation - a monetary gift between two users

use serde::{Deserialize, Serialize};

use crate::core::DocId;
use crate::framework::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::Completed => "completed",
            DonationStatus::Failed => "failed",
            DonationStatus::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntDonation {
    pub donor_id: DocId,
    pub recipient_id: DocId,
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_anonymous: bool,
    pub status: DonationStatus,
    pub payment_method: String,
    /// Unique
    pub transaction_id: String,
}

impl Entity for EntDonation {
    const COLLECTION: &'static str = "donations";
    const ENTITY_NAME: &'static str = "Donation";
}
