// Monetary Donations - user-to-user gift records

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::DocId;
use crate::entities::{DonationStatus, EntDonation, EntUser, UserSummary};
use crate::error::{AppError, AppResult};
use crate::framework::{Entity, Record};
use crate::infrastructure::{DocIdGenerator, DocQuery, DocumentStore, Filter, Identity};
use crate::schemas::{CreateDonationRequest, DonationQuery, Page, Pagination};
use crate::services::user_service::UserDirectory;

/// Donation as shown to clients; anonymous donations carry no donor
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationView {
    pub id: DocId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donor_id: Option<DocId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donor: Option<UserSummary>,
    pub recipient_id: DocId,
    pub recipient: UserSummary,
    pub amount: f64,
    pub currency: String,
    pub message: String,
    pub is_anonymous: bool,
    pub status: DonationStatus,
    pub payment_method: String,
    pub transaction_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DonationView {
    fn new(record: Record<EntDonation>, users: &HashMap<DocId, UserSummary>) -> AppResult<Self> {
        let donation = record.data;
        let recipient = users
            .get(&donation.recipient_id)
            .cloned()
            .ok_or_else(|| EntUser::not_found(donation.recipient_id))?;

        let (donor_id, donor) = if donation.is_anonymous {
            (None, None)
        } else {
            let donor = users
                .get(&donation.donor_id)
                .cloned()
                .ok_or_else(|| EntUser::not_found(donation.donor_id))?;
            (Some(donation.donor_id), Some(donor))
        };

        Ok(DonationView {
            id: record.id,
            donor_id,
            donor,
            recipient_id: donation.recipient_id,
            recipient,
            amount: donation.amount,
            currency: donation.currency,
            message: donation.message,
            is_anonymous: donation.is_anonymous,
            status: donation.status,
            payment_method: donation.payment_method,
            transaction_id: donation.transaction_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct DonationService {
    store: Arc<dyn DocumentStore>,
    ids: Arc<DocIdGenerator>,
    users: UserDirectory,
}

impl DonationService {
    pub fn new(store: Arc<dyn DocumentStore>, ids: Arc<DocIdGenerator>, users: UserDirectory) -> Self {
        Self { store, ids, users }
    }

    async fn views(&self, records: Vec<Record<EntDonation>>) -> AppResult<Vec<DonationView>> {
        let mut user_ids = Vec::with_capacity(records.len() * 2);
        for record in &records {
            user_ids.push(record.data.recipient_id);
            if !record.data.is_anonymous {
                user_ids.push(record.data.donor_id);
            }
        }
        let users = self.users.summaries(&user_ids).await?;

        records
            .into_iter()
            .map(|record| DonationView::new(record, &users))
            .collect()
    }

    pub async fn list(&self, query: &DonationQuery) -> AppResult<Page<DonationView>> {
        let mut filters = Vec::new();
        if let Some(donor_id) = query.donor_id {
            filters.push(Filter::eq("donorId", donor_id));
        }
        if let Some(recipient_id) = query.recipient_id {
            filters.push(Filter::eq("recipientId", recipient_id));
        }
        if let Some(status) = query.status {
            filters.push(Filter::eq("status", status.as_str()));
        }
        let page = query.page_request();

        let total = EntDonation::count_where(self.store.as_ref(), &filters).await?;
        let records = EntDonation::gen_where(
            self.store.as_ref(),
            &DocQuery::filtered(filters).page(page.offset(), page.limit as u64),
        )
        .await?;

        Ok(Page {
            items: self.views(records).await?,
            pagination: Pagination::new(page, total),
        })
    }

    pub async fn create(
        &self,
        identity: &Identity,
        request: CreateDonationRequest,
    ) -> AppResult<DonationView> {
        let donor = self.users.current(identity).await?;
        let donation = request.into_donation(donor.id, Uuid::new_v4().to_string())?;
        EntUser::gen_enforce(self.store.as_ref(), donation.recipient_id).await?;

        let record = EntDonation::insert_new(self.store.as_ref(), self.ids.next_id(), donation)
            .await?
            .ok_or_else(|| AppError::Conflict("Duplicate donation transaction".to_string()))?;
        tracing::info!(
            donation_id = %record.id,
            donor_id = %donor.id,
            recipient_id = %record.data.recipient_id,
            amount = record.data.amount,
            "donation recorded"
        );

        let mut views = self.views(vec![record]).await?;
        views
            .pop()
            .ok_or_else(|| AppError::Internal("Donation view missing".to_string()))
    }
}
