// Donation/Borrow Registry - donated items claimed by one borrower each

use chrono::Utc;
use std::sync::Arc;

use crate::core::DocId;
use crate::entities::EntDonatedItem;
use crate::error::{AppError, AppResult};
use crate::framework::{Entity, Record};
use crate::infrastructure::{DocIdGenerator, DocQuery, DocumentStore, Filter, Mutation};
use crate::schemas::{BorrowRequest, CreateDonatedItemRequest, DonatedItemQuery, Page, Pagination};
use crate::services::notification_service::NotificationService;

#[derive(Clone)]
pub struct DonatedItemService {
    store: Arc<dyn DocumentStore>,
    ids: Arc<DocIdGenerator>,
    notifications: NotificationService,
}

impl DonatedItemService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        ids: Arc<DocIdGenerator>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            store,
            ids,
            notifications,
        }
    }

    pub async fn list(&self, query: &DonatedItemQuery) -> AppResult<Page<Record<EntDonatedItem>>> {
        let mut filters = Vec::new();
        if let Some(category) = query.category {
            filters.push(Filter::eq("category", category.as_str()));
        }
        if let Some(available) = query.available {
            filters.push(Filter::eq("available", available));
        }
        let page = query.page_request();

        let total = EntDonatedItem::count_where(self.store.as_ref(), &filters).await?;
        let items = EntDonatedItem::gen_where(
            self.store.as_ref(),
            &DocQuery::filtered(filters).page(page.offset(), page.limit as u64),
        )
        .await?;

        Ok(Page {
            items,
            pagination: Pagination::new(page, total),
        })
    }

    pub async fn create(&self, request: CreateDonatedItemRequest) -> AppResult<Record<EntDonatedItem>> {
        let item = request.into_item()?;
        let record = EntDonatedItem::insert_new(self.store.as_ref(), self.ids.next_id(), item)
            .await?
            .ok_or_else(|| AppError::Internal("Donated item id collision".to_string()))?;
        tracing::info!(item_id = %record.id, category = record.data.category.as_str(), "item donated");
        Ok(record)
    }

    /// Claims the item only while it is still available, in one statement
    pub async fn borrow(&self, id: DocId, request: BorrowRequest) -> AppResult<Record<EntDonatedItem>> {
        let borrower = request.into_borrower()?;

        let borrowed = EntDonatedItem::update_where(
            self.store.as_ref(),
            id,
            &[Filter::eq("available", true)],
            &[
                Mutation::set("available", false),
                Mutation::set("borrowedBy", borrower.name.as_str()),
                Mutation::set("borrowedAt", serde_json::to_value(Utc::now())?),
            ],
        )
        .await?;

        let item = match borrowed {
            Some(item) => item,
            None => {
                return match EntDonatedItem::gen_nullable(self.store.as_ref(), Some(id)).await? {
                    None => Err(EntDonatedItem::not_found(id)),
                    Some(_) => Err(AppError::Conflict(
                        "Item is not available for borrowing".to_string(),
                    )),
                };
            }
        };
        tracing::info!(item_id = %id, borrower = %borrower.name, "item borrowed");

        self.notifications.item_borrowed(&item, &borrower).await;
        Ok(item)
    }
}
