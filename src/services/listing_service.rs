// Listing Catalog - for-sale items, their reviews, likes, views and purchase

use serde::Serialize;
use std::sync::Arc;

use crate::core::DocId;
use crate::entities::{EntListing, EntUser, ListingStatus, Review, UserSummary};
use crate::error::{AppError, AppResult};
use crate::framework::{Entity, Record};
use crate::infrastructure::{
    DocIdGenerator, DocLocks, DocQuery, DocumentStore, Filter, Identity, Mutation, ViewerContext,
};
use crate::schemas::{
    CreateListingRequest, CreateReviewRequest, ListingQuery, Page, Pagination, PurchaseRequest,
    UpdateListingRequest,
};
use crate::services::notification_service::NotificationService;
use crate::services::user_service::UserDirectory;

/// A listing with its seller attached
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: Record<EntListing>,
    pub seller: UserSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsView {
    pub reviews: Vec<ReviewView>,
    pub average_rating: f64,
    pub total_ratings: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOutcome {
    pub success: bool,
    pub listing: Record<EntListing>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeOutcome {
    pub liked: bool,
    pub likes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewCount {
    pub views: i64,
}

#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn DocumentStore>,
    ids: Arc<DocIdGenerator>,
    users: UserDirectory,
    notifications: NotificationService,
    // Reviews, likes and edits rewrite the whole document; one writer per listing
    write_locks: Arc<DocLocks>,
}

impl ListingService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        ids: Arc<DocIdGenerator>,
        users: UserDirectory,
        notifications: NotificationService,
    ) -> Self {
        Self {
            store,
            ids,
            users,
            notifications,
            write_locks: Arc::new(DocLocks::default()),
        }
    }

    fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    async fn ensure_owner(&self, identity: &Identity, listing: &EntListing) -> AppResult<()> {
        let requester = self.users.current(identity).await?;
        if listing.seller_id != requester.id {
            return Err(AppError::Forbidden(
                "Only the seller can modify this listing".to_string(),
            ));
        }
        Ok(())
    }

    async fn attach_sellers(&self, listings: Vec<Record<EntListing>>) -> AppResult<Vec<ListingView>> {
        let seller_ids: Vec<DocId> = listings.iter().map(|l| l.data.seller_id).collect();
        let sellers = self.users.summaries(&seller_ids).await?;

        listings
            .into_iter()
            .map(|listing| {
                let seller = sellers
                    .get(&listing.data.seller_id)
                    .cloned()
                    .ok_or_else(|| EntUser::not_found(listing.data.seller_id))?;
                Ok(ListingView { listing, seller })
            })
            .collect()
    }

    async fn attach_reviewers(&self, listing: Record<EntListing>) -> AppResult<ReviewsView> {
        let reviewer_ids: Vec<DocId> = listing.data.reviews.iter().map(|r| r.user_id).collect();
        let reviewers = self.users.summaries(&reviewer_ids).await?;

        let mut reviews = Vec::with_capacity(listing.data.reviews.len());
        for review in listing.data.reviews {
            let user = reviewers
                .get(&review.user_id)
                .cloned()
                .ok_or_else(|| EntUser::not_found(review.user_id))?;
            reviews.push(ReviewView { review, user });
        }

        Ok(ReviewsView {
            reviews,
            average_rating: listing.data.average_rating,
            total_ratings: listing.data.total_ratings,
        })
    }

    async fn list_filters(&self, vc: &ViewerContext, query: &ListingQuery) -> AppResult<Vec<Filter>> {
        let status = query.status.unwrap_or(ListingStatus::Active);
        let mut filters = vec![Filter::eq("status", status.as_str())];

        if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
            filters.push(Filter::eq("category", category));
        }
        if let Some(min_price) = query.min_price {
            filters.push(Filter::gte("price", min_price));
        }
        if let Some(max_price) = query.max_price {
            filters.push(Filter::lte("price", max_price));
        }
        if let Some(location) = query.location.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            filters.push(Filter::contains_ci("location", location));
        }
        match query.seller_id.as_deref() {
            Some("me") => {
                let me = self.users.current(vc.require_identity()?).await?;
                filters.push(Filter::eq("sellerId", me.id));
            }
            Some(raw) => {
                let seller_id: DocId = raw
                    .parse()
                    .map_err(|_| AppError::validation(format!("sellerId {} is invalid", raw)))?;
                filters.push(Filter::eq("sellerId", seller_id));
            }
            None => {}
        }
        Ok(filters)
    }

    /// Newest first; status defaults to active
    pub async fn list(&self, vc: &ViewerContext, query: &ListingQuery) -> AppResult<Page<ListingView>> {
        let filters = self.list_filters(vc, query).await?;
        let page = query.page_request();

        let total = EntListing::count_where(self.store(), &filters).await?;
        let listings = EntListing::gen_where(
            self.store(),
            &DocQuery::filtered(filters).page(page.offset(), page.limit as u64),
        )
        .await?;

        Ok(Page {
            items: self.attach_sellers(listings).await?,
            pagination: Pagination::new(page, total),
        })
    }

    pub async fn create(
        &self,
        identity: &Identity,
        request: CreateListingRequest,
    ) -> AppResult<ListingView> {
        request.validate()?;
        let seller = self.users.current(identity).await?;
        let listing = request.into_listing(seller.id)?;

        let record = EntListing::insert_new(self.store(), self.ids.next_id(), listing)
            .await?
            .ok_or_else(|| AppError::Internal("Listing id collision".to_string()))?;
        tracing::info!(listing_id = %record.id, seller_id = %seller.id, "listing created");

        Ok(ListingView {
            listing: record,
            seller: UserSummary::from(&seller),
        })
    }

    pub async fn get(&self, id: DocId) -> AppResult<ListingView> {
        let listing = EntListing::gen_enforce(self.store(), id).await?;
        let seller = self.users.summary(listing.data.seller_id).await?;
        Ok(ListingView { listing, seller })
    }

    pub async fn update(
        &self,
        id: DocId,
        identity: &Identity,
        patch: UpdateListingRequest,
    ) -> AppResult<ListingView> {
        patch.validate()?;
        let requester = self.users.current(identity).await?;

        let _guard = self.write_locks.lock(id).await;
        let listing = EntListing::gen_modify(self.store(), id, |listing| {
            if listing.seller_id != requester.id {
                return Err(AppError::Forbidden(
                    "Only the seller can modify this listing".to_string(),
                ));
            }
            if listing.status == ListingStatus::Sold && patch.status.is_some() {
                return Err(AppError::Conflict(
                    "A sold listing cannot change status".to_string(),
                ));
            }
            patch.apply_to(listing);
            Ok(())
        })
        .await?;
        tracing::info!(listing_id = %id, "listing updated");

        Ok(ListingView {
            listing,
            seller: UserSummary::from(&requester),
        })
    }

    pub async fn delete(&self, id: DocId, identity: &Identity) -> AppResult<()> {
        let listing = EntListing::gen_enforce(self.store(), id).await?;
        self.ensure_owner(identity, &listing.data).await?;

        if !EntListing::delete(self.store(), id).await? {
            return Err(EntListing::not_found(id));
        }
        tracing::info!(listing_id = %id, "listing deleted");
        Ok(())
    }

    pub async fn add_review(
        &self,
        id: DocId,
        identity: &Identity,
        request: CreateReviewRequest,
    ) -> AppResult<ReviewsView> {
        let rater = self.users.current(identity).await?;
        let review = request.into_review(rater.id)?;

        let guard = self.write_locks.lock(id).await;
        let listing = EntListing::gen_modify(self.store(), id, |listing| {
            if listing.seller_id == rater.id {
                return Err(AppError::Forbidden(
                    "You cannot review your own listing".to_string(),
                ));
            }
            if listing.has_review_from(rater.id) {
                return Err(AppError::Conflict(
                    "You have already reviewed this listing".to_string(),
                ));
            }
            listing.push_review(review.clone());
            Ok(())
        })
        .await?;
        drop(guard);
        tracing::info!(listing_id = %id, rater_id = %rater.id, rating = review.rating, "review added");

        self.attach_reviewers(listing).await
    }

    pub async fn reviews(&self, id: DocId) -> AppResult<ReviewsView> {
        let listing = EntListing::gen_enforce(self.store(), id).await?;
        self.attach_reviewers(listing).await
    }

    /// One conditional `active -> sold` flip; notifications follow and never roll it back.
    /// The caller must have a profile; the body carries the contact details to mail.
    pub async fn purchase(
        &self,
        id: DocId,
        identity: &Identity,
        request: PurchaseRequest,
    ) -> AppResult<PurchaseOutcome> {
        let buyer = request.into_buyer()?;
        let buyer_profile = self.users.resolve(identity).await.map_err(|e| match e {
            AppError::NotFound(_) => AppError::NotFound("Buyer not found".to_string()),
            other => other,
        })?;

        let sold = EntListing::update_where(
            self.store(),
            id,
            &[Filter::eq("status", ListingStatus::Active.as_str())],
            &[Mutation::set("status", ListingStatus::Sold.as_str())],
        )
        .await?;

        let listing = match sold {
            Some(listing) => listing,
            None => {
                return match EntListing::gen_nullable(self.store(), Some(id)).await? {
                    None => Err(EntListing::not_found(id)),
                    Some(_) => Err(AppError::Conflict(
                        "Item is not available for purchase".to_string(),
                    )),
                };
            }
        };
        tracing::info!(listing_id = %id, buyer_id = %buyer_profile.id, buyer = %buyer.email, "listing purchased");

        let seller = EntUser::gen_nullable(self.store(), Some(listing.data.seller_id))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(listing_id = %id, error = %e, "failed to load seller for notification");
                None
            });
        self.notifications
            .listing_purchased(&listing, seller.as_ref().map(|s| &s.data), &buyer)
            .await;

        Ok(PurchaseOutcome {
            success: true,
            listing,
            message: "Purchase completed successfully".to_string(),
        })
    }

    /// Like or unlike; a user appears in `likes` at most once
    pub async fn toggle_like(&self, id: DocId, identity: &Identity) -> AppResult<LikeOutcome> {
        let user = self.users.current(identity).await?;

        let _guard = self.write_locks.lock(id).await;
        let listing = EntListing::gen_modify(self.store(), id, |listing| {
            match listing.likes.iter().position(|liker| *liker == user.id) {
                Some(index) => {
                    listing.likes.remove(index);
                }
                None => listing.likes.push(user.id),
            }
            Ok(())
        })
        .await?;

        Ok(LikeOutcome {
            liked: listing.data.likes.contains(&user.id),
            likes: listing.data.likes.len(),
        })
    }

    pub async fn record_view(&self, id: DocId) -> AppResult<ViewCount> {
        let listing = EntListing::update_where(self.store(), id, &[], &[Mutation::inc("views", 1)])
            .await?
            .ok_or_else(|| EntListing::not_found(id))?;
        Ok(ViewCount {
            views: listing.data.views,
        })
    }
}
