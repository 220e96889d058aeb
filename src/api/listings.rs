// Listing handlers - /api/listings

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::api::extract::{IdPath, ValidatedJson, ValidatedQuery};
use crate::app_state::AppState;
use crate::error::AppResult;
use crate::infrastructure::middleware::Vc;
use crate::schemas::{
    CreateListingRequest, CreateReviewRequest, ListingQuery, Page, PurchaseRequest,
    UpdateListingRequest,
};
use crate::services::{LikeOutcome, ListingView, PurchaseOutcome, ReviewsView, ViewCount};

pub async fn list_listings_handler(
    State(state): State<AppState>,
    vc: Vc,
    ValidatedQuery(query): ValidatedQuery<ListingQuery>,
) -> AppResult<Json<Page<ListingView>>> {
    Ok(Json(state.listings.list(&vc, &query).await?))
}

pub async fn create_listing_handler(
    State(state): State<AppState>,
    vc: Vc,
    ValidatedJson(request): ValidatedJson<CreateListingRequest>,
) -> AppResult<(StatusCode, Json<ListingView>)> {
    let identity = vc.require_identity()?;
    let listing = state.listings.create(identity, request).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn get_listing_handler(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ListingView>> {
    Ok(Json(state.listings.get(id).await?))
}

pub async fn update_listing_handler(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath,
    ValidatedJson(patch): ValidatedJson<UpdateListingRequest>,
) -> AppResult<Json<ListingView>> {
    let identity = vc.require_identity()?;
    Ok(Json(state.listings.update(id, identity, patch).await?))
}

pub async fn delete_listing_handler(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath,
) -> AppResult<Json<Value>> {
    let identity = vc.require_identity()?;
    state.listings.delete(id, identity).await?;
    Ok(Json(json!({"message": "Listing deleted successfully"})))
}

pub async fn purchase_listing_handler(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<PurchaseRequest>,
) -> AppResult<Json<PurchaseOutcome>> {
    let identity = vc.require_identity()?;
    Ok(Json(state.listings.purchase(id, identity, request).await?))
}

pub async fn list_reviews_handler(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ReviewsView>> {
    Ok(Json(state.listings.reviews(id).await?))
}

pub async fn create_review_handler(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<ReviewsView>)> {
    let identity = vc.require_identity()?;
    let reviews = state.listings.add_review(id, identity, request).await?;
    Ok((StatusCode::CREATED, Json(reviews)))
}

pub async fn toggle_like_handler(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath,
) -> AppResult<Json<LikeOutcome>> {
    let identity = vc.require_identity()?;
    Ok(Json(state.listings.toggle_like(id, identity).await?))
}

pub async fn record_view_handler(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ViewCount>> {
    Ok(Json(state.listings.record_view(id).await?))
}
