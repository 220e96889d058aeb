// Donated item handlers - /api/donated-items

use axum::{extract::State, http::StatusCode, Json};

use crate::api::extract::{IdPath, ValidatedJson, ValidatedQuery};
use crate::app_state::AppState;
use crate::entities::EntDonatedItem;
use crate::error::AppResult;
use crate::framework::Record;
use crate::schemas::{BorrowRequest, CreateDonatedItemRequest, DonatedItemQuery, Page};

pub async fn list_donated_items_handler(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<DonatedItemQuery>,
) -> AppResult<Json<Page<Record<EntDonatedItem>>>> {
    Ok(Json(state.donated_items.list(&query).await?))
}

pub async fn create_donated_item_handler(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateDonatedItemRequest>,
) -> AppResult<(StatusCode, Json<Record<EntDonatedItem>>)> {
    let item = state.donated_items.create(request).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn borrow_donated_item_handler(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<BorrowRequest>,
) -> AppResult<Json<Record<EntDonatedItem>>> {
    Ok(Json(state.donated_items.borrow(id, request).await?))
}
