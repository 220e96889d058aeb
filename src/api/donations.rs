// Donation handlers - /api/donations

use axum::{extract::State, http::StatusCode, Json};

use crate::api::extract::{ValidatedJson, ValidatedQuery};
use crate::app_state::AppState;
use crate::error::AppResult;
use crate::infrastructure::middleware::Vc;
use crate::schemas::{CreateDonationRequest, DonationQuery, Page};
use crate::services::DonationView;

pub async fn list_donations_handler(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<DonationQuery>,
) -> AppResult<Json<Page<DonationView>>> {
    Ok(Json(state.donations.list(&query).await?))
}

pub async fn create_donation_handler(
    State(state): State<AppState>,
    vc: Vc,
    ValidatedJson(request): ValidatedJson<CreateDonationRequest>,
) -> AppResult<(StatusCode, Json<DonationView>)> {
    let identity = vc.require_identity()?;
    let donation = state.donations.create(identity, request).await?;
    Ok((StatusCode::CREATED, Json(donation)))
}
