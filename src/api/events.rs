// Event handlers - /api/events

use axum::{extract::State, http::StatusCode, Json};

use crate::api::extract::{IdPath, ValidatedJson, ValidatedQuery};
use crate::app_state::AppState;
use crate::entities::EntEvent;
use crate::error::AppResult;
use crate::framework::Record;
use crate::schemas::{CreateEventRequest, EventQuery};

pub async fn list_events_handler(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<EventQuery>,
) -> AppResult<Json<Vec<Record<EntEvent>>>> {
    Ok(Json(state.events.list(&query).await?))
}

pub async fn create_event_handler(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<Record<EntEvent>>)> {
    let event = state.events.create(request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn rsvp_event_handler(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<Record<EntEvent>>> {
    Ok(Json(state.events.rsvp(id).await?))
}
