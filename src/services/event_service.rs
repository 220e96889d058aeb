// Event Board - campus events with capacity-bounded RSVPs

use std::sync::Arc;

use crate::core::DocId;
use crate::entities::{EntEvent, EventStatus};
use crate::error::{AppError, AppResult};
use crate::framework::{Entity, Record};
use crate::infrastructure::{DocIdGenerator, DocQuery, DocumentStore, Filter, Mutation};
use crate::schemas::{CreateEventRequest, EventQuery};

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn DocumentStore>,
    ids: Arc<DocIdGenerator>,
}

impl EventService {
    pub fn new(store: Arc<dyn DocumentStore>, ids: Arc<DocIdGenerator>) -> Self {
        Self { store, ids }
    }

    /// Soonest first
    pub async fn list(&self, query: &EventQuery) -> AppResult<Vec<Record<EntEvent>>> {
        let mut filters = Vec::new();
        if let Some(status) = query.status {
            filters.push(Filter::eq("status", status.as_str()));
        }
        if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
            filters.push(Filter::eq("category", category));
        }

        EntEvent::gen_where(
            self.store.as_ref(),
            &DocQuery::filtered(filters).sorted_by("eventDate", true),
        )
        .await
    }

    pub async fn create(&self, request: CreateEventRequest) -> AppResult<Record<EntEvent>> {
        let event = request.into_event()?;
        let record = EntEvent::insert_new(self.store.as_ref(), self.ids.next_id(), event)
            .await?
            .ok_or_else(|| AppError::Internal("Event id collision".to_string()))?;
        tracing::info!(event_id = %record.id, max_attendees = record.data.max_attendees, "event created");
        Ok(record)
    }

    /// A single conditional increment; the event is re-read only to explain a refusal
    pub async fn rsvp(&self, id: DocId) -> AppResult<Record<EntEvent>> {
        let updated = EntEvent::update_where(
            self.store.as_ref(),
            id,
            &[
                Filter::eq("status", EventStatus::Active.as_str()),
                Filter::under_capacity("currentAttendees", "maxAttendees"),
            ],
            &[Mutation::inc("currentAttendees", 1)],
        )
        .await?;

        if let Some(event) = updated {
            tracing::debug!(event_id = %id, attendees = event.data.current_attendees, "rsvp recorded");
            return Ok(event);
        }

        let event = EntEvent::gen_enforce(self.store.as_ref(), id).await?;
        if event.data.status != EventStatus::Active {
            return Err(AppError::Conflict("Event is not active".to_string()));
        }
        if event.data.is_full() {
            return Err(AppError::Conflict("Event is full".to_string()));
        }
        // Active with room left: the event changed between the update and the re-read
        Err(AppError::Conflict("Event is not accepting RSVPs, try again".to_string()))
    }
}
