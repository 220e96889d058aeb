// EntEvent - a campus event with a capacity-bounded RSVP counter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::framework::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Active,
    Cancelled,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Active => "active",
            EventStatus::Cancelled => "cancelled",
            EventStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntEvent {
    pub title: String,
    pub event_date: DateTime<Utc>,
    pub organizer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// 0 means unlimited
    #[serde(default)]
    pub max_attendees: i64,
    #[serde(default)]
    pub current_attendees: i64,
    pub status: EventStatus,
}

impl Entity for EntEvent {
    const COLLECTION: &'static str = "events";
    const ENTITY_NAME: &'static str = "Event";
}

impl EntEvent {
    pub fn is_full(&self) -> bool {
        self.max_attendees > 0 && self.current_attendees >= self.max_attendees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(max: i64, current: i64) -> EntEvent {
        serde_json::from_value(json!({
            "title": "Career Fair",
            "eventDate": "2025-04-12T09:00:00Z",
            "organizer": "Career Services",
            "maxAttendees": max,
            "currentAttendees": current,
            "status": "active"
        }))
        .unwrap()
    }

    #[test]
    fn test_is_full() {
        assert!(!event(0, 1_000).is_full());
        assert!(!event(2, 1).is_full());
        assert!(event(2, 2).is_full());
    }
}
