// Event Schemas - event creation

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::IgnoredAny;
use serde::Deserialize;

use crate::entities::{EntEvent, EventStatus};
use crate::error::AppResult;
use crate::schemas::validation::{non_blank, FieldValidator, Validator, URL_PATTERN};

/// POST /events
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateEventRequest {
    pub title: Option<String>,
    /// RFC 3339 timestamp, `YYYY-MM-DDTHH:MM` or a plain `YYYY-MM-DD` date (UTC)
    pub event_date: Option<String>,
    pub organizer: Option<String>,
    pub event_link: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub time: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub max_attendees: Option<i64>,
    pub status: Option<EventStatus>,
    /// Accepted and ignored; new events start with no attendees
    pub current_attendees: Option<IgnoredAny>,
}

pub fn parse_event_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

impl CreateEventRequest {
    pub fn into_event(self) -> AppResult<EntEvent> {
        let mut v = Validator::new();
        v.required_str("title", self.title.as_deref(), &[FieldValidator::MaxLength(200)])?;
        v.required_str("organizer", self.organizer.as_deref(), &[FieldValidator::MaxLength(100)])?;
        v.optional_str(
            "eventLink",
            self.event_link.as_deref(),
            &[FieldValidator::MaxLength(500), FieldValidator::Pattern(URL_PATTERN)],
        )?;
        v.optional_str("description", self.description.as_deref(), &[FieldValidator::MaxLength(1000)])?;
        v.optional_str("location", self.location.as_deref(), &[FieldValidator::MaxLength(200)])?;
        v.optional_str("time", self.time.as_deref(), &[FieldValidator::MaxLength(10)])?;
        v.optional_str("category", self.category.as_deref(), &[FieldValidator::MaxLength(50)])?;
        if let Some(max) = self.max_attendees {
            v.check_number("maxAttendees", max as f64, &[FieldValidator::Range(0.0, f64::MAX)]);
        }

        let event_date = match self.event_date.as_deref().map(str::trim) {
            None | Some("") => {
                v.push("eventDate is required");
                None
            }
            Some(raw) => {
                let parsed = parse_event_date(raw);
                if parsed.is_none() {
                    v.push("eventDate format is invalid");
                }
                parsed
            }
        };
        v.finish("Invalid event")?;

        Ok(EntEvent {
            title: non_blank(self.title).unwrap_or_default(),
            event_date: event_date.unwrap_or_else(Utc::now),
            organizer: non_blank(self.organizer).unwrap_or_default(),
            event_link: non_blank(self.event_link),
            description: non_blank(self.description),
            location: non_blank(self.location),
            time: non_blank(self.time),
            category: non_blank(self.category),
            image_url: non_blank(self.image_url),
            max_attendees: self.max_attendees.unwrap_or(0),
            current_attendees: 0,
            status: self.status.unwrap_or(EventStatus::Active),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;

    #[test]
    fn test_parse_event_date_formats() {
        let date = parse_event_date("2025-02-15").unwrap();
        assert_eq!(date.to_rfc3339(), "2025-02-15T00:00:00+00:00");

        let local = parse_event_date("2025-02-15T14:00").unwrap();
        assert_eq!(local.to_rfc3339(), "2025-02-15T14:00:00+00:00");

        let offset = parse_event_date("2025-02-15T14:00:00+02:00").unwrap();
        assert_eq!(offset.to_rfc3339(), "2025-02-15T12:00:00+00:00");

        assert!(parse_event_date("next tuesday").is_none());
    }

    #[test]
    fn test_create_forces_zero_attendees() {
        let request: CreateEventRequest = serde_json::from_value(json!({
            "title": "React.js Workshop",
            "eventDate": "2025-02-15",
            "organizer": "Tech Club",
            "maxAttendees": 60,
            "currentAttendees": 45
        }))
        .unwrap();

        let event = request.into_event().unwrap();
        assert_eq!(event.current_attendees, 0);
        assert_eq!(event.max_attendees, 60);
        assert_eq!(event.status, EventStatus::Active);
    }

    #[test]
    fn test_create_requires_title_date_organizer() {
        let request: CreateEventRequest =
            serde_json::from_value(json!({"eventDate": "soon", "maxAttendees": -1})).unwrap();
        match request.into_event() {
            Err(AppError::Validation { details, .. }) => {
                assert!(details.contains(&"title is required".to_string()));
                assert!(details.contains(&"organizer is required".to_string()));
                assert!(details.contains(&"eventDate format is invalid".to_string()));
                assert!(details.contains(&"maxAttendees must be at least 0".to_string()));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
