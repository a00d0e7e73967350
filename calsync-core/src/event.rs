//! Provider-neutral event types.
//!
//! Both the target events handed to calsync and the events listed from a
//! remote calendar are represented by [`Event`]. Providers convert their API
//! payloads into these types and back.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Private property holding the summary as calsync last generated it.
pub const GENERATED_SUMMARY_KEY: &str = "summary";

/// A calendar event (provider-neutral)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Stable identifier (iCalendar UID), `<opaque>@<domain>`.
    /// Remote events created outside calsync may not carry one.
    #[serde(default)]
    pub uid: Option<String>,
    /// Identifier assigned by the remote store on creation.
    #[serde(default)]
    pub id: Option<String>,
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(default)]
    pub status: EventStatus,
    /// Private extended properties, only visible to the writing application.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub private_properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    #[default]
    Confirmed,
    Tentative,
    Cancelled,
}

impl Event {
    pub fn new(
        uid: impl Into<String>,
        summary: impl Into<String>,
        start: EventTime,
        end: EventTime,
    ) -> Self {
        Event {
            uid: Some(uid.into()),
            id: None,
            summary: summary.into(),
            description: None,
            location: None,
            start,
            end,
            status: EventStatus::Confirmed,
            private_properties: BTreeMap::new(),
        }
    }

    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    /// A cancelled event is a tombstone: deleted, but still listed by the remote.
    pub fn is_cancelled(&self) -> bool {
        self.status == EventStatus::Cancelled
    }

    /// Whether the uid ends with `@<domain>`.
    pub fn belongs_to_domain(&self, domain: &str) -> bool {
        self.uid
            .as_deref()
            .and_then(|uid| uid.strip_suffix(domain))
            .is_some_and(|rest| rest.ends_with('@'))
    }

    /// The summary as it was generated the last time calsync wrote this event.
    pub fn generated_summary(&self) -> Option<&str> {
        self.private_properties
            .get(GENERATED_SUMMARY_KEY)
            .map(String::as_str)
    }

    /// Remember the current summary as the generated one, so the next run can
    /// tell whether someone edited it in the meantime.
    pub fn record_generated_summary(&mut self) {
        self.private_properties
            .insert(GENERATED_SUMMARY_KEY.to_string(), self.summary.clone());
    }

    /// True when the summary no longer matches what calsync generated.
    /// Events without a recorded summary were never synced and report false.
    pub fn has_manual_summary_edit(&self) -> bool {
        self.generated_summary()
            .is_some_and(|generated| generated != self.summary)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({})", self.summary, self.start)?;
        if let Some(uid) = &self.uid {
            write!(f, " [{uid}]")?;
        }
        Ok(())
    }
}

impl EventTime {
    /// Instant this time starts at; all-day dates start at UTC midnight.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            EventTime::DateTime(dt) => Some(*dt),
            EventTime::Date(d) => d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M UTC")),
            EventTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}
