use anyhow::{Context, Result, bail};
use calsync_core::event::{Event, EventStatus, EventTime};

use super::{GoogleEvent, GoogleTime};

pub trait FromGoogle {
    fn from_google(event: serde_json::Value) -> Result<Self>
    where
        Self: Sized;
}

impl FromGoogle for Event {
    fn from_google(event: serde_json::Value) -> Result<Self> {
        let event: GoogleEvent =
            serde_json::from_value(event).context("Malformed event resource")?;

        // Cancelled instances of recurring events only carry originalStartTime
        let start = match event
            .start
            .as_ref()
            .and_then(event_time_from_google)
            .or_else(|| event.original_start_time.as_ref().and_then(event_time_from_google))
        {
            Some(start) => start,
            None => bail!("Event {} has no start time", event.id),
        };

        let end = event
            .end
            .as_ref()
            .and_then(event_time_from_google)
            .unwrap_or_else(|| start.clone());

        let status = match event.status.as_str() {
            "tentative" => EventStatus::Tentative,
            "cancelled" => EventStatus::Cancelled,
            _ => EventStatus::Confirmed,
        };

        Ok(Event {
            uid: non_empty(event.i_cal_uid),
            id: non_empty(event.id),
            summary: event.summary,
            description: non_empty(event.description),
            location: non_empty(event.location),
            start,
            end,
            status,
            private_properties: event
                .extended_properties
                .map(|props| props.private)
                .unwrap_or_default(),
        })
    }
}

fn event_time_from_google(time: &GoogleTime) -> Option<EventTime> {
    if let Some(dt) = time.date_time {
        Some(EventTime::DateTime(dt))
    } else {
        time.date.map(EventTime::Date)
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
