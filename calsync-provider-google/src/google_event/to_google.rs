use anyhow::Result;
use calsync_core::event::{Event, EventStatus, EventTime};

use super::{ExtendedProperties, GoogleEvent, GoogleTime};

pub trait ToGoogle {
    /// Request body for insert and update. The event id travels in the URL.
    fn to_google(&self) -> Result<serde_json::Value>;
}

impl ToGoogle for Event {
    fn to_google(&self) -> Result<serde_json::Value> {
        let status = match self.status {
            EventStatus::Confirmed => "confirmed",
            EventStatus::Tentative => "tentative",
            EventStatus::Cancelled => "cancelled",
        };

        let extended_properties = if self.private_properties.is_empty() {
            None
        } else {
            Some(ExtendedProperties {
                private: self.private_properties.clone(),
            })
        };

        let event = GoogleEvent {
            i_cal_uid: self.uid.clone().unwrap_or_default(),
            summary: self.summary.clone(),
            description: self.description.clone().unwrap_or_default(),
            location: self.location.clone().unwrap_or_default(),
            status: status.to_string(),
            start: Some(event_time_to_google(&self.start)),
            end: Some(event_time_to_google(&self.end)),
            extended_properties,
            ..Default::default()
        };

        Ok(serde_json::to_value(event)?)
    }
}

fn event_time_to_google(time: &EventTime) -> GoogleTime {
    match time {
        EventTime::Date(d) => GoogleTime {
            date: Some(*d),
            date_time: None,
        },
        EventTime::DateTime(dt) => GoogleTime {
            date: None,
            date_time: Some(*dt),
        },
    }
}
