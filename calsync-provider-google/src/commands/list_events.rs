use anyhow::Result;
use calsync_core::event::Event;
use calsync_core::remote::protocol::ListEvents;
use calsync_core::remote::store::{EventQuery, RemoteError};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::CalendarApi;
use crate::google_event::FromGoogle;

pub async fn handle(cmd: ListEvents) -> Result<Vec<Event>> {
    let api = super::connect(&cmd.remote_config).await?;
    Ok(list(&api, &cmd.query).await?)
}

/// All pages of `events.list` for a query.
pub async fn list(api: &CalendarApi, query: &EventQuery) -> Result<Vec<Event>, RemoteError> {
    let items = api.list(query).await?;
    debug!("Listed {} events from {}", items.len(), api.calendar_id());
    Ok(convert_all(items))
}

/// Resources that cannot be read are left out, so one odd event in a shared
/// calendar does not hide all the others.
fn convert_all(items: Vec<Value>) -> Vec<Event> {
    items
        .into_iter()
        .filter_map(|item| match Event::from_google(item) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!("Skipping unreadable event: {e:#}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unreadable_events_are_skipped() {
        let events = convert_all(vec![
            json!({"id": "broken", "status": "confirmed"}),
            json!({
                "id": "evt-1",
                "iCalUID": "a@roster.example.com",
                "summary": "Early shift",
                "start": {"dateTime": "2025-03-20T09:00:00Z"},
                "end": {"dateTime": "2025-03-20T17:00:00Z"}
            }),
            json!({
                "id": "abc_20250320T090000Z",
                "status": "cancelled",
                "recurringEventId": "abc",
                "originalStartTime": {"dateTime": "2025-03-20T09:00:00Z"}
            }),
        ]);

        let ids: Vec<_> = events.iter().map(|e| e.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("evt-1"), Some("abc_20250320T090000Z")]);
    }
}
