//! Calendar v3 events endpoints over reqwest.

use calsync_core::remote::store::{EventQuery, RemoteError};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{api_error, remote_error, transport_error};

const BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Largest page `events.list` serves.
const PAGE_SIZE: &str = "2500";

pub struct CalendarApi {
    http: reqwest::Client,
    access_token: String,
    calendar_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<Value>,
    next_page_token: Option<String>,
}

impl CalendarApi {
    pub fn new(access_token: impl Into<String>, calendar_id: impl Into<String>) -> Self {
        CalendarApi {
            http: reqwest::Client::new(),
            access_token: access_token.into(),
            calendar_id: calendar_id.into(),
        }
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    fn events_url(&self, event_id: Option<&str>) -> Result<Url, RemoteError> {
        let mut url = Url::parse(BASE_URL).map_err(remote_error)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| remote_error("Calendar API URL cannot take a path"))?;
            segments.extend(["calendars", self.calendar_id.as_str(), "events"]);
            if let Some(id) = event_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url).bearer_auth(&self.access_token)
    }

    /// Raw event resources matching `query`, across all pages.
    pub async fn list(&self, query: &EventQuery) -> Result<Vec<Value>, RemoteError> {
        let url = self.events_url(None)?;

        let mut params = vec![
            ("maxResults", PAGE_SIZE.to_string()),
            ("showDeleted", query.show_deleted.to_string()),
        ];
        if let Some(time_min) = query.time_min {
            params.push(("timeMin", time_min.to_rfc3339()));
        }
        if let Some(time_max) = query.time_max {
            params.push(("timeMax", time_max.to_rfc3339()));
        }
        if let Some(uid) = &query.uid {
            params.push(("iCalUID", uid.clone()));
        }

        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self.request(Method::GET, url.clone()).query(&params);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let page: EventsPage = send(request).await?.json().await.map_err(transport_error)?;
            items.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(items)
    }

    pub async fn insert(&self, body: &Value) -> Result<Value, RemoteError> {
        let url = self.events_url(None)?;
        let request = self.request(Method::POST, url).json(body);
        send(request).await?.json().await.map_err(transport_error)
    }

    pub async fn update(&self, id: &str, body: &Value) -> Result<Value, RemoteError> {
        let url = self.events_url(Some(id))?;
        let request = self.request(Method::PUT, url).json(body);
        send(request).await?.json().await.map_err(transport_error)
    }

    pub async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        let url = self.events_url(Some(id))?;
        send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}

async fn send(request: RequestBuilder) -> Result<Response, RemoteError> {
    let response = request.send().await.map_err(transport_error)?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(api_error(status.as_u16(), &body))
}
