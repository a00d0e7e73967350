pub mod execute_batch;
pub mod list_events;

use anyhow::Result;

use crate::api::CalendarApi;
use crate::remote_config::GoogleRemoteConfig;
use crate::session::Session;

/// Calendar API handle for a request's remote config.
async fn connect(remote_config: &serde_json::Map<String, serde_json::Value>) -> Result<CalendarApi> {
    let config = GoogleRemoteConfig::try_from(remote_config)?;
    let session = Session::load_valid(&config.google_account).await?;
    Ok(CalendarApi::new(session.access_token(), config.google_calendar_id))
}
