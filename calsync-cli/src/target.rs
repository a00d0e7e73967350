//! Resolution of command arguments into what a sync run needs.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use calsync_core::date_range::parse_tz;
use calsync_core::{CalendarProfile, DateRange, Event, SyncConfig};
use chrono_tz::Tz;
use tracing::warn;

use crate::SyncArgs;

/// Calendar, window and target events of one run.
pub struct SyncTarget<'a> {
    pub name: &'a str,
    pub profile: &'a CalendarProfile,
    pub range: DateRange,
    pub events: Vec<Event>,
}

impl<'a> SyncTarget<'a> {
    pub fn resolve(config: &'a SyncConfig, args: &SyncArgs) -> Result<Self> {
        let (name, profile) = config.calendar(args.calendar.as_deref()).map_err(|e| {
            let available: Vec<_> = config.calendars.keys().map(String::as_str).collect();
            anyhow::anyhow!("{e}. Available: {}", available.join(", "))
        })?;

        let tz = resolve_tz(config)?;
        let range = DateRange::from_args(args.from.as_deref(), args.to.as_deref(), tz)?;
        let events = read_events(&args.events)?;

        Ok(SyncTarget {
            name,
            profile,
            range,
            events,
        })
    }
}

/// Configured zone, else the system zone, else UTC.
fn resolve_tz(config: &SyncConfig) -> Result<Tz> {
    if let Some(tz) = config.tz()? {
        return Ok(tz);
    }

    match iana_time_zone::get_timezone() {
        Ok(name) => Ok(parse_tz(&name)?),
        Err(e) => {
            warn!("Could not determine the system time zone ({e}), using UTC");
            Ok(chrono_tz::UTC)
        }
    }
}

/// Target events as a JSON array, from a file or "-" for stdin.
pub fn read_events(source: &str) -> Result<Vec<Event>> {
    let json = if source == "-" {
        let mut json = String::new();
        std::io::stdin()
            .read_to_string(&mut json)
            .context("Failed to read events from stdin")?;
        json
    } else {
        let path = Path::new(source);
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read events from {}", path.display()))?
    };

    serde_json::from_str(&json).with_context(|| format!("Failed to parse events from {source}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EVENTS: &str = r#"[
        {
            "uid": "shift-1@roster.example.com",
            "summary": "Early shift",
            "start": {"DateTime": "2025-03-20T09:00:00Z"},
            "end": {"DateTime": "2025-03-20T17:00:00Z"}
        }
    ]"#;

    fn config() -> SyncConfig {
        toml::from_str(
            r#"
timezone = "Europe/Berlin"

[calendars.roster]
domain = "roster.example.com"
remote = { provider = "google", google_account = "me@example.com" }
"#,
        )
        .unwrap()
    }

    fn args(events: &str) -> SyncArgs {
        SyncArgs {
            events: events.to_string(),
            calendar: None,
            from: Some("2025-03-01".into()),
            to: Some("2025-03-31".into()),
        }
    }

    #[test]
    fn test_read_events_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EVENTS.as_bytes()).unwrap();

        let events = read_events(file.path().to_str().unwrap()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Early shift");
    }

    #[test]
    fn test_resolve_target() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EVENTS.as_bytes()).unwrap();
        let config = config();

        let target = SyncTarget::resolve(&config, &args(file.path().to_str().unwrap())).unwrap();
        assert_eq!(target.name, "roster");
        assert_eq!(target.profile.domain, "roster.example.com");
        assert_eq!(target.range.tz, chrono_tz::Europe::Berlin);
        assert_eq!(target.events.len(), 1);
    }

    #[test]
    fn test_unknown_calendar_lists_available() {
        let config = config();
        let mut args = args("unused.json");
        args.calendar = Some("oncall".into());

        let err = SyncTarget::resolve(&config, &args).err().unwrap();
        assert!(err.to_string().contains("Available: roster"));
    }

    #[test]
    fn test_missing_events_file() {
        assert!(read_events("/nonexistent/events.json").is_err());
    }
}
