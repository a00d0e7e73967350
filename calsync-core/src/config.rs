//! calsync configuration at ~/.config/calsync/config.toml

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::date_range::parse_tz;
use crate::error::{CalSyncError, CalSyncResult};
use crate::remote::Remote;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct SyncConfig {
    /// IANA name; the system zone is used when unset.
    pub timezone: Option<String>,

    pub default_calendar: Option<String>,

    #[serde(default)]
    pub calendars: BTreeMap<String, CalendarProfile>,
}

/// A remote calendar calsync writes to.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CalendarProfile {
    /// uid domain of the events calsync owns in this calendar.
    pub domain: String,
    pub remote: Remote,
}

impl SyncConfig {
    pub fn config_path() -> CalSyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalSyncError::Config("Could not determine config directory".into()))?
            .join("calsync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`. A missing file is an empty configuration.
    pub fn load(path: &Path) -> CalSyncResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: SyncConfig = toml::from_str(&content)
            .map_err(|e| CalSyncError::Config(format!("{}: {e}", path.display())))?;

        for (name, profile) in &config.calendars {
            if profile.domain.is_empty() || profile.domain.contains('@') {
                return Err(CalSyncError::Config(format!(
                    "Calendar '{name}' needs a domain without '@', got '{}'",
                    profile.domain
                )));
            }
        }

        Ok(config)
    }

    /// Profile called `name`, or the default calendar when `name` is None.
    /// With a single configured calendar that one is the default.
    pub fn calendar(&self, name: Option<&str>) -> CalSyncResult<(&str, &CalendarProfile)> {
        let name = match name.or(self.default_calendar.as_deref()) {
            Some(name) => name,
            None if self.calendars.len() == 1 => {
                return self
                    .calendars
                    .iter()
                    .next()
                    .map(|(name, profile)| (name.as_str(), profile))
                    .ok_or_else(|| CalSyncError::CalendarNotFound("default".into()));
            }
            None => {
                return Err(CalSyncError::Config(
                    "No calendar given and no default_calendar configured".into(),
                ));
            }
        };

        self.calendars
            .get_key_value(name)
            .map(|(name, profile)| (name.as_str(), profile))
            .ok_or_else(|| CalSyncError::CalendarNotFound(name.to_string()))
    }

    /// Configured time zone, if any.
    pub fn tz(&self) -> CalSyncResult<Option<Tz>> {
        self.timezone.as_deref().map(parse_tz).transpose()
    }
}
