use std::path::Path;

use anyhow::Result;
use calsync_core::SyncConfig;
use owo_colors::OwoColorize;

use crate::render::render_calendar;

pub fn run(config: &SyncConfig, config_path: &Path) -> Result<()> {
    if config.calendars.is_empty() {
        anyhow::bail!(
            "No calendars configured.\n\n\
            Add one to {}:\n\n  \
            [calendars.roster]\n  \
            domain = \"roster.example.com\"\n  \
            remote = {{ provider = \"google\", google_account = \"me@example.com\" }}",
            config_path.display()
        );
    }

    for (name, profile) in &config.calendars {
        let default = if config.default_calendar.as_deref() == Some(name.as_str()) {
            " (default)".green().to_string()
        } else {
            String::new()
        };

        println!("{}{}", render_calendar(name, profile), default);

        let account = profile
            .remote
            .account_identifier()
            .map(|account| format!(" {account}"))
            .unwrap_or_default();
        println!("   {}{}", profile.remote.provider.name().dimmed(), account.dimmed());
    }

    Ok(())
}
