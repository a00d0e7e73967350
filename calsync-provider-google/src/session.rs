//! Creates a valid Google session (access token) that we can use to call the gcal API.
//! Token refresh goes through the google-calendar client.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use google_calendar::{AccessToken, Client};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::app_config::{AppConfig, base_dir};

pub struct Session {
    path: PathBuf,
    data: SessionData,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionData {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl SessionData {
    /// Tokens from a refresh. Google usually omits the refresh token then,
    /// so the previous one is kept.
    fn refreshed(tokens: &AccessToken, previous_refresh_token: &str) -> Self {
        let refresh_token = if tokens.refresh_token.is_empty() {
            previous_refresh_token.to_string()
        } else {
            tokens.refresh_token.clone()
        };

        SessionData {
            access_token: tokens.access_token.clone(),
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
        }
    }
}

impl Session {
    fn path_for_account_email(account_email: &str) -> Result<PathBuf> {
        let email_slug = account_email.replace(['/', '\\', ':'], "_");

        Ok(base_dir()?
            .join("session")
            .join(format!("{}.toml", email_slug)))
    }

    pub fn access_token(&self) -> &str {
        &self.data.access_token
    }

    fn client(&self) -> Result<Client> {
        let app_config = AppConfig::load()?;

        Ok(Client::new(
            app_config.client_id,
            app_config.client_secret,
            String::new(),
            self.data.access_token.clone(),
            self.data.refresh_token.clone(),
        ))
    }

    /// Load a session and refresh it if expired.
    pub async fn load_valid(account_email: &str) -> Result<Self> {
        let path = Self::path_for_account_email(account_email)?;
        if !path.exists() {
            anyhow::bail!("Google OAuth session for {} not found!", account_email);
        }

        let mut session = Self::load(&path)?;
        if session.is_expired() {
            debug!("Access token for {account_email} expired, refreshing");
            session.refresh_local().await?;
        }
        Ok(session)
    }

    fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).with_context(|| {
            format!(
                "Failed to read Google OAuth session from {}",
                path.display()
            )
        })?;

        let data: SessionData = toml::from_str(&contents).with_context(|| {
            format!(
                "Failed to parse Google OAuth session from {}",
                path.display()
            )
        })?;

        Ok(Session {
            path: path.to_path_buf(),
            data,
        })
    }

    fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(&self.data).context("Failed to serialize session")?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write session to {}", self.path.display()))?;

        // Owner-only, the file holds OAuth tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", self.path.display()))?;
        }

        Ok(())
    }

    fn is_expired(&self) -> bool {
        Utc::now() >= self.data.expires_at
    }

    async fn refresh_local(&mut self) -> Result<()> {
        let client = self.client()?;

        let tokens = client
            .refresh_access_token()
            .await
            .context("Failed to refresh token")?;

        self.data = SessionData::refreshed(&tokens, &self.data.refresh_token);
        self.save()?;

        Ok(())
    }
}
