pub mod protocol;
pub mod provider;
pub mod store;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{CalSyncError, CalSyncResult};
use crate::event::Event;
use crate::remote::protocol::{ExecuteBatch, ListEvents};
use crate::remote::provider::Provider;
use crate::remote::store::{Batch, BatchResults, EventQuery, RemoteStore};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

/// A remote calendar reached through a provider binary.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Remote {
    pub provider: Provider,
    #[serde(flatten)]
    pub config: RemoteConfig,
}

impl Remote {
    fn remote_config(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from(&self.config)
    }

    /// Returns the account identifier for this remote, if present.
    ///
    /// Looks for a `{provider}_account` field in the config (e.g., `google_account`).
    pub fn account_identifier(&self) -> Option<&str> {
        let key = format!("{}_account", self.provider.name());
        self.config.0.get(&key).and_then(|v| v.as_str())
    }
}

#[async_trait]
impl RemoteStore for Remote {
    async fn list_events(&self, query: &EventQuery) -> CalSyncResult<Vec<Event>> {
        self.provider
            .call(ListEvents {
                remote_config: self.remote_config(),
                query: query.clone(),
            })
            .await
    }

    async fn execute(&self, batch: Batch) -> CalSyncResult<BatchResults> {
        if batch.is_empty() {
            return Ok(BatchResults::new());
        }

        let expected = batch.len();
        let results = self
            .provider
            .call(ExecuteBatch {
                remote_config: self.remote_config(),
                operations: batch.into_operations(),
            })
            .await?;

        if results.len() > expected {
            return Err(CalSyncError::Provider(format!(
                "Provider answered {} results for {} operations",
                results.len(),
                expected
            )));
        }

        Ok(results.into_iter().map(|r| (r.id, r.result)).collect())
    }
}
