//! Defines the JSON protocol used for communication between calsync
//! and provider binaries over stdin/stdout.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::event::Event;
use crate::remote::store::{EventQuery, OperationResult, QueuedOperation};

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    ListEvents,
    ExecuteBatch,
}

/// Request sent from calsync to provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from provider to calsync.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> serde_json::Result<String> {
        serde_json::to_string(&Response::Success { data })
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        // A lone string field always serializes
        serde_json::to_string(&Response::<()>::Error {
            error: msg.to_string(),
        })
        .unwrap_or_else(|_| String::from(r#"{"status":"error","error":"unknown"}"#))
    }
}

/// List events matching a query.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    /// Provider-specific config (e.g., google_account, google_calendar_id)
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub query: EventQuery,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<Event>;
    fn command() -> Command {
        Command::ListEvents
    }
}

/// Execute one round of operations. The provider answers with exactly one
/// result per operation, in any order.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExecuteBatch {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub operations: Vec<QueuedOperation>,
}

impl ProviderCommand for ExecuteBatch {
    type Response = Vec<OperationResult>;
    fn command() -> Command {
        Command::ExecuteBatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::store::{Operation, Reply};

    #[test]
    fn test_request_params_flatten_remote_config() {
        let mut remote_config = serde_json::Map::new();
        remote_config.insert("google_account".into(), "me@example.com".into());

        let params = serde_json::to_value(ListEvents {
            remote_config,
            query: EventQuery::by_uid("a@d").show_deleted(true),
        })
        .unwrap();

        assert_eq!(params["google_account"], "me@example.com");
        assert_eq!(params["query"]["uid"], "a@d");
        assert_eq!(params["query"]["show_deleted"], true);

        let request = Request {
            command: ListEvents::command(),
            params,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.starts_with(r#"{"command":"list_events""#));
    }

    #[test]
    fn test_response_envelopes() {
        let ok = Response::success(vec![OperationResult {
            id: 0,
            result: Ok(Reply::Deleted),
        }])
        .unwrap();
        let parsed: Response<Vec<OperationResult>> = serde_json::from_str(&ok).unwrap();
        assert!(matches!(parsed, Response::Success { data } if data.len() == 1));

        let err = Response::error("no session for me@example.com");
        let parsed: Response<Vec<OperationResult>> = serde_json::from_str(&err).unwrap();
        assert!(matches!(parsed, Response::Error { error } if error.contains("no session")));
    }

    #[test]
    fn test_execute_batch_roundtrip() {
        let batch = ExecuteBatch {
            remote_config: serde_json::Map::new(),
            operations: vec![QueuedOperation {
                id: 7,
                operation: Operation::Delete { id: "evt".into() },
            }],
        };
        let json = serde_json::to_string(&batch).unwrap();
        let back: ExecuteBatch = serde_json::from_str(&json).unwrap();
        assert_eq!(back.operations, batch.operations);
    }
}
