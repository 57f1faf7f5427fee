//! Inbound webhook payload and the per-request outcome records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::webhook::{TASK_CREATED, UNKNOWN_EVENT};
use crate::error::{ApiError, Result};

/// JSON paths tried, in order, for the task id.
pub const TASK_ID_CANDIDATES: &[&[&str]] = &[&["task_id"], &["task", "id"], &["payload", "task_id"]];

/// JSON paths tried, in order, for the source list id.
pub const LIST_ID_CANDIDATES: &[&[&str]] = &[
    &["list_id"],
    &["task", "list", "id"],
    &["payload", "list_id"],
];

/// Fields extracted from a verified webhook body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub event: String,
    pub task_id: Option<String>,
    pub list_id: Option<String>,
}

impl WebhookEvent {
    /// Parse the raw body and extract the event fields.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ApiError::MalformedPayload(e.to_string()))?;
        Ok(Self::from_value(&value))
    }

    pub fn from_value(value: &Value) -> Self {
        let event = value
            .get("event")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_EVENT)
            .to_string();

        Self {
            event,
            task_id: first_present(value, TASK_ID_CANDIDATES),
            list_id: first_present(value, LIST_ID_CANDIDATES),
        }
    }

    pub fn is_task_created(&self) -> bool {
        self.event == TASK_CREATED
    }
}

/// Return the first candidate path that resolves to an identifier.
///
/// Strings must be non-empty; numbers are rendered as decimal strings so ids
/// always compare as strings. Any other JSON type is skipped.
pub fn first_present(value: &Value, candidates: &[&[&str]]) -> Option<String> {
    candidates
        .iter()
        .find_map(|path| lookup_path(value, path).and_then(identifier))
}

fn lookup_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Outcome of each follow-up action for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub attached: bool,
    pub date_stamped: bool,
    pub entity_set: bool,
    pub entity_name: Option<String>,
    /// Present only when hours fields are configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_stamped: Option<bool>,
}

/// Body returned for every request the receiver accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,
    #[serde(flatten)]
    pub result: Option<ActionResult>,
}

impl WebhookResponse {
    /// Event acknowledged without any action.
    pub fn acknowledged() -> Self {
        Self {
            ok: true,
            skipped: None,
            result: None,
        }
    }

    /// Task filtered out by the list filter.
    pub fn skipped() -> Self {
        Self {
            ok: true,
            skipped: Some(true),
            result: None,
        }
    }

    pub fn processed(result: ActionResult) -> Self {
        Self {
            ok: true,
            skipped: None,
            result: Some(result),
        }
    }
}
