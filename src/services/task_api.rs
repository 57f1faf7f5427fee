use reqwest::{header, Client, Method, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::TaskApiConfig;
use crate::constants::task_api::LOG_BODY_LIMIT;
use crate::error::{ApiError, Result};

/// Classified result of one call to the task API.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCallOutcome {
    /// Any 2xx response. Bodies that are empty or not JSON parse as `Null`.
    Success { status: StatusCode, body: Value },
    /// Any other status, with the raw response text.
    Failure { status: StatusCode, text: String },
}

impl ApiCallOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ApiCallOutcome::Success { .. })
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiCallOutcome::Success { status, .. } | ApiCallOutcome::Failure { status, .. } => {
                *status
            }
        }
    }
}

/// Client for the remote task-management API.
#[derive(Clone)]
pub struct TaskApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl TaskApiClient {
    pub fn new(config: &TaskApiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Issue one call against `{base_url}{path}`.
    ///
    /// Non-2xx responses are returned as [`ApiCallOutcome::Failure`]; only a
    /// missing token or a transport failure is an error.
    pub async fn call(&self, method: Method, path: &str, body: Option<&Value>) -> Result<ApiCallOutcome> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| ApiError::missing_config("TASK_API_TOKEN"))?;

        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "Calling task API");

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(header::AUTHORIZATION, token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            ApiError::ExternalService(format!("{} {} failed: {}", method, path, e))
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            ApiError::ExternalService(format!("Failed to read response from {}: {}", path, e))
        })?;

        if status.is_success() {
            let body = serde_json::from_str(&text).unwrap_or(Value::Null);
            Ok(ApiCallOutcome::Success { status, body })
        } else {
            warn!(
                method = %method,
                path = %path,
                status = %status,
                body = %truncate(&text, LOG_BODY_LIMIT),
                "Task API returned an error status"
            );
            Ok(ApiCallOutcome::Failure { status, text })
        }
    }

    /// Read one task's detail record.
    pub async fn get_task(&self, task_id: &str) -> Result<ApiCallOutcome> {
        self.call(Method::GET, &format!("/task/{}", task_id), None).await
    }

    /// Add a task to an additional list.
    pub async fn add_task_to_list(&self, list_id: &str, task_id: &str) -> Result<ApiCallOutcome> {
        self.call(Method::POST, &format!("/list/{}/task/{}", list_id, task_id), None)
            .await
    }

    /// Set a custom field value on a task.
    pub async fn set_custom_field(&self, task_id: &str, field_id: &str, value: Value) -> Result<ApiCallOutcome> {
        let body = json!({ "value": value });
        self.call(
            Method::POST,
            &format!("/task/{}/field/{}", task_id, field_id),
            Some(&body),
        )
        .await
    }
}

/// Cut `text` to at most `limit` characters for logging.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
