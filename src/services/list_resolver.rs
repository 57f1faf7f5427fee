use serde_json::Value;
use tracing::{info, warn};

use crate::models::webhook::{first_present, LIST_ID_CANDIDATES};
use crate::services::task_api::{ApiCallOutcome, TaskApiClient};

/// Paths to the list id inside a task detail record.
const TASK_LIST_CANDIDATES: &[&[&str]] = &[&["list", "id"]];

/// Look up which list a task belongs to.
///
/// Fails open: every error is logged and reported as `None`, which callers
/// treat exactly like a payload without a list id.
pub async fn resolve_list_id(api: &TaskApiClient, task_id: &str) -> Option<String> {
    match api.get_task(task_id).await {
        Ok(ApiCallOutcome::Success { body, .. }) => {
            let list_id = list_id_from_task(&body);
            match &list_id {
                Some(list_id) => info!(task_id = %task_id, list_id = %list_id, "Resolved list from task"),
                None => warn!(task_id = %task_id, "Task record has no list id"),
            }
            list_id
        }
        Ok(ApiCallOutcome::Failure { status, .. }) => {
            warn!(task_id = %task_id, status = %status, "Task lookup failed, list unresolved");
            None
        }
        Err(e) => {
            warn!(task_id = %task_id, error = %e, "Task lookup errored, list unresolved");
            None
        }
    }
}

/// Extract the list id from a task detail record.
pub fn list_id_from_task(task: &Value) -> Option<String> {
    first_present(task, TASK_LIST_CANDIDATES).or_else(|| first_present(task, LIST_ID_CANDIDATES))
}
