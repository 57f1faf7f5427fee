//! Decides which follow-up actions a webhook triggers.
//!
//! Everything here is a pure function of one request's extracted fields and
//! the static configuration; no remote calls are made.

use tracing::error;

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::WebhookEvent;

/// What to do with an actionable event once its list is known.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The list filter excluded this task; nothing is called.
    Skip,
    Run(ActionPlan),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionPlan {
    pub task_id: String,
    pub list_id: Option<String>,
    /// Tracker list to attach the task to
    pub attach_to: Option<String>,
    /// Date field to stamp with the current time
    pub date_field: Option<String>,
    pub entity: Option<EntityAssignment>,
    /// Fields stamped with `hours_value` once the attach succeeded
    pub hours_fields: Vec<String>,
    pub hours_value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityAssignment {
    pub name: String,
    /// `None` when the entity has no configured option id
    pub target: Option<EntityTarget>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityTarget {
    pub field_id: String,
    pub option_id: String,
}

/// The task id of an event that should trigger actions, if any.
///
/// Only `taskCreated` events carrying a task id qualify.
pub fn actionable_task(event: &WebhookEvent) -> Option<&str> {
    if event.is_task_created() {
        event.task_id.as_deref()
    } else {
        None
    }
}

/// Build the action plan for a created task whose list has been resolved.
///
/// Required identifiers for the chosen actions are checked here, before any
/// action is attempted.
pub fn plan(task_id: &str, list_id: Option<&str>, config: &Config) -> Result<Dispatch> {
    if let Some(only) = config.only_list_id.as_deref() {
        if list_id != Some(only) {
            return Ok(Dispatch::Skip);
        }
    }

    let rules = &config.rules;
    let fields = &config.fields;

    let attach_to = match list_id {
        Some(list) if rules.should_attach(list) => Some(
            fields
                .tracker_list_id
                .clone()
                .ok_or_else(|| ApiError::missing_config("TRACKER_LIST_ID"))?,
        ),
        _ => None,
    };

    let entity = match list_id.and_then(|list| rules.entity_for(list)) {
        Some(name) => {
            let target = match rules.option_for(name) {
                Some(option_id) => Some(EntityTarget {
                    field_id: fields
                        .entity_field_id
                        .clone()
                        .ok_or_else(|| ApiError::missing_config("ENTITY_FIELD_ID"))?,
                    option_id: option_id.to_string(),
                }),
                None => {
                    error!(
                        task_id = %task_id,
                        entity = %name,
                        "No dropdown option configured for entity; add it to ENTITY_OPTION_MAP"
                    );
                    None
                }
            };
            Some(EntityAssignment {
                name: name.to_string(),
                target,
            })
        }
        None => None,
    };

    Ok(Dispatch::Run(ActionPlan {
        task_id: task_id.to_string(),
        list_id: list_id.map(str::to_string),
        attach_to,
        date_field: fields.date_field_id.clone(),
        entity,
        hours_fields: fields.hours_field_ids.clone(),
        hours_value: fields.default_hours_value.clone(),
    }))
}
