use reqwest::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::Result;
use crate::models::{ActionResult, WebhookEvent, WebhookResponse};
use crate::services::list_resolver::resolve_list_id;
use crate::services::rule_dispatcher::{self, ActionPlan, Dispatch};
use crate::services::task_api::TaskApiClient;

/// Runs the follow-up actions for verified webhook events.
#[derive(Clone)]
pub struct WebhookProcessor {
    config: Arc<Config>,
    api: TaskApiClient,
}

impl WebhookProcessor {
    pub fn new(config: Arc<Config>, api: TaskApiClient) -> Self {
        Self { config, api }
    }

    /// Process one verified event. `now_ms` is the value stamped into the date field.
    #[instrument(skip(self, event), fields(event = %event.event, task_id = ?event.task_id))]
    pub async fn process(&self, event: WebhookEvent, now_ms: i64) -> Result<WebhookResponse> {
        let Some(task_id) = rule_dispatcher::actionable_task(&event) else {
            info!(list_id = ?event.list_id, "Event acknowledged without action");
            return Ok(WebhookResponse::acknowledged());
        };

        let list_id = match event.list_id.clone() {
            Some(list_id) => Some(list_id),
            None => resolve_list_id(&self.api, task_id).await,
        };

        match rule_dispatcher::plan(task_id, list_id.as_deref(), &self.config)? {
            Dispatch::Skip => {
                info!(
                    list_id = ?list_id,
                    only_list_id = ?self.config.only_list_id,
                    "Task is outside the filtered list, skipping"
                );
                Ok(WebhookResponse::skipped())
            }
            Dispatch::Run(plan) => {
                let result = self.execute(&plan, now_ms).await?;
                info!(
                    list_id = ?plan.list_id,
                    attached = result.attached,
                    date_stamped = result.date_stamped,
                    entity_set = result.entity_set,
                    entity_name = ?result.entity_name,
                    hours_stamped = ?result.hours_stamped,
                    "Webhook processed"
                );
                Ok(WebhookResponse::processed(result))
            }
        }
    }

    /// Issue the planned calls in order. Each action is attempted regardless
    /// of whether earlier ones failed, except hours which follow the attach.
    async fn execute(&self, plan: &ActionPlan, now_ms: i64) -> Result<ActionResult> {
        let task_id = plan.task_id.as_str();
        let mut result = ActionResult::default();

        if let Some(tracker) = plan.attach_to.as_deref() {
            let outcome = self.api.add_task_to_list(tracker, task_id).await?;
            // 409 means the task is already in the tracker list.
            result.attached = outcome.is_ok() || outcome.status() == StatusCode::CONFLICT;
            if !result.attached {
                warn!(task_id = %task_id, status = %outcome.status(), "Attach to tracker list failed");
            }
        }

        if let Some(field_id) = plan.date_field.as_deref() {
            let outcome = self.api.set_custom_field(task_id, field_id, json!(now_ms)).await?;
            result.date_stamped = outcome.is_ok();
            if !result.date_stamped {
                warn!(task_id = %task_id, status = %outcome.status(), "Date stamp failed");
            }
        }

        if let Some(entity) = &plan.entity {
            result.entity_name = Some(entity.name.clone());
            // A missing option id was already reported by the dispatcher.
            if let Some(target) = &entity.target {
                let outcome = self
                    .api
                    .set_custom_field(task_id, &target.field_id, json!(target.option_id))
                    .await?;
                result.entity_set = outcome.is_ok();
                if !result.entity_set {
                    warn!(
                        task_id = %task_id,
                        entity = %entity.name,
                        status = %outcome.status(),
                        "Setting entity field failed"
                    );
                }
            }
        }

        if !plan.hours_fields.is_empty() {
            result.hours_stamped = Some(if result.attached {
                self.stamp_hours(plan).await?
            } else {
                false
            });
        }

        Ok(result)
    }

    async fn stamp_hours(&self, plan: &ActionPlan) -> Result<bool> {
        let mut all_ok = true;
        for field_id in &plan.hours_fields {
            let outcome = self
                .api
                .set_custom_field(&plan.task_id, field_id, json!(plan.hours_value))
                .await?;
            if !outcome.is_ok() {
                warn!(task_id = %plan.task_id, field_id = %field_id, status = %outcome.status(), "Hours stamp failed");
                all_ok = false;
            }
        }
        Ok(all_ok)
    }
}
