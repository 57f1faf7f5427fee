// Service layer - remote task API access and webhook processing

pub mod list_resolver;
pub mod rule_dispatcher;
pub mod task_api;
pub mod webhook_processor;

pub use task_api::{ApiCallOutcome, TaskApiClient};
pub use webhook_processor::WebhookProcessor;
