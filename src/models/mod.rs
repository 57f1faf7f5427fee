// Data models for the webhook receiver

pub mod webhook;

pub use webhook::{ActionResult, WebhookEvent, WebhookResponse};
