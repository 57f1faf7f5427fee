//! Application state shared across all handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::services::WebhookProcessor;

/// Application state shared across handlers.
///
/// Everything here is built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Follow-up action runner for verified events
    pub processor: WebhookProcessor,
}
