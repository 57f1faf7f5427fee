//! Application startup and initialization logic.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::Config;
use crate::services::{TaskApiClient, WebhookProcessor};

/// Install the global tracing subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("task_intake_webhook={},tower_http=info", config.log_level).into()
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Build the application state from a loaded configuration.
pub fn initialize_app(config: Config) -> Result<AppState> {
    if config.webhook_secret.is_none() {
        warn!("WEBHOOK_SECRET is not set; every webhook will be rejected with 500");
    }
    if config.task_api.token.is_none() {
        warn!("TASK_API_TOKEN is not set; task actions will fail with 500");
    }
    if config.rules.entity_options.is_empty() {
        warn!("ENTITY_OPTION_MAP is empty; entity fields will not be set");
    }

    let api = TaskApiClient::new(&config.task_api)
        .map_err(|e| anyhow::anyhow!("Failed to initialize task API client: {}", e))?;
    info!("✅ Task API client initialized (base: {})", config.task_api.base_url);

    info!(
        mapped_lists = config.rules.list_entities.len(),
        attach_only_lists = config.rules.attach_only_lists.len(),
        only_list_id = ?config.only_list_id,
        "✅ List rules loaded"
    );

    let config = Arc::new(config);
    let processor = WebhookProcessor::new(config.clone(), api);

    Ok(AppState { config, processor })
}
