use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

pub mod rules;
pub use rules::ListRules;

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    pub log_level: String,
    /// Emit JSON log lines instead of the human-readable format
    pub log_json: bool,
    /// Shared HMAC secret; requests are rejected with 500 while unset
    pub webhook_secret: Option<String>,
    pub task_api: TaskApiConfig,
    pub fields: FieldConfig,
    /// When set, only tasks created in this list are processed
    pub only_list_id: Option<String>,
    pub rules: ListRules,
}

/// Remote task API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Identifiers of the list and custom fields the receiver writes to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub tracker_list_id: Option<String>,
    pub date_field_id: Option<String>,
    pub entity_field_id: Option<String>,
    pub hours_field_ids: Vec<String>,
    pub default_hours_value: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: constants::server::DEFAULT_ENVIRONMENT.to_string(),
            port: constants::server::DEFAULT_PORT,
            log_level: constants::server::DEFAULT_LOG_LEVEL.to_string(),
            log_json: false,
            webhook_secret: None,
            task_api: TaskApiConfig::default(),
            fields: FieldConfig::default(),
            only_list_id: None,
            rules: ListRules::fallback(),
        }
    }
}

impl Default for TaskApiConfig {
    fn default() -> Self {
        Self {
            base_url: constants::task_api::DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_secs: None,
        }
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            tracker_list_id: None,
            date_field_id: None,
            entity_field_id: None,
            hours_field_ids: Vec::new(),
            default_hours_value: constants::rules::DEFAULT_HOURS_VALUE.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_source(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Empty values count as unset.
    ///
    /// Plain settings are trimmed. Credentials are kept byte for byte, since
    /// whitespace in the HMAC secret is part of the key.
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let get_secret = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let rules = ListRules::parse(
            get("LIST_ENTITY_MAP")
                .as_deref()
                .unwrap_or(constants::rules::DEFAULT_LIST_ENTITY_MAP),
            get("ENTITY_OPTION_MAP").as_deref().unwrap_or(""),
            get("ATTACH_ONLY_LIST_IDS").as_deref().unwrap_or(""),
        )
        .map_err(|e| anyhow::anyhow!("Failed to load list rules: {}", e))?;

        Ok(Config {
            environment: get("ENVIRONMENT")
                .unwrap_or_else(|| constants::server::DEFAULT_ENVIRONMENT.to_string()),
            port: match get("PORT") {
                Some(port) => port
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PORT must be a valid port number, got '{}'", port))?,
                None => constants::server::DEFAULT_PORT,
            },
            log_level: get("LOG_LEVEL")
                .unwrap_or_else(|| constants::server::DEFAULT_LOG_LEVEL.to_string()),
            log_json: get("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            webhook_secret: get_secret("WEBHOOK_SECRET"),
            task_api: TaskApiConfig {
                base_url: get("TASK_API_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| constants::task_api::DEFAULT_BASE_URL.to_string()),
                token: get_secret("TASK_API_TOKEN"),
                timeout_secs: match get("TASK_API_TIMEOUT_SECS") {
                    Some(secs) => Some(secs.parse().map_err(|_| {
                        anyhow::anyhow!("TASK_API_TIMEOUT_SECS must be a number, got '{}'", secs)
                    })?),
                    None => None,
                },
            },
            fields: FieldConfig {
                tracker_list_id: get("TRACKER_LIST_ID"),
                date_field_id: get("DATE_FIELD_ID"),
                entity_field_id: get("ENTITY_FIELD_ID"),
                hours_field_ids: get("HOURS_FIELD_IDS")
                    .map(|ids| rules::parse_list(&ids))
                    .unwrap_or_default(),
                default_hours_value: get("DEFAULT_HOURS_VALUE")
                    .unwrap_or_else(|| constants::rules::DEFAULT_HOURS_VALUE.to_string()),
            },
            only_list_id: get("ONLY_LIST_ID"),
            rules,
        })
    }
}
