//! Application constants and configuration values.
//!
//! This module centralizes hardcoded values so the receiver's wire contract
//! and defaults live in one place.

/// Inbound webhook contract
pub mod webhook {
    /// Route the receiver is mounted on
    pub const PATH: &str = "/webhook";

    /// Header carrying the hex HMAC-SHA256 of the raw body
    pub const SIGNATURE_HEADER: &str = "X-Signature";

    /// Largest request body the receiver buffers (2 MiB)
    pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

    /// The only event that triggers follow-up actions
    pub const TASK_CREATED: &str = "taskCreated";

    /// Event name reported when the payload has none
    pub const UNKNOWN_EVENT: &str = "unknown";
}

/// Remote task API defaults
pub mod task_api {
    pub const DEFAULT_BASE_URL: &str = "https://api.clickup.com/api/v2";

    /// Maximum characters of a failed response body kept in logs
    pub const LOG_BODY_LIMIT: usize = 300;
}

/// Rule table fallbacks, used when the environment does not override them
pub mod rules {
    /// Source list → entity label
    pub const DEFAULT_LIST_ENTITY_MAP: &str = "901205280473=SASOL SECUNDA";

    pub const DEFAULT_HOURS_VALUE: &str = "0";
}

/// Server defaults
pub mod server {
    pub const DEFAULT_PORT: u16 = 3000;
    pub const DEFAULT_ENVIRONMENT: &str = "development";
    pub const DEFAULT_LOG_LEVEL: &str = "info";
    pub const REQUEST_ID_HEADER: &str = "X-Request-ID";
}
