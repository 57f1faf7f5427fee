use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, Method, StatusCode},
    Json,
};
use tracing::{debug, instrument, warn};

use crate::app_state::AppState;
use crate::constants::webhook::SIGNATURE_HEADER;
use crate::error::{ApiError, Result};
use crate::models::{WebhookEvent, WebhookResponse};
use crate::utils::verify_signature;

/// Receive a task webhook.
///
/// The body is taken as raw bytes so the signature is checked against exactly
/// what the sender signed; nothing is parsed until it verifies. Body
/// rejections are mapped into [`ApiError`] so they are answered in JSON too.
#[instrument(skip_all, fields(method = %method))]
pub async fn receive_webhook(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<WebhookResponse>> {
    if method != Method::POST {
        return Err(ApiError::MethodNotAllowed(method.to_string()));
    }

    let body = body.map_err(|rejection| match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge(rejection.body_text()),
        _ => ApiError::MalformedPayload(rejection.body_text()),
    })?;
    debug!(body_len = body.len(), "Webhook body received");

    let secret = state
        .config
        .webhook_secret
        .as_deref()
        .ok_or_else(|| ApiError::missing_config("WEBHOOK_SECRET"))?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::MissingSignature)?;

    if !verify_signature(secret, &body, signature)? {
        warn!("Webhook signature mismatch");
        return Err(ApiError::InvalidSignature);
    }

    let event = WebhookEvent::from_slice(&body)?;
    debug!(
        event = %event.event,
        task_id = ?event.task_id,
        list_id = ?event.list_id,
        "Verified webhook payload"
    );

    let now_ms = chrono::Utc::now().timestamp_millis();
    let response = state.processor.process(event, now_ms).await?;
    Ok(Json(response))
}
