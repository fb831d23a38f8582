use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::state::AppState;
use crate::webhook::dispatch::dispatch_event;
use crate::webhook::event::ClerkEvent;
use crate::webhook::signature::SvixHeaders;

pub const SVIX_ID: &str = "svix-id";
pub const SVIX_TIMESTAMP: &str = "svix-timestamp";
pub const SVIX_SIGNATURE: &str = "svix-signature";

/// POST /clerk-webhook
pub async fn handle_clerk_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    info!("Webhook received");

    let svix = svix_headers(&headers).ok_or(AppError::MissingSvixHeaders)?;
    state.verifier.verify(&body, svix)?;
    debug!(svix_id = svix.id, "Webhook verified");

    let event = ClerkEvent::from_slice(&body)?;
    info!(event_type = event.event_type(), svix_id = svix.id, "Dispatching webhook event");

    let outcome = dispatch_event(state.users.as_ref(), event).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Webhooks processed successfully",
            "outcome": outcome,
        })),
    ))
}

/// All three headers, or `None` if any is absent or not valid UTF-8.
fn svix_headers(headers: &HeaderMap) -> Option<SvixHeaders<'_>> {
    let get = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    };
    Some(SvixHeaders {
        id: get(SVIX_ID)?,
        timestamp: get(SVIX_TIMESTAMP)?,
        signature: get(SVIX_SIGNATURE)?,
    })
}
