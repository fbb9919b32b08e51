use axum::extract::State;
use axum::Json;
use roster_core::config::Config;
use roster_core::messaging::{self, Audience, WhatsAppClient};
use roster_core::RosterError;

use super::{blocking, ApiResult};
use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct PreviewBody {
    audience: Audience,
}

/// POST /api/messages/preview: recipients and normalized numbers, no sending.
pub async fn preview(State(app): State<AppState>, Json(body): Json<PreviewBody>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let config = Config::load(&root)?;
        let country_code = config.country_code();
        let recipients: Vec<serde_json::Value> = messaging::recipients(&root, &body.audience)?
            .iter()
            .map(|m| {
                let phone = m
                    .phone
                    .as_deref()
                    .and_then(|p| messaging::normalize_phone(p, &country_code).ok());
                serde_json::json!({ "member_id": m.id, "name": m.name, "phone": phone })
            })
            .collect();
        Ok(recipients)
    })
    .await
}

#[derive(serde::Deserialize)]
pub struct SendBody {
    audience: Audience,
    text: String,
}

/// POST /api/messages: deliver `text` to every recipient of `audience`.
/// Per-recipient failures are reported in the body, not as an error status.
pub async fn send(State(app): State<AppState>, Json(body): Json<SendBody>) -> ApiResult {
    if body.text.trim().is_empty() {
        return Err(AppError::bad_request("text", "must not be empty"));
    }
    let root = app.root.clone();
    blocking(move || {
        let config = Config::load(&root)?;
        let messaging_config = config.messaging.as_ref().ok_or_else(|| {
            RosterError::MessagingNotConfigured("no messaging section in config".to_string())
        })?;
        let client = WhatsAppClient::from_config(messaging_config)?;
        let recipients = messaging::recipients(&root, &body.audience)?;
        Ok(messaging::broadcast(
            &client,
            &recipients,
            &body.text,
            &config.country_code(),
        ))
    })
    .await
}
