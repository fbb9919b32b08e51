use axum::extract::State;
use axum::Json;
use roster_core::config::{Config, WarnLevel};
use roster_core::RosterError;

use super::{blocking, ApiResult};
use crate::state::AppState;

/// GET /api/config: parsed `.roster/config.yaml` plus validation warnings.
pub async fn get_config(State(app): State<AppState>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let config = Config::load(&root)?;
        let warnings = config.validate();
        Ok(serde_json::json!({ "config": config, "warnings": warnings }))
    })
    .await
}

#[derive(serde::Deserialize)]
pub struct UpdateConfigBody {
    #[serde(default)]
    skill_threshold: Option<f64>,
    #[serde(default)]
    will_threshold: Option<f64>,
    #[serde(default)]
    validity_days: Option<u32>,
    #[serde(default)]
    default_chapter: Option<String>,
}

/// PATCH /api/config: update scoring thresholds, assessment validity and
/// the import default chapter. Rejected when the result would not validate.
pub async fn update_config(
    State(app): State<AppState>,
    Json(body): Json<UpdateConfigBody>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut config = Config::load(&root)?;
        if let Some(s) = body.skill_threshold {
            config.scoring.skill_threshold = s;
        }
        if let Some(w) = body.will_threshold {
            config.scoring.will_threshold = w;
        }
        if let Some(days) = body.validity_days {
            config.assessment.validity_days = days;
        }
        if let Some(chapter) = body.default_chapter {
            let chapter = chapter.trim();
            config.import.default_chapter = (!chapter.is_empty()).then(|| chapter.to_string());
        }
        if let Some(bad) = config
            .validate()
            .into_iter()
            .find(|w| w.level == WarnLevel::Error)
        {
            return Err(RosterError::validation("config", bad.message));
        }
        config.save(&root)?;
        Ok(config)
    })
    .await
}
