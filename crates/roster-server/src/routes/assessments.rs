use axum::extract::{Path, State};
use axum::Json;
use roster_core::answers::Question;
use roster_core::assessment::Assessment;
use roster_core::config::Config;

use super::{blocking, ApiResult};
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/assessments/questions: the five questions with their options.
pub async fn questions() -> ApiResult {
    blocking(|| {
        let items: Vec<serde_json::Value> = Question::all()
            .iter()
            .map(|q| {
                let options: Vec<serde_json::Value> = q
                    .options()
                    .into_iter()
                    .map(|(value, label)| serde_json::json!({ "value": value, "label": label }))
                    .collect();
                serde_json::json!({
                    "question": q.as_str(),
                    "prompt": q.prompt(),
                    "options": options,
                })
            })
            .collect();
        Ok(items)
    })
    .await
}

/// GET /api/assessments: current attempt for every assessed member.
pub async fn list_assessments(State(app): State<AppState>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || Assessment::list(&root)).await
}

/// GET /api/assessments/{member_id}
pub async fn get_assessment(State(app): State<AppState>, Path(member): Path<String>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || Assessment::load(&root, &member)).await
}

/// GET /api/assessments/{member_id}/history: archived attempts, oldest first.
pub async fn history(State(app): State<AppState>, Path(member): Path<String>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || Assessment::attempts(&root, &member)).await
}

/// POST /api/assessments/{member_id}/start: begin, resume or retake.
pub async fn start(State(app): State<AppState>, Path(member): Path<String>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || Assessment::start(&root, &member)).await
}

#[derive(serde::Deserialize)]
pub struct AnswerBody {
    question: String,
    value: String,
}

/// POST /api/assessments/{member_id}/answers
pub async fn answer(
    State(app): State<AppState>,
    Path(member): Path<String>,
    Json(body): Json<AnswerBody>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let config = Config::load(&root)?;
        let question: Question = body.question.parse()?;
        let value = question.parse(&body.value)?;
        let mut a = Assessment::load(&root, &member)?;
        a.record_answer(value, &config)?;
        a.save(&root)?;
        Ok(a)
    })
    .await
}

/// POST /api/assessments/{member_id}/submit: score, categorize, match and
/// build the roadmap.
pub async fn submit(State(app): State<AppState>, Path(member): Path<String>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let config = Config::load(&root)?;
        Assessment::submit(&root, &member, &config)
    })
    .await
}

#[derive(serde::Deserialize)]
pub struct AssignBody {
    #[serde(default)]
    vertical: Option<String>,
    #[serde(default)]
    mentor: Option<String>,
}

/// POST /api/assessments/{member_id}/assign: vertical and/or mentor.
pub async fn assign(
    State(app): State<AppState>,
    Path(member): Path<String>,
    Json(body): Json<AssignBody>,
) -> ApiResult {
    if body.vertical.is_none() && body.mentor.is_none() {
        return Err(AppError::bad_request("assign", "vertical or mentor is required"));
    }
    let root = app.root.clone();
    blocking(move || {
        Assessment::assign(
            &root,
            &member,
            body.vertical.as_deref(),
            body.mentor.as_deref(),
        )
    })
    .await
}

/// POST /api/assessments/{member_id}/roadmap/{month}/complete
pub async fn complete_milestone(
    State(app): State<AppState>,
    Path((member, month)): Path<(String, u8)>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let (assessment, changed) = Assessment::complete_milestone(&root, &member, month)?;
        Ok(serde_json::json!({ "changed": changed, "assessment": assessment }))
    })
    .await
}

#[derive(serde::Deserialize)]
pub struct ExpireBody {
    /// Overrides `assessment.validity_days`.
    #[serde(default)]
    days: Option<u32>,
}

/// POST /api/assessments/expire: mark stale completed assessments expired.
pub async fn expire(State(app): State<AppState>, Json(body): Json<ExpireBody>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let config = Config::load(&root)?;
        let days = body.days.unwrap_or(config.assessment.validity_days);
        let expired = Assessment::expire_stale(&root, chrono::Utc::now(), days)?;
        Ok(serde_json::json!({ "expired": expired }))
    })
    .await
}
