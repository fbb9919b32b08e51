use axum::extract::{Path, State};
use axum::Json;
use roster_core::trainer::TrainerProfile;

use super::{blocking, ApiResult};
use crate::state::AppState;

/// GET /api/trainers
pub async fn list_trainers(State(app): State<AppState>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || TrainerProfile::list(&root)).await
}

#[derive(serde::Deserialize)]
pub struct CreateTrainerBody {
    member_id: String,
    #[serde(default)]
    expertise: Vec<String>,
    #[serde(default)]
    bio: Option<String>,
}

/// POST /api/trainers: register an active member as a trainer.
pub async fn create_trainer(
    State(app): State<AppState>,
    Json(body): Json<CreateTrainerBody>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut profile = TrainerProfile::create(&root, &body.member_id, body.expertise)?;
        if let Some(bio) = body.bio.filter(|b| !b.trim().is_empty()) {
            profile.bio = Some(bio);
            profile.save(&root)?;
        }
        Ok(profile)
    })
    .await
}

/// GET /api/trainers/{member_id}
pub async fn get_trainer(State(app): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || TrainerProfile::load(&root, &id)).await
}

#[derive(serde::Deserialize)]
pub struct SessionBody {
    #[serde(default)]
    rating: Option<f64>,
}

/// POST /api/trainers/{member_id}/sessions
pub async fn record_session(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SessionBody>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut profile = TrainerProfile::load(&root, &id)?;
        profile.record_session(body.rating)?;
        profile.save(&root)?;
        Ok(profile)
    })
    .await
}

#[derive(serde::Deserialize)]
pub struct ExpertiseBody {
    expertise: Vec<String>,
}

/// PUT /api/trainers/{member_id}/expertise
pub async fn set_expertise(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ExpertiseBody>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut profile = TrainerProfile::load(&root, &id)?;
        profile.set_expertise(&root, body.expertise)?;
        profile.save(&root)?;
        Ok(profile)
    })
    .await
}

/// POST /api/trainers/{member_id}/deactivate
pub async fn deactivate_trainer(State(app): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut profile = TrainerProfile::load(&root, &id)?;
        profile.deactivate();
        profile.save(&root)?;
        Ok(profile)
    })
    .await
}
