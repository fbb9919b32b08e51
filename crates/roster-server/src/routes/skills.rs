use axum::extract::{Path, State};
use axum::Json;
use roster_core::skill::Skill;

use super::{blocking, ApiResult};
use crate::state::AppState;

/// GET /api/skills
pub async fn list_skills(State(app): State<AppState>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || Skill::list(&root)).await
}

#[derive(serde::Deserialize)]
pub struct CreateSkillBody {
    slug: String,
    name: String,
}

/// POST /api/skills
pub async fn create_skill(
    State(app): State<AppState>,
    Json(body): Json<CreateSkillBody>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || Skill::create(&root, body.slug, body.name)).await
}

/// POST /api/skills/{slug}/deactivate
pub async fn deactivate_skill(State(app): State<AppState>, Path(slug): Path<String>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut skill = Skill::load(&root, &slug)?;
        skill.deactivate();
        skill.save(&root)?;
        Ok(skill)
    })
    .await
}
