use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use roster_core::config::Config;
use roster_core::import::{self, ImportOptions};
use roster_core::member::{Member, MemberStatus, MemberUpdate, NewMember};

use super::{blocking, ApiResult};
use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    chapter: Option<String>,
    /// Include inactive members.
    #[serde(default)]
    all: bool,
}

/// GET /api/members: active members, optionally filtered by chapter.
pub async fn list_members(State(app): State<AppState>, Query(q): Query<ListQuery>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let members: Vec<Member> = Member::list(&root)?
            .into_iter()
            .filter(|m| q.all || m.status == MemberStatus::Active)
            .filter(|m| q.chapter.is_none() || m.chapter == q.chapter)
            .collect();
        Ok(members)
    })
    .await
}

/// POST /api/members
pub async fn create_member(State(app): State<AppState>, Json(body): Json<NewMember>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || Member::create(&root, body)).await
}

/// GET /api/members/{id}
pub async fn get_member(State(app): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || Member::load(&root, &id)).await
}

/// PATCH /api/members/{id}
pub async fn update_member(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MemberUpdate>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut m = Member::load(&root, &id)?;
        m.update(&root, body)?;
        m.save(&root)?;
        Ok(m)
    })
    .await
}

/// POST /api/members/{id}/deactivate
pub async fn deactivate_member(State(app): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut m = Member::load(&root, &id)?;
        m.deactivate();
        m.save(&root)?;
        Ok(m)
    })
    .await
}

/// POST /api/members/{id}/reactivate
pub async fn reactivate_member(State(app): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut m = Member::load(&root, &id)?;
        m.reactivate();
        m.save(&root)?;
        Ok(m)
    })
    .await
}

#[derive(serde::Deserialize)]
pub struct AddSkillBody {
    skill: String,
}

/// POST /api/members/{id}/skills
pub async fn add_skill(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AddSkillBody>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut m = Member::load(&root, &id)?;
        if m.add_skill(&root, &body.skill)? {
            m.save(&root)?;
        }
        Ok(m)
    })
    .await
}

/// DELETE /api/members/{id}/skills/{skill}
pub async fn remove_skill(
    State(app): State<AppState>,
    Path((id, skill)): Path<(String, String)>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut m = Member::load(&root, &id)?;
        if m.remove_skill(&skill) {
            m.save(&root)?;
        }
        Ok(m)
    })
    .await
}

#[derive(serde::Deserialize)]
pub struct AwardBody {
    certification: String,
    /// Defaults to today.
    #[serde(default)]
    obtained_on: Option<NaiveDate>,
}

/// POST /api/members/{id}/certifications
pub async fn award_certification(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AwardBody>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut m = Member::load(&root, &id)?;
        let on = body
            .obtained_on
            .unwrap_or_else(|| chrono::Utc::now().date_naive());
        m.award_certification(&root, &body.certification, on)?;
        m.save(&root)?;
        Ok(m)
    })
    .await
}

// ---------------------------------------------------------------------------
// Bulk import
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct ImportBody {
    /// CSV text with a header row.
    csv: String,
    #[serde(flatten)]
    options: ImportOptions,
}

/// POST /api/members/import/validate: per-row validation without writing.
pub async fn validate_import(
    State(app): State<AppState>,
    Json(body): Json<ImportBody>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let config = Config::load(&root)?;
        import::validate(&root, &body.csv, &config)
    })
    .await
}

/// POST /api/members/import: create, update or skip each row.
pub async fn import_members(State(app): State<AppState>, Json(body): Json<ImportBody>) -> ApiResult {
    if body.options.skip_existing && body.options.update_existing {
        return Err(AppError::bad_request(
            "options",
            "skip_existing and update_existing are mutually exclusive",
        ));
    }
    let root = app.root.clone();
    blocking(move || {
        let config = Config::load(&root)?;
        import::import(&root, &body.csv, body.options, &config)
    })
    .await
}
