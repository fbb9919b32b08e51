use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use roster_core::succession::{
    ApplicationStatus, MeetingStatus, NominationStatus, SuccessionCycle,
};

use super::{blocking, ApiResult};
use crate::state::AppState;

/// Load the cycle, apply `f`, persist and return the updated cycle.
async fn mutate<F>(app: AppState, slug: String, f: F) -> ApiResult
where
    F: FnOnce(&std::path::Path, &mut SuccessionCycle) -> roster_core::Result<()> + Send + 'static,
{
    let root = app.root.clone();
    blocking(move || {
        let mut cycle = SuccessionCycle::load(&root, &slug)?;
        f(&root, &mut cycle)?;
        cycle.save(&root)?;
        Ok(cycle)
    })
    .await
}

/// GET /api/succession
pub async fn list_cycles(State(app): State<AppState>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || SuccessionCycle::list(&root)).await
}

#[derive(serde::Deserialize)]
pub struct CreateCycleBody {
    slug: String,
    title: String,
    positions: Vec<String>,
}

/// POST /api/succession
pub async fn create_cycle(
    State(app): State<AppState>,
    Json(body): Json<CreateCycleBody>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || SuccessionCycle::create(&root, body.slug, body.title, body.positions)).await
}

/// GET /api/succession/{slug}
pub async fn get_cycle(State(app): State<AppState>, Path(slug): Path<String>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || SuccessionCycle::load(&root, &slug)).await
}

/// POST /api/succession/{slug}/voting
pub async fn open_voting(State(app): State<AppState>, Path(slug): Path<String>) -> ApiResult {
    mutate(app, slug, |_, c| c.open_voting()).await
}

/// POST /api/succession/{slug}/close
pub async fn close_cycle(State(app): State<AppState>, Path(slug): Path<String>) -> ApiResult {
    mutate(app, slug, |_, c| c.close()).await
}

// ---------------------------------------------------------------------------
// Nominations and applications
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct NominateBody {
    position: String,
    nominee: String,
    nominated_by: String,
}

/// POST /api/succession/{slug}/nominations
pub async fn nominate(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<NominateBody>,
) -> ApiResult {
    mutate(app, slug, move |root, c| {
        c.nominate(root, &body.position, &body.nominee, &body.nominated_by)
            .map(|_| ())
    })
    .await
}

#[derive(serde::Deserialize)]
pub struct NominationStatusBody {
    status: NominationStatus,
}

/// PUT /api/succession/{slug}/nominations/{id}
pub async fn set_nomination_status(
    State(app): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
    Json(body): Json<NominationStatusBody>,
) -> ApiResult {
    mutate(app, slug, move |_, c| c.set_nomination_status(&id, body.status)).await
}

#[derive(serde::Deserialize)]
pub struct ApplyBody {
    position: String,
    applicant: String,
    #[serde(default)]
    statement: String,
}

/// POST /api/succession/{slug}/applications
pub async fn apply(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<ApplyBody>,
) -> ApiResult {
    mutate(app, slug, move |root, c| {
        c.apply(root, &body.position, &body.applicant, body.statement)
            .map(|_| ())
    })
    .await
}

#[derive(serde::Deserialize)]
pub struct ApplicationStatusBody {
    status: ApplicationStatus,
}

/// PUT /api/succession/{slug}/applications/{id}
pub async fn set_application_status(
    State(app): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
    Json(body): Json<ApplicationStatusBody>,
) -> ApiResult {
    mutate(app, slug, move |_, c| c.set_application_status(&id, body.status)).await
}

// ---------------------------------------------------------------------------
// Meetings and votes
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct ScheduleBody {
    position: String,
    at: DateTime<Utc>,
}

/// POST /api/succession/{slug}/meetings
pub async fn schedule_meeting(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<ScheduleBody>,
) -> ApiResult {
    mutate(app, slug, move |_, c| {
        c.schedule_meeting(&body.position, body.at).map(|_| ())
    })
    .await
}

#[derive(serde::Deserialize)]
pub struct MeetingStatusBody {
    status: MeetingStatus,
}

/// PUT /api/succession/{slug}/meetings/{id}
pub async fn set_meeting_status(
    State(app): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
    Json(body): Json<MeetingStatusBody>,
) -> ApiResult {
    mutate(app, slug, move |_, c| c.set_meeting_status(&id, body.status)).await
}

#[derive(serde::Deserialize)]
pub struct VoteBody {
    voter: String,
    candidate: String,
}

/// POST /api/succession/{slug}/meetings/{id}/votes
pub async fn cast_vote(
    State(app): State<AppState>,
    Path((slug, meeting)): Path<(String, String)>,
    Json(body): Json<VoteBody>,
) -> ApiResult {
    mutate(app, slug, move |root, c| {
        c.cast_vote(root, &meeting, &body.voter, &body.candidate)
    })
    .await
}

/// GET /api/succession/{slug}/meetings/{id}/tally
pub async fn tally(
    State(app): State<AppState>,
    Path((slug, meeting)): Path<(String, String)>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || SuccessionCycle::load(&root, &slug)?.tally(&meeting)).await
}
