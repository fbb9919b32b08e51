use axum::extract::{Path, Query, State};
use axum::Json;
use roster_core::vertical::{Kpi, Vertical, VerticalProfile};

use super::{blocking, ApiResult};
use crate::state::AppState;

/// GET /api/verticals
pub async fn list_verticals(State(app): State<AppState>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || Vertical::list(&root)).await
}

#[derive(serde::Deserialize)]
pub struct CreateVerticalBody {
    slug: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
}

/// POST /api/verticals
pub async fn create_vertical(
    State(app): State<AppState>,
    Json(body): Json<CreateVerticalBody>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut v = Vertical::create(&root, body.slug, body.name)?;
        if body.description.is_some() {
            v.description = body.description;
            v.save(&root)?;
        }
        Ok(v)
    })
    .await
}

/// GET /api/verticals/{slug}
pub async fn get_vertical(State(app): State<AppState>, Path(slug): Path<String>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || Vertical::load(&root, &slug)).await
}

/// POST /api/verticals/{slug}/deactivate
pub async fn deactivate_vertical(State(app): State<AppState>, Path(slug): Path<String>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut v = Vertical::load(&root, &slug)?;
        v.deactivate();
        v.save(&root)?;
        Ok(v)
    })
    .await
}

/// PUT /api/verticals/{slug}/profile: the profile the matcher scores against.
pub async fn set_profile(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<VerticalProfile>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut v = Vertical::load(&root, &slug)?;
        v.set_profile(body);
        v.save(&root)?;
        Ok(v)
    })
    .await
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct AddKpiBody {
    slug: String,
    name: String,
    target: f64,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    weight: Option<u32>,
}

/// POST /api/verticals/{slug}/kpis
pub async fn add_kpi(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<AddKpiBody>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut v = Vertical::load(&root, &slug)?;
        let mut kpi = Kpi::new(body.slug, body.name, body.target);
        kpi.unit = body.unit;
        if let Some(w) = body.weight {
            kpi.weight = w;
        }
        v.add_kpi(kpi)?;
        v.save(&root)?;
        Ok(v)
    })
    .await
}

#[derive(serde::Deserialize)]
pub struct ActualBody {
    period: String,
    value: f64,
}

/// POST /api/verticals/{slug}/kpis/{kpi}/actuals
pub async fn record_actual(
    State(app): State<AppState>,
    Path((slug, kpi)): Path<(String, String)>,
    Json(body): Json<ActualBody>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut v = Vertical::load(&root, &slug)?;
        v.record_actual(&kpi, &body.period, body.value)?;
        v.save(&root)?;
        Ok(v)
    })
    .await
}

#[derive(serde::Deserialize)]
pub struct PerformanceQuery {
    #[serde(default)]
    period: Option<String>,
}

/// GET /api/verticals/{slug}/performance
pub async fn performance(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Query(q): Query<PerformanceQuery>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let v = Vertical::load(&root, &slug)?;
        Ok(v.performance(q.period.as_deref()))
    })
    .await
}
