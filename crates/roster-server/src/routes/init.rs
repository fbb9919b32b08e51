use axum::extract::State;
use axum::Json;

use super::{blocking, ApiResult};
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct InitBody {
    #[serde(default)]
    organization: Option<String>,
}

/// POST /api/init: create `.roster/` and seed the default verticals.
pub async fn init_roster(State(app): State<AppState>, Json(body): Json<InitBody>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let organization = body
            .organization
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("roster")
            .to_string();
        roster_core::init::init(&root, &organization)
    })
    .await
}
