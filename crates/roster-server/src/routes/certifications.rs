use axum::extract::{Path, State};
use axum::Json;
use roster_core::certification::Certification;

use super::{blocking, ApiResult};
use crate::state::AppState;

/// GET /api/certifications
pub async fn list_certifications(State(app): State<AppState>) -> ApiResult {
    let root = app.root.clone();
    blocking(move || Certification::list(&root)).await
}

#[derive(serde::Deserialize)]
pub struct CreateCertificationBody {
    slug: String,
    name: String,
    #[serde(default)]
    issuer: Option<String>,
    /// Months an award stays valid; absent means it never expires.
    #[serde(default)]
    validity_months: Option<u32>,
}

/// POST /api/certifications
pub async fn create_certification(
    State(app): State<AppState>,
    Json(body): Json<CreateCertificationBody>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut cert = Certification::create(&root, body.slug, body.name)?;
        if body.issuer.is_some() || body.validity_months.is_some() {
            cert.issuer = body.issuer;
            cert.validity_months = body.validity_months;
            cert.save(&root)?;
        }
        Ok(cert)
    })
    .await
}

/// POST /api/certifications/{slug}/deactivate
pub async fn deactivate_certification(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult {
    let root = app.root.clone();
    blocking(move || {
        let mut cert = Certification::load(&root, &slug)?;
        cert.deactivate();
        cert.save(&root)?;
        Ok(cert)
    })
    .await
}
