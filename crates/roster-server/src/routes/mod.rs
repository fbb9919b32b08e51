pub mod assessments;
pub mod certifications;
pub mod config;
pub mod init;
pub mod members;
pub mod messages;
pub mod skills;
pub mod succession;
pub mod trainers;
pub mod verticals;

use axum::Json;
use roster_core::ActionResult;
use serde::Serialize;

use crate::error::AppError;

/// Every handler answers with an `ActionResult` envelope.
pub type ApiResult = Result<Json<ActionResult<serde_json::Value>>, AppError>;

/// Run a store operation on the blocking pool and wrap its value.
pub(crate) async fn blocking<T, F>(f: F) -> ApiResult
where
    F: FnOnce() -> roster_core::Result<T> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let data = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(ActionResult::ok(serde_json::to_value(data)?)))
}
