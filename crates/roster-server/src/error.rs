use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use roster_core::{ActionResult, RosterError};

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Every handler error funnels through here and leaves as an
/// `ActionResult` body with `success: false`.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error for malformed input on `field`.
    pub fn bad_request(field: &str, reason: impl Into<String>) -> Self {
        Self(RosterError::validation(field, reason).into())
    }
}

fn status_for(e: &RosterError) -> StatusCode {
    match e {
        RosterError::NotInitialized => StatusCode::BAD_REQUEST,
        RosterError::MemberNotFound(_)
        | RosterError::SkillNotFound(_)
        | RosterError::CertificationNotFound(_)
        | RosterError::TrainerNotFound(_)
        | RosterError::VerticalNotFound(_)
        | RosterError::KpiNotFound(_)
        | RosterError::AssessmentNotFound(_)
        | RosterError::RoadmapMonthNotFound(_)
        | RosterError::SuccessionNotFound(_)
        | RosterError::SuccessionEntryNotFound(_) => StatusCode::NOT_FOUND,
        RosterError::MemberExists(_)
        | RosterError::SkillExists(_)
        | RosterError::CertificationExists(_)
        | RosterError::TrainerExists(_)
        | RosterError::VerticalExists(_)
        | RosterError::KpiExists(_)
        | RosterError::SuccessionExists(_) => StatusCode::CONFLICT,
        RosterError::InvalidSlug(_)
        | RosterError::Validation { .. }
        | RosterError::InvalidAnswer { .. }
        | RosterError::InvalidPhone(_)
        | RosterError::MessagingNotConfigured(_) => StatusCode::BAD_REQUEST,
        RosterError::AssessmentState { .. }
        | RosterError::InvalidTransition { .. }
        | RosterError::MemberInactive(_)
        | RosterError::VerticalInactive(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RosterError::Delivery(_) | RosterError::Http(_) => StatusCode::BAD_GATEWAY,
        RosterError::Csv(_) => StatusCode::BAD_REQUEST,
        RosterError::Io(_) | RosterError::Yaml(_) | RosterError::Json(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self
            .0
            .downcast_ref::<RosterError>()
            .map(status_for)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %format!("{:#}", self.0), "request failed");
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = ActionResult::<()>::err(message);
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(e: RosterError) -> StatusCode {
        AppError(e.into()).into_response().status()
    }

    #[test]
    fn not_found_variants_map_to_404() {
        assert_eq!(status(RosterError::MemberNotFound("m".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(RosterError::RoadmapMonthNotFound(9)), StatusCode::NOT_FOUND);
        assert_eq!(
            status(RosterError::SuccessionEntryNotFound("N4".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn exists_variants_map_to_409() {
        assert_eq!(status(RosterError::MemberExists("a@b.org".into())), StatusCode::CONFLICT);
        assert_eq!(status(RosterError::KpiExists("camps".into())), StatusCode::CONFLICT);
    }

    #[test]
    fn validation_maps_to_400() {
        assert_eq!(
            status(RosterError::validation("email", "is required")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(RosterError::NotInitialized), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn state_errors_map_to_422() {
        let e = RosterError::AssessmentState {
            member: "m".into(),
            status: "completed".into(),
            expected: "in_progress".into(),
        };
        assert_eq!(status(e), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            status(RosterError::MemberInactive("m".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn delivery_maps_to_502() {
        assert_eq!(status(RosterError::Delivery("500: down".into())), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        use http_body_util::BodyExt;

        let err = AppError(RosterError::Io(std::io::Error::other("disk full")).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "internal server error");
    }

    #[test]
    fn non_roster_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
