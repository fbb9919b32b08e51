pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{delete, get, post, put};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf) -> Router {
    let app_state = state::AppState::new(root);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Init + config
        .route("/api/init", post(routes::init::init_roster))
        .route(
            "/api/config",
            get(routes::config::get_config).patch(routes::config::update_config),
        )
        // Members
        .route(
            "/api/members",
            get(routes::members::list_members).post(routes::members::create_member),
        )
        .route("/api/members/import", post(routes::members::import_members))
        .route(
            "/api/members/import/validate",
            post(routes::members::validate_import),
        )
        .route(
            "/api/members/{id}",
            get(routes::members::get_member).patch(routes::members::update_member),
        )
        .route(
            "/api/members/{id}/deactivate",
            post(routes::members::deactivate_member),
        )
        .route(
            "/api/members/{id}/reactivate",
            post(routes::members::reactivate_member),
        )
        .route("/api/members/{id}/skills", post(routes::members::add_skill))
        .route(
            "/api/members/{id}/skills/{skill}",
            delete(routes::members::remove_skill),
        )
        .route(
            "/api/members/{id}/certifications",
            post(routes::members::award_certification),
        )
        // Skills + certifications
        .route(
            "/api/skills",
            get(routes::skills::list_skills).post(routes::skills::create_skill),
        )
        .route(
            "/api/skills/{slug}/deactivate",
            post(routes::skills::deactivate_skill),
        )
        .route(
            "/api/certifications",
            get(routes::certifications::list_certifications)
                .post(routes::certifications::create_certification),
        )
        .route(
            "/api/certifications/{slug}/deactivate",
            post(routes::certifications::deactivate_certification),
        )
        // Trainers
        .route(
            "/api/trainers",
            get(routes::trainers::list_trainers).post(routes::trainers::create_trainer),
        )
        .route("/api/trainers/{id}", get(routes::trainers::get_trainer))
        .route(
            "/api/trainers/{id}/sessions",
            post(routes::trainers::record_session),
        )
        .route(
            "/api/trainers/{id}/expertise",
            put(routes::trainers::set_expertise),
        )
        .route(
            "/api/trainers/{id}/deactivate",
            post(routes::trainers::deactivate_trainer),
        )
        // Verticals
        .route(
            "/api/verticals",
            get(routes::verticals::list_verticals).post(routes::verticals::create_vertical),
        )
        .route("/api/verticals/{slug}", get(routes::verticals::get_vertical))
        .route(
            "/api/verticals/{slug}/deactivate",
            post(routes::verticals::deactivate_vertical),
        )
        .route(
            "/api/verticals/{slug}/profile",
            put(routes::verticals::set_profile),
        )
        .route("/api/verticals/{slug}/kpis", post(routes::verticals::add_kpi))
        .route(
            "/api/verticals/{slug}/kpis/{kpi}/actuals",
            post(routes::verticals::record_actual),
        )
        .route(
            "/api/verticals/{slug}/performance",
            get(routes::verticals::performance),
        )
        // Assessments
        .route(
            "/api/assessments",
            get(routes::assessments::list_assessments),
        )
        .route(
            "/api/assessments/questions",
            get(routes::assessments::questions),
        )
        .route("/api/assessments/expire", post(routes::assessments::expire))
        .route(
            "/api/assessments/{member}",
            get(routes::assessments::get_assessment),
        )
        .route(
            "/api/assessments/{member}/history",
            get(routes::assessments::history),
        )
        .route(
            "/api/assessments/{member}/start",
            post(routes::assessments::start),
        )
        .route(
            "/api/assessments/{member}/answers",
            post(routes::assessments::answer),
        )
        .route(
            "/api/assessments/{member}/submit",
            post(routes::assessments::submit),
        )
        .route(
            "/api/assessments/{member}/assign",
            post(routes::assessments::assign),
        )
        .route(
            "/api/assessments/{member}/roadmap/{month}/complete",
            post(routes::assessments::complete_milestone),
        )
        // Succession
        .route(
            "/api/succession",
            get(routes::succession::list_cycles).post(routes::succession::create_cycle),
        )
        .route("/api/succession/{slug}", get(routes::succession::get_cycle))
        .route(
            "/api/succession/{slug}/voting",
            post(routes::succession::open_voting),
        )
        .route(
            "/api/succession/{slug}/close",
            post(routes::succession::close_cycle),
        )
        .route(
            "/api/succession/{slug}/nominations",
            post(routes::succession::nominate),
        )
        .route(
            "/api/succession/{slug}/nominations/{id}",
            put(routes::succession::set_nomination_status),
        )
        .route(
            "/api/succession/{slug}/applications",
            post(routes::succession::apply),
        )
        .route(
            "/api/succession/{slug}/applications/{id}",
            put(routes::succession::set_application_status),
        )
        .route(
            "/api/succession/{slug}/meetings",
            post(routes::succession::schedule_meeting),
        )
        .route(
            "/api/succession/{slug}/meetings/{id}",
            put(routes::succession::set_meeting_status),
        )
        .route(
            "/api/succession/{slug}/meetings/{id}/votes",
            post(routes::succession::cast_vote),
        )
        .route(
            "/api/succession/{slug}/meetings/{id}/tally",
            get(routes::succession::tally),
        )
        // Messaging
        .route("/api/messages", post(routes::messages::send))
        .route("/api/messages/preview", post(routes::messages::preview))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the roster API server on `port`.
pub async fn serve(root: PathBuf, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, listener).await
}

/// Start the roster API server on a pre-bound listener.
///
/// Lets the caller read the actual port before starting (useful when
/// `port = 0` and the OS picks a free port).
pub async fn serve_on(root: PathBuf, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(root);

    tracing::info!("roster API listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
