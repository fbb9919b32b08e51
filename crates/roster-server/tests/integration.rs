use axum::http::StatusCode;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn init_roster(dir: &TempDir) {
    roster_core::init::init(dir.path(), "Test Org").unwrap();
}

fn app(dir: &TempDir) -> axum::Router {
    roster_server::build_router(dir.path().to_path_buf())
}

/// Send a request via `oneshot` and return (status, parsed JSON body).
async fn request(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = axum::http::Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(serde_json::to_vec(&b).unwrap()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    request(app, "GET", uri, None).await
}

async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    request(app, "POST", uri, Some(body)).await
}

/// Create a member through the API and return its id.
async fn create_member(dir: &TempDir, name: &str, email: &str) -> String {
    let (status, json) = post_json(
        app(dir),
        "/api/members",
        serde_json::json!({ "name": name, "email": email, "phone": "98450 12345" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    json["data"]["id"].as_str().unwrap().to_string()
}

async fn answer_all(dir: &TempDir, member: &str, answers: [(&str, &str); 5]) {
    for (question, value) in answers {
        let (status, json) = post_json(
            app(dir),
            &format!("/api/assessments/{member}/answers"),
            serde_json::json!({ "question": question, "value": value }),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{json}");
    }
}

const STAR: [(&str, &str); 5] = [
    ("energy_focus", "high_energy_field_work"),
    ("age_group", "teens"),
    ("skill_level", "advanced"),
    ("time_commitment", "high"),
    ("travel_willingness", "high"),
];

// ---------------------------------------------------------------------------
// Config + init
// ---------------------------------------------------------------------------

#[tokio::test]
async fn uninitialized_root_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let (status, json) = get(app(&dir), "/api/config").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("roster init"));
}

#[tokio::test]
async fn init_then_get_config() {
    let dir = TempDir::new().unwrap();
    let (status, json) = post_json(
        app(&dir),
        "/api/init",
        serde_json::json!({ "organization": "Riverside" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let (status, json) = get(app(&dir), "/api/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["config"]["organization"]["name"], "Riverside");
    assert_eq!(json["data"]["warnings"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn patch_config_rejects_out_of_range_threshold() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    let (status, _) = request(
        app(&dir),
        "PATCH",
        "/api/config",
        Some(serde_json::json!({ "skill_threshold": 1.4 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = request(
        app(&dir),
        "PATCH",
        "/api/config",
        Some(serde_json::json!({ "will_threshold": 0.6 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["scoring"]["will_threshold"], 0.6);
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

#[tokio::test]
async fn member_create_duplicate_and_lookup() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    let id = create_member(&dir, "Asha", "asha@example.org").await;

    let (status, json) = post_json(
        app(&dir),
        "/api/members",
        serde_json::json!({ "name": "Other", "email": "Asha@Example.org" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["success"], false);

    let (status, _) = post_json(
        app(&dir),
        "/api/members",
        serde_json::json!({ "name": "Bad", "email": "not-an-email" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = get(app(&dir), &format!("/api/members/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["email"], "asha@example.org");

    let (status, _) = get(app(&dir), "/api/members/no-such-member").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deactivated_members_drop_out_of_list() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    let id = create_member(&dir, "Asha", "asha@example.org").await;
    create_member(&dir, "Ravi", "ravi@example.org").await;

    let (status, _) = post_json(
        app(&dir),
        &format!("/api/members/{id}/deactivate"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = get(app(&dir), "/api/members").await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    let (_, json) = get(app(&dir), "/api/members?all=true").await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn import_duplicate_handling() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    create_member(&dir, "Asha", "asha@example.org").await;
    let csv = "name,email,chapter\nAsha Rao,asha@example.org,pune\nRavi,ravi@example.org,\n";

    let (status, json) = post_json(
        app(&dir),
        "/api/members/import",
        serde_json::json!({ "csv": csv, "skip_existing": true, "update_existing": true }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{json}");

    let (status, json) = post_json(
        app(&dir),
        "/api/members/import",
        serde_json::json!({ "csv": csv, "dry_run": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["rows"][0]["status"], "error");
    assert_eq!(json["data"]["summary"]["created"], 1);

    let (status, json) = post_json(
        app(&dir),
        "/api/members/import",
        serde_json::json!({ "csv": csv, "update_existing": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["rows"][0]["status"], "updated");
    assert_eq!(json["data"]["rows"][1]["status"], "created");

    let (_, json) = get(app(&dir), "/api/members?chapter=pune").await;
    assert_eq!(json["data"][0]["name"], "Asha Rao");
}

#[tokio::test]
async fn certification_award_computes_expiry() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    let id = create_member(&dir, "Asha", "asha@example.org").await;
    let (status, _) = post_json(
        app(&dir),
        "/api/certifications",
        serde_json::json!({ "slug": "first-aid", "name": "First aid", "validity_months": 24 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = post_json(
        app(&dir),
        &format!("/api/members/{id}/certifications"),
        serde_json::json!({ "certification": "first-aid", "obtained_on": "2026-03-31" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["certifications"][0]["expires_on"], "2028-03-31");
}

#[tokio::test]
async fn trainer_sessions_average_ratings() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    let id = create_member(&dir, "Asha", "asha@example.org").await;
    post_json(
        app(&dir),
        "/api/skills",
        serde_json::json!({ "slug": "public-speaking", "name": "Public speaking" }),
    )
    .await;
    let (status, _) = post_json(
        app(&dir),
        "/api/trainers",
        serde_json::json!({ "member_id": id, "expertise": ["public-speaking"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for rating in [4.0, 5.0] {
        post_json(
            app(&dir),
            &format!("/api/trainers/{id}/sessions"),
            serde_json::json!({ "rating": rating }),
        )
        .await;
    }
    let (status, _) = post_json(
        app(&dir),
        &format!("/api/trainers/{id}/sessions"),
        serde_json::json!({ "rating": 9.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, json) = get(app(&dir), &format!("/api/trainers/{id}")).await;
    assert_eq!(json["data"]["sessions_delivered"], 2);
    assert_eq!(json["data"]["rating"], 4.5);
}

// ---------------------------------------------------------------------------
// Assessments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn questions_list_five_with_options() {
    let dir = TempDir::new().unwrap();
    let (status, json) = get(app(&dir), "/api/assessments/questions").await;
    assert_eq!(status, StatusCode::OK);
    let questions = json["data"].as_array().unwrap();
    assert_eq!(questions.len(), 5);
    assert_eq!(questions[0]["question"], "energy_focus");
    assert!(!questions[0]["options"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn assessment_flow_star_assign_and_complete() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    let id = create_member(&dir, "Asha", "asha@example.org").await;
    let mentor = create_member(&dir, "Guide", "guide@example.org").await;

    let (status, json) = post_json(
        app(&dir),
        &format!("/api/assessments/{id}/start"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "in_progress");

    let (status, json) = post_json(
        app(&dir),
        &format!("/api/assessments/{id}/submit"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{json}");

    answer_all(&dir, &id, STAR).await;
    let (status, json) = post_json(
        app(&dir),
        &format!("/api/assessments/{id}/submit"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let a = &json["data"];
    assert_eq!(a["category"], "star");
    assert!(a["skill_score"].as_f64().unwrap() >= 0.7);
    assert!(a["will_score"].as_f64().unwrap() >= 0.7);
    assert_eq!(a["roadmap"].as_array().unwrap().len(), 6);
    for m in a["matches"].as_array().unwrap() {
        let pct = m["percentage"].as_u64().unwrap();
        assert!(pct <= 100);
    }

    let (status, json) = post_json(
        app(&dir),
        &format!("/api/assessments/{id}/assign"),
        serde_json::json!({ "vertical": "road-safety", "mentor": mentor }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["assigned_vertical"], "road-safety");
    assert_eq!(json["data"]["assigned_mentor"], mentor.as_str());

    let (status, json) = post_json(
        app(&dir),
        &format!("/api/assessments/{id}/roadmap/2/complete"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["changed"], true);

    let (status, _) = post_json(
        app(&dir),
        &format!("/api/assessments/{id}/roadmap/9/complete"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn assign_with_bad_mentor_stores_nothing() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    let id = create_member(&dir, "Asha", "asha@example.org").await;
    post_json(app(&dir), &format!("/api/assessments/{id}/start"), serde_json::json!({})).await;
    answer_all(&dir, &id, STAR).await;
    post_json(app(&dir), &format!("/api/assessments/{id}/submit"), serde_json::json!({})).await;

    let (status, json) = post_json(
        app(&dir),
        &format!("/api/assessments/{id}/assign"),
        serde_json::json!({ "vertical": "road-safety", "mentor": "ghost" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{json}");
    assert_eq!(json["success"], false);

    let (status, json) = post_json(
        app(&dir),
        &format!("/api/assessments/{id}/assign"),
        serde_json::json!({ "vertical": "road-safety", "mentor": id }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{json}");

    let (status, json) = get(app(&dir), &format!("/api/assessments/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"]["assigned_vertical"].is_null(), "{json}");
    assert!(json["data"]["assigned_mentor"].is_null(), "{json}");
}

#[tokio::test]
async fn answering_a_completed_assessment_is_unprocessable() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    let id = create_member(&dir, "Asha", "asha@example.org").await;
    post_json(app(&dir), &format!("/api/assessments/{id}/start"), serde_json::json!({})).await;
    answer_all(&dir, &id, STAR).await;
    post_json(app(&dir), &format!("/api/assessments/{id}/submit"), serde_json::json!({})).await;

    let (status, json) = post_json(
        app(&dir),
        &format!("/api/assessments/{id}/answers"),
        serde_json::json!({ "question": "age_group", "value": "adults" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{json}");

    let (status, _) = post_json(
        app(&dir),
        "/api/assessments/expire",
        serde_json::json!({ "days": 365 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn invalid_answer_is_bad_request() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    let id = create_member(&dir, "Asha", "asha@example.org").await;
    post_json(app(&dir), &format!("/api/assessments/{id}/start"), serde_json::json!({})).await;
    let (status, json) = post_json(
        app(&dir),
        &format!("/api/assessments/{id}/answers"),
        serde_json::json!({ "question": "skill_level", "value": "grandmaster" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

// ---------------------------------------------------------------------------
// Verticals
// ---------------------------------------------------------------------------

#[tokio::test]
async fn vertical_kpis_and_performance() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    let (status, _) = post_json(
        app(&dir),
        "/api/verticals/health/kpis",
        serde_json::json!({ "slug": "camps", "name": "Health camps", "target": 10.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_json(
        app(&dir),
        "/api/verticals/health/kpis/camps/actuals",
        serde_json::json!({ "period": "2026-q3", "value": 10.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = get(app(&dir), "/api/verticals/health/performance?period=2026-q3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["score"], 100.0);

    let (status, _) = post_json(
        app(&dir),
        "/api/verticals/health/kpis/missing/actuals",
        serde_json::json!({ "period": "2026-q3", "value": 1.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Succession
// ---------------------------------------------------------------------------

#[tokio::test]
async fn succession_vote_and_tally() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    let asha = create_member(&dir, "Asha", "asha@example.org").await;
    let ravi = create_member(&dir, "Ravi", "ravi@example.org").await;

    let (status, _) = post_json(
        app(&dir),
        "/api/succession",
        serde_json::json!({ "slug": "chair-2026", "title": "Chair", "positions": ["chair"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    post_json(
        app(&dir),
        "/api/succession/chair-2026/nominations",
        serde_json::json!({ "position": "chair", "nominee": asha, "nominated_by": ravi }),
    )
    .await;
    let (status, _) = request(
        app(&dir),
        "PUT",
        "/api/succession/chair-2026/nominations/N1",
        Some(serde_json::json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    post_json(
        app(&dir),
        "/api/succession/chair-2026/meetings",
        serde_json::json!({ "position": "chair", "at": "2026-11-01T10:00:00Z" }),
    )
    .await;

    let vote = serde_json::json!({ "voter": ravi, "candidate": asha });
    let (status, _) = post_json(
        app(&dir),
        "/api/succession/chair-2026/meetings/M1/votes",
        vote.clone(),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    post_json(app(&dir), "/api/succession/chair-2026/voting", serde_json::json!({})).await;
    let (status, json) =
        post_json(app(&dir), "/api/succession/chair-2026/meetings/M1/votes", vote).await;
    assert_eq!(status, StatusCode::OK, "{json}");

    let (_, json) = get(app(&dir), "/api/succession/chair-2026/meetings/M1/tally").await;
    assert_eq!(json["data"][0]["candidate"], asha.as_str());
    assert_eq!(json["data"][0]["votes"], 1);
}

// ---------------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------------

#[tokio::test]
async fn message_preview_normalizes_numbers() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    create_member(&dir, "Asha", "asha@example.org").await;
    let (status, json) = post_json(
        app(&dir),
        "/api/messages/preview",
        serde_json::json!({ "audience": { "kind": "all" } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["phone"], "919845012345");
}

#[tokio::test]
async fn send_without_messaging_config_is_bad_request() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    let (status, json) = post_json(
        app(&dir),
        "/api/messages",
        serde_json::json!({ "audience": { "kind": "all" }, "text": "hello" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("not configured"));
}

#[tokio::test(flavor = "multi_thread")]
async fn send_delivers_through_gateway() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    create_member(&dir, "Asha", "asha@example.org").await;

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/messages")
        .match_header("authorization", "Bearer server-test-token")
        .with_status(200)
        .with_body(r#"{"messages":[{"id":"wamid.7"}]}"#)
        .create_async()
        .await;

    std::env::set_var("ROSTER_SERVER_TEST_TOKEN", "server-test-token");
    let mut config = roster_core::config::Config::load(dir.path()).unwrap();
    config.messaging = Some(roster_core::config::MessagingConfig {
        api_url: format!("{}/messages", server.url()),
        token_env: "ROSTER_SERVER_TEST_TOKEN".to_string(),
        default_country_code: "91".to_string(),
    });
    config.save(dir.path()).unwrap();

    let (status, json) = post_json(
        app(&dir),
        "/api/messages",
        serde_json::json!({ "audience": { "kind": "all" }, "text": "Camp on Sunday" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["sent"], 1);
    assert_eq!(json["data"]["deliveries"][0]["message_id"], "wamid.7");
    mock.assert_async().await;
}
