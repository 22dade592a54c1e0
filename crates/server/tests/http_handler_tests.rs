//! HTTP handler tests for the analyst API.
//!
//! Drives the full router in-process: accounts, token handling, the
//! investigation lifecycle, the queues and the log search.

use axum::http::{HeaderValue, header::AUTHORIZATION};
use axum_test::TestServer;
use hyper::StatusCode;
use sea_orm::{
    ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbBackend, EntityTrait,
    QueryFilter, Statement,
};
use serde_json::{Value, json};
use soc_range::AppResources;
use soc_range::api::build_router;
use soc_range::config::{AppConfig, IntelConfig};
use soc_range::entity::{alert, case_response, user};
use soc_range::intel::IntelClient;
use soc_range::lifecycle::InvestigationLifecycle;
use std::sync::Arc;

async fn exec(db: &DatabaseConnection, sql: impl Into<String>) {
    db.execute(Statement::from_string(DbBackend::Sqlite, sql.into()))
        .await
        .expect("execute sql");
}

/// Create a test database with the full schema and reference data seeded.
async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.expect("connect");

    exec(
        &db,
        r#"CREATE TABLE users (
            user_id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            email TEXT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            deleted_at TEXT NULL
        );"#,
    )
    .await;

    exec(
        &db,
        r#"CREATE TABLE severity_levels (
            severity_id INTEGER PRIMARY KEY AUTOINCREMENT,
            severity_name TEXT NOT NULL UNIQUE
        );"#,
    )
    .await;
    exec(
        &db,
        r#"INSERT INTO severity_levels (severity_name)
           VALUES ('Critical'), ('High'), ('Medium'), ('Low');"#,
    )
    .await;

    exec(
        &db,
        r#"CREATE TABLE alert_types (
            type_id INTEGER PRIMARY KEY AUTOINCREMENT,
            type_name TEXT NOT NULL UNIQUE
        );"#,
    )
    .await;
    exec(
        &db,
        r#"INSERT INTO alert_types (type_name) VALUES ('Brute Force'), ('Malware');"#,
    )
    .await;

    exec(
        &db,
        r#"CREATE TABLE alerts (
            alert_id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id INTEGER NOT NULL,
            event_time TEXT NOT NULL,
            rule_name TEXT NOT NULL,
            severity_id INTEGER NOT NULL,
            alert_type_id INTEGER NULL,
            source_ip TEXT NULL,
            destination_ip TEXT NULL,
            protocol TEXT NULL,
            raw_message TEXT NULL,
            status TEXT NOT NULL DEFAULT 'Open',
            is_closed INTEGER NOT NULL DEFAULT 0,
            closed_at TEXT NULL,
            closed_by INTEGER NULL,
            closure_reason TEXT NULL,
            closure_result TEXT NULL,
            user_assessment_correct INTEGER NULL,
            expected_result TEXT NULL,
            malicious_entity TEXT NULL,
            feedback TEXT NULL,
            answers_provided INTEGER NOT NULL DEFAULT 0,
            answers_correct INTEGER NOT NULL DEFAULT 0,
            answers_summary TEXT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );"#,
    )
    .await;

    exec(
        &db,
        r#"CREATE TABLE alert_details (
            detail_id INTEGER PRIMARY KEY AUTOINCREMENT,
            alert_id INTEGER NOT NULL,
            field_name TEXT NOT NULL,
            field_value TEXT NULL
        );"#,
    )
    .await;

    exec(
        &db,
        r#"CREATE TABLE alert_investigations (
            investigation_id INTEGER PRIMARY KEY AUTOINCREMENT,
            alert_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            started_at TEXT NOT NULL DEFAULT (datetime('now')),
            notes TEXT NULL
        );"#,
    )
    .await;

    exec(
        &db,
        r#"CREATE TABLE case_status (
            status_id INTEGER PRIMARY KEY AUTOINCREMENT,
            status_name TEXT NOT NULL UNIQUE
        );"#,
    )
    .await;
    exec(
        &db,
        r#"INSERT INTO case_status (status_name) VALUES ('Open'), ('In Progress'), ('Closed');"#,
    )
    .await;

    exec(
        &db,
        r#"CREATE TABLE cases (
            case_id INTEGER PRIMARY KEY AUTOINCREMENT,
            case_number TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            description TEXT NULL,
            priority INTEGER NOT NULL DEFAULT 3,
            status_id INTEGER NOT NULL,
            assigned_to INTEGER NULL,
            created_by INTEGER NOT NULL,
            alert_id INTEGER NULL,
            is_closed INTEGER NOT NULL DEFAULT 0,
            closed_at TEXT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );"#,
    )
    .await;

    exec(
        &db,
        r#"CREATE TABLE case_user_responses (
            response_id INTEGER PRIMARY KEY AUTOINCREMENT,
            case_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            answers TEXT NOT NULL,
            total_points INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE (case_id, user_id)
        );"#,
    )
    .await;

    exec(
        &db,
        r#"CREATE TABLE log_management (
            log_id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id INTEGER NOT NULL,
            log_source TEXT NULL,
            source_ip TEXT NULL,
            destination_ip TEXT NULL,
            source_port INTEGER NULL,
            destination_port INTEGER NULL,
            log_time TEXT NOT NULL,
            raw_log TEXT NULL
        );"#,
    )
    .await;

    db
}

fn create_test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        jwt_secret: "0123456789abcdef0123456789abcdef".into(),
        token_ttl_minutes: 60,
        intel: IntelConfig::default(),
    }
}

async fn create_test_resources() -> AppResources {
    // Two rustls providers are compiled in; pick one before building clients.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let db = Arc::new(create_test_db().await);
    let config = Arc::new(create_test_config());
    let lifecycle = Arc::new(
        InvestigationLifecycle::init(db.clone())
            .await
            .expect("lifecycle init"),
    );
    let intel = Arc::new(IntelClient::new(&config.intel));
    AppResources {
        db,
        config,
        lifecycle,
        intel,
    }
}

async fn create_test_server() -> (TestServer, AppResources) {
    let resources = create_test_resources().await;
    let server = TestServer::new(build_router(resources.clone())).expect("create test server");
    (server, resources)
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).expect("header value")
}

async fn register_and_login(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/register")
        .json(&json!({ "username": username, "password": "correct horse battery" }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .post("/login")
        .json(&json!({ "username": username, "password": "correct horse battery" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["token"]
        .as_str()
        .expect("token in response")
        .to_string()
}

/// Insert an alert and return its id.
async fn seed_alert(db: &DatabaseConnection, event_id: i64, expected_result: Option<&str>) -> i32 {
    let expected = match expected_result {
        Some(value) => format!("'{value}'"),
        None => "NULL".to_string(),
    };
    exec(
        db,
        format!(
            "INSERT INTO alerts (event_id, event_time, rule_name, severity_id, expected_result) \
             VALUES ({event_id}, '2026-05-01 10:00:00', 'Suspicious Login Burst', 1, {expected});"
        ),
    )
    .await;

    alert::Entity::find()
        .filter(alert::Column::EventId.eq(event_id))
        .one(db)
        .await
        .expect("query alert")
        .expect("alert row")
        .alert_id
}

// =============================================================================
// Health and routing
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let (server, _resources) = create_test_server().await;

    let response = server.get("/healthz").await;

    response.assert_status_ok();
    response.assert_text("ok");
}

#[tokio::test]
async fn test_unknown_route_returns_not_found() {
    let (server, _resources) = create_test_server().await;

    let response = server.get("/api/does-not-exist").await;

    response.assert_status_not_found();
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_register_creates_account_and_redirects_to_login() {
    let (server, _resources) = create_test_server().await;

    let response = server
        .post("/register")
        .json(&json!({ "username": "alice", "password": "correct horse battery" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["redirectTo"], "/login");
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|m| m.contains("registered"))
    );
}

#[tokio::test]
async fn test_register_requires_username_and_password() {
    let (server, _resources) = create_test_server().await;

    let response = server.post("/register").json(&json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "validation");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_register_rejects_duplicate_username() {
    let (server, _resources) = create_test_server().await;
    register_and_login(&server, "alice").await;

    let response = server
        .post("/register")
        .json(&json!({ "username": "alice", "password": "another password!" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials_uniformly() {
    let (server, _resources) = create_test_server().await;
    register_and_login(&server, "alice").await;

    // Unknown user and wrong password must be indistinguishable.
    let unknown = server
        .post("/login")
        .json(&json!({ "username": "mallory", "password": "whatever" }))
        .await;
    unknown.assert_status_unauthorized();

    let wrong = server
        .post("/login")
        .json(&json!({ "username": "alice", "password": "not the password" }))
        .await;
    wrong.assert_status_unauthorized();

    let unknown_body: Value = unknown.json();
    let wrong_body: Value = wrong.json();
    assert_eq!(unknown_body, wrong_body);
}

#[tokio::test]
async fn test_check_username() {
    let (server, _resources) = create_test_server().await;
    register_and_login(&server, "alice").await;

    let response = server
        .post("/api/check-username")
        .json(&json!({ "username": "alice" }))
        .await;
    response.assert_status_ok();

    let response = server
        .post("/api/check-username")
        .json(&json!({ "username": "mallory" }))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_forgot_password_resets_by_username() {
    let (server, _resources) = create_test_server().await;
    register_and_login(&server, "alice").await;

    let response = server
        .post("/api/forgot-password")
        .json(&json!({
            "username": "alice",
            "newPassword": "a brand new passphrase",
            "confirmNewPassword": "a different passphrase"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/forgot-password")
        .json(&json!({
            "username": "alice",
            "newPassword": "a brand new passphrase",
            "confirmNewPassword": "a brand new passphrase"
        }))
        .await;
    response.assert_status_ok();

    let old = server
        .post("/login")
        .json(&json!({ "username": "alice", "password": "correct horse battery" }))
        .await;
    old.assert_status_unauthorized();

    let new = server
        .post("/login")
        .json(&json!({ "username": "alice", "password": "a brand new passphrase" }))
        .await;
    new.assert_status_ok();
}

#[tokio::test]
async fn test_change_password_requires_the_current_password() {
    let (server, _resources) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;

    let response = server
        .post("/api/change-password")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "currentPassword": "not the password",
            "newPassword": "a brand new passphrase",
            "confirmNewPassword": "a brand new passphrase"
        }))
        .await;
    response.assert_status_unauthorized();

    let response = server
        .post("/api/change-password")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "currentPassword": "correct horse battery",
            "newPassword": "a brand new passphrase",
            "confirmNewPassword": "a brand new passphrase"
        }))
        .await;
    response.assert_status_ok();

    let login = server
        .post("/login")
        .json(&json!({ "username": "alice", "password": "a brand new passphrase" }))
        .await;
    login.assert_status_ok();
}

#[tokio::test]
async fn test_update_email() {
    let (server, resources) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;

    let response = server
        .post("/api/update-email")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "email": "alice@soc.example" }))
        .await;
    response.assert_status_ok();

    let account = user::Entity::find()
        .filter(user::Column::Username.eq("alice"))
        .one(resources.db.as_ref())
        .await
        .expect("query user")
        .expect("user row");
    assert_eq!(account.email.as_deref(), Some("alice@soc.example"));

    let response = server
        .post("/api/update-email")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "email": "" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_account_soft_deletes_and_frees_the_username() {
    let (server, resources) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;

    let response = server
        .delete("/api/delete-account")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();

    // The row survives with a deletion timestamp.
    let account = user::Entity::find()
        .filter(user::Column::Username.eq("alice"))
        .one(resources.db.as_ref())
        .await
        .expect("query user")
        .expect("user row");
    assert!(account.deleted_at.is_some());

    let login = server
        .post("/login")
        .json(&json!({ "username": "alice", "password": "correct horse battery" }))
        .await;
    login.assert_status_unauthorized();

    // The username is free for re-registration.
    let response = server
        .post("/register")
        .json(&json!({ "username": "alice", "password": "correct horse battery" }))
        .await;
    response.assert_status(StatusCode::CREATED);
}

// =============================================================================
// Token handling
// =============================================================================

#[tokio::test]
async fn test_protected_routes_reject_missing_and_malformed_tokens() {
    let (server, _resources) = create_test_server().await;

    let response = server.get("/api/alerts").await;
    response.assert_status_unauthorized();
    let body: Value = response.json();
    assert_eq!(body["error"], "unauthorized");

    let response = server
        .get("/api/alerts")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Basic YWxpY2U6eA=="))
        .await;
    response.assert_status_unauthorized();

    let response = server
        .get("/api/alerts")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer not-a-jwt"))
        .await;
    response.assert_status_forbidden();
    let body: Value = response.json();
    assert_eq!(body["error"], "forbidden");
}

// =============================================================================
// Investigation lifecycle
// =============================================================================

#[tokio::test]
async fn test_claim_moves_the_alert_between_queues() {
    let (server, resources) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;
    let alert_id = seed_alert(resources.db.as_ref(), 9001, None).await;

    let main = server
        .get("/api/alerts")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    main.assert_status_ok();
    let rows: Value = main.json();
    assert_eq!(rows.as_array().expect("array").len(), 1);
    assert_eq!(rows[0]["alert_id"], alert_id);
    assert_eq!(rows[0]["severity_name"], "Critical");

    let claim = server
        .post(&format!("/api/alerts/{alert_id}/start-investigation"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    claim.assert_status(StatusCode::CREATED);
    let body: Value = claim.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["investigation"]["alert_id"], alert_id);

    let main = server
        .get("/api/alerts")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    let rows: Value = main.json();
    assert_eq!(rows.as_array().expect("array").len(), 0);

    let mine = server
        .get("/api/investigation-alerts")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    mine.assert_status_ok();
    let rows: Value = mine.json();
    assert_eq!(rows.as_array().expect("array").len(), 1);
    assert_eq!(rows[0]["alert_id"], alert_id);
    assert!(rows[0]["investigation_id"].is_number());

    let release = server
        .post(&format!("/api/alerts/{alert_id}/unassign"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    release.assert_status_ok();
    let body: Value = release.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["investigation"]["is_active"], false);

    let main = server
        .get("/api/alerts")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    let rows: Value = main.json();
    assert_eq!(rows.as_array().expect("array").len(), 1);
}

#[tokio::test]
async fn test_claim_status_codes_distinguish_owner_and_rival() {
    let (server, resources) = create_test_server().await;
    let alice = register_and_login(&server, "alice").await;
    let bob = register_and_login(&server, "bob").await;
    let alert_id = seed_alert(resources.db.as_ref(), 9002, None).await;

    let response = server
        .post(&format!("/api/alerts/{alert_id}/start-investigation"))
        .add_header(AUTHORIZATION, bearer(&alice))
        .await;
    response.assert_status(StatusCode::CREATED);

    // The owner repeating the claim is a validation error.
    let repeat = server
        .post(&format!("/api/alerts/{alert_id}/start-investigation"))
        .add_header(AUTHORIZATION, bearer(&alice))
        .await;
    repeat.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = repeat.json();
    assert_eq!(body["error"], "validation");

    // A rival analyst gets a conflict.
    let rival = server
        .post(&format!("/api/alerts/{alert_id}/start-investigation"))
        .add_header(AUTHORIZATION, bearer(&bob))
        .await;
    rival.assert_status(StatusCode::CONFLICT);
    let body: Value = rival.json();
    assert_eq!(body["error"], "conflict");

    let missing = server
        .post("/api/alerts/424242/start-investigation")
        .add_header(AUTHORIZATION, bearer(&alice))
        .await;
    missing.assert_status_not_found();
}

#[tokio::test]
async fn test_close_alert_reports_the_grading_outcome() {
    let (server, resources) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;
    let alert_id = seed_alert(resources.db.as_ref(), 9003, Some("True Positive")).await;

    let response = server
        .post(&format!("/api/alerts/{alert_id}/close-alert"))
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "reason": "Confirmed brute force from a single source",
            "result": "true positive",
            "malicious_entity": "203.0.113.7"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["alert"]["alert_id"], alert_id);
    assert_eq!(body["alert"]["user_assessment_correct"], true);
    assert_eq!(body["alert"]["closure_result"], "true positive");
    assert!(body["alert"]["closed_at"].is_string());
}

#[tokio::test]
async fn test_create_case_and_answers_upsert() {
    let (server, resources) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;
    let alert_id = seed_alert(resources.db.as_ref(), 9004, None).await;

    let response = server
        .post(&format!("/api/alerts/{alert_id}/create-case"))
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "title": "Beaconing from finance VLAN" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    let case_id = body["case"]["case_id"].as_i64().expect("case id");
    assert!(
        body["case"]["case_number"]
            .as_str()
            .is_some_and(|n| n.starts_with("CASE-"))
    );

    let first = server
        .post(&format!("/api/cases/{case_id}/answers"))
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "answers": { "q1": "phishing" }, "total_points": 5 }))
        .await;
    first.assert_status_ok();

    let second = server
        .post(&format!("/api/cases/{case_id}/answers"))
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "answers": { "q1": "malware" }, "total_points": 8 }))
        .await;
    second.assert_status_ok();

    // Re-submitting replaced the stored row instead of adding one.
    let rows = case_response::Entity::find()
        .filter(case_response::Column::CaseId.eq(case_id as i32))
        .all(resources.db.as_ref())
        .await
        .expect("query responses");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total_points, 8);
    assert_eq!(rows[0].answers, json!({ "q1": "malware" }));

    let missing = server
        .post("/api/cases/999/answers")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "answers": {} }))
        .await;
    missing.assert_status_not_found();
}

#[tokio::test]
async fn test_reopen_and_reset_over_http() {
    let (server, resources) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;
    let alert_id = seed_alert(resources.db.as_ref(), 9005, Some("True Positive")).await;

    let close = server
        .post(&format!("/api/alerts/{alert_id}/close-alert"))
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "result": "True Positive" }))
        .await;
    close.assert_status_ok();

    let reopen = server
        .patch(&format!("/api/cases/{alert_id}/reopen"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    reopen.assert_status_ok();

    let row = alert::Entity::find_by_id(alert_id)
        .one(resources.db.as_ref())
        .await
        .expect("query alert")
        .expect("alert row");
    assert!(!row.is_closed);
    // The verdict stays visible after reopening.
    assert_eq!(row.closure_result.as_deref(), Some("True Positive"));

    let close = server
        .post(&format!("/api/alerts/{alert_id}/close-alert"))
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "result": "True Positive" }))
        .await;
    close.assert_status_ok();

    let reset = server
        .post("/api/reset-alerts")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    reset.assert_status_ok();

    let row = alert::Entity::find_by_id(alert_id)
        .one(resources.db.as_ref())
        .await
        .expect("query alert")
        .expect("alert row");
    assert!(!row.is_closed);
    assert_eq!(row.status, "Open");
    assert!(row.closure_result.is_none());
    assert!(row.expected_result.is_none());
}

// =============================================================================
// Queues and logs
// =============================================================================

#[tokio::test]
async fn test_alert_detail_is_keyed_by_event_id() {
    let (server, resources) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;
    let alert_id = seed_alert(resources.db.as_ref(), 4625, None).await;
    exec(
        resources.db.as_ref(),
        format!(
            "INSERT INTO alert_details (alert_id, field_name, field_value) \
             VALUES ({alert_id}, 'Firewall Action', 'Blocked');"
        ),
    )
    .await;

    let response = server
        .get("/api/alerts/4625")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["event_id"], 4625);
    assert_eq!(body["level"], "Critical");
    assert_eq!(body["firewall_action"], "Blocked");
    assert_eq!(body["points"], 0);

    let missing = server
        .get("/api/alerts/999999")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    missing.assert_status_not_found();
    let body: Value = missing.json();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_case_queue_switches_to_the_scoreboard_for_status_closed() {
    let (server, resources) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;
    let alert_id = seed_alert(resources.db.as_ref(), 9006, Some("True Positive")).await;

    let escalate = server
        .post(&format!("/api/alerts/{alert_id}/create-case"))
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({}))
        .await;
    escalate.assert_status(StatusCode::CREATED);

    let cases = server
        .get("/api/cases")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    cases.assert_status_ok();
    let rows: Value = cases.json();
    assert_eq!(rows.as_array().expect("array").len(), 1);
    assert_eq!(rows[0]["assigned_to_name"], "alice");
    assert_eq!(rows[0]["case_status"], "Open");

    let close = server
        .post(&format!("/api/alerts/{alert_id}/close-alert"))
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "result": "True Positive" }))
        .await;
    close.assert_status_ok();

    let scoreboard = server
        .get("/api/cases")
        .add_query_param("status", "closed")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    scoreboard.assert_status_ok();
    let rows: Value = scoreboard.json();
    assert_eq!(rows.as_array().expect("array").len(), 1);
    assert_eq!(rows[0]["alert_id"], alert_id);
    assert_eq!(rows[0]["points"], 5);
    assert!(rows[0]["eventTime"].is_string());
}

#[tokio::test]
async fn test_log_search_and_detail_over_http() {
    let (server, resources) = create_test_server().await;
    let token = register_and_login(&server, "alice").await;
    exec(
        resources.db.as_ref(),
        "INSERT INTO log_management (event_id, log_source, source_ip, log_time, raw_log) VALUES \
         (4625, 'Security', '10.0.0.1', '2026-05-01 00:00:01', 'failed logon'), \
         (4688, 'Sysmon', '10.0.0.2', '2026-05-01 00:00:02', 'process created');",
    )
    .await;

    let response = server
        .get("/api/logs")
        .add_query_param("field", "log_source")
        .add_query_param("value", "sysmon")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["rows"][0]["event_id"], 4688);

    let detail = server
        .get("/api/logs/1")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    detail.assert_status_ok();
    let body: Value = detail.json();
    assert_eq!(body["raw_log"], "failed logon");

    let missing = server
        .get("/api/logs/999")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    missing.assert_status_not_found();
}
