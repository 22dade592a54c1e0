use goose::prelude::*;
use serde_json::{Value, json};
use std::env;

/// Session token obtained at scenario start and replayed on every request.
struct Session {
    token: String,
}

fn credentials() -> (String, String) {
    let username = env::var("RANGE_USER").unwrap_or_else(|_| "trainee".to_string());
    let password = env::var("RANGE_PASSWORD").unwrap_or_else(|_| "trainee-password".to_string());
    (username, password)
}

async fn login(user: &mut GooseUser) -> TransactionResult {
    let (username, password) = credentials();
    let payload = json!({ "username": username, "password": password });
    let goose = user.post_json("/login", &payload).await?;

    if let Ok(response) = goose.response {
        if let Ok(body) = response.json::<Value>().await {
            if let Some(token) = body.get("token").and_then(Value::as_str) {
                user.set_session_data(Session {
                    token: token.to_owned(),
                });
            }
        }
    }
    Ok(())
}

async fn authed_get(user: &mut GooseUser, path: &str) -> TransactionResult {
    let token = user
        .get_session_data::<Session>()
        .map(|session| session.token.clone());

    let mut request_builder = user.get_request_builder(&GooseMethod::Get, path)?;
    if let Some(token) = token {
        request_builder = request_builder.header("Authorization", format!("Bearer {token}"));
    }

    let goose_request = GooseRequest::builder()
        .method(GooseMethod::Get)
        .path(path)
        .set_request_builder(request_builder)
        .build();
    let _goose_metrics = user.request(goose_request).await?;
    Ok(())
}

async fn health_check(user: &mut GooseUser) -> TransactionResult {
    let _goose_metrics = user.get("/healthz").await?;
    Ok(())
}

async fn main_queue(user: &mut GooseUser) -> TransactionResult {
    authed_get(user, "/api/alerts").await
}

async fn my_queue(user: &mut GooseUser) -> TransactionResult {
    authed_get(user, "/api/investigation-alerts").await
}

async fn search_logs(user: &mut GooseUser) -> TransactionResult {
    authed_get(user, "/api/logs?page=1&limit=25").await
}

#[tokio::main]
async fn main() -> Result<(), GooseError> {
    let (username, _) = credentials();
    println!("Analyst account for API calls: {username} (override with RANGE_USER/RANGE_PASSWORD)");

    GooseAttack::initialize()?
        .register_scenario(
            scenario!("HealthCheck").register_transaction(transaction!(health_check)),
        )
        .register_scenario(
            scenario!("AnalystReads")
                .register_transaction(transaction!(login).set_on_start())
                .register_transaction(transaction!(main_queue))
                .register_transaction(transaction!(my_queue))
                .register_transaction(transaction!(search_logs)),
        )
        .execute()
        .await?;

    Ok(())
}
