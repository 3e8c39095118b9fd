use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::ServerState;

const DEBOUNCE: Duration = Duration::from_millis(50);

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    server::router(ServerState::new(engine, DEBOUNCE))
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec(), content_type)
}

async fn json_call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, bytes, _) = call(app, method, uri, token, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn sign_up(app: &Router, email: &str) -> String {
    let (status, body) = json_call(
        app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({ "email": email, "password": "segredo" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = app().await;

    let (status, body) = json_call(&app, "GET", "/sessions", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = json_call(&app, "GET", "/sessions", Some("forged"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn auth_flow() {
    let app = app().await;
    let token = sign_up(&app, "ana@example.com").await;

    let (status, body) = json_call(&app, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ana@example.com");

    let (status, _) = json_call(
        &app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({ "email": "ANA@example.com", "password": "outrasenha" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = json_call(
        &app,
        "POST",
        "/auth/signin",
        None,
        Some(json!({ "email": "ana@example.com", "password": "errada" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = json_call(&app, "POST", "/auth/signout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = json_call(&app, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = json_call(
        &app,
        "POST",
        "/auth/signin",
        None,
        Some(json!({ "email": "ana@example.com", "password": "segredo" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn session_lifecycle() {
    let app = app().await;
    let token = sign_up(&app, "ana@example.com").await;

    let (status, session) = json_call(
        &app,
        "POST",
        "/sessions",
        Some(&token),
        Some(json!({ "title": "Mercado", "split_count": "0" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(session["split_count"], 2);
    let id = session["id"].as_str().unwrap().to_string();

    let (status, change) = json_call(
        &app,
        "POST",
        &format!("/sessions/{id}/items"),
        Some(&token),
        Some(json!({ "name": "Arroz", "price_minor": "1000", "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(change["totals"]["shared_minor"], 2000);

    let (_, change) = json_call(
        &app,
        "POST",
        &format!("/sessions/{id}/items"),
        Some(&token),
        Some(json!({ "name": "Café", "price_minor": 500, "is_personal": true })),
    )
    .await;
    assert_eq!(change["totals"]["friend_share_minor"], 1000);
    assert_eq!(change["totals"]["user_total_minor"], 1500);

    let (status, stats) = json_call(
        &app,
        "GET",
        &format!("/stats?open_session={id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_shared_minor"], 2000);
    assert_eq!(stats["total_personal_minor"], 500);
    assert_eq!(stats["total_gained_minor"], 1000);

    let (status, csv, content_type) = call(
        &app,
        "GET",
        &format!("/sessions/{id}/report?format=csv"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/csv"));
    assert!(String::from_utf8(csv).unwrap().contains("Arroz,2,10.00,20.00,compartilhado"));

    let (status, session) = json_call(
        &app,
        "POST",
        &format!("/sessions/{id}/finalize"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["is_finalized"], true);

    let (status, _) = json_call(
        &app,
        "POST",
        &format!("/sessions/{id}/items"),
        Some(&token),
        Some(json!({ "name": "Pão", "price_minor": 300 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = json_call(
        &app,
        "PATCH",
        &format!("/sessions/{id}"),
        Some(&token),
        Some(json!({ "is_finalized": false })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = json_call(&app, "DELETE", &format!("/sessions/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = json_call(&app, "GET", &format!("/sessions/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn item_changes_persist_totals_after_debounce() {
    let app = app().await;
    let token = sign_up(&app, "ana@example.com").await;
    let (_, session) = json_call(
        &app,
        "POST",
        "/sessions",
        Some(&token),
        Some(json!({ "title": "Feira" })),
    )
    .await;
    let id = session["id"].as_str().unwrap().to_string();

    json_call(
        &app,
        "POST",
        &format!("/sessions/{id}/items"),
        Some(&token),
        Some(json!({ "name": "Banana", "price_minor": 700, "quantity": 3 })),
    )
    .await;

    tokio::time::sleep(DEBOUNCE * 6).await;

    let (status, detail) = json_call(&app, "GET", &format!("/sessions/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["session"]["total_shared_minor"], 2100);
    assert_eq!(detail["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn bills_endpoints() {
    let app = app().await;
    let token = sign_up(&app, "ana@example.com").await;

    let (status, bill) = json_call(
        &app,
        "POST",
        "/bills",
        Some(&token),
        Some(json!({
            "title": "Aluguel",
            "amount_minor": "9000",
            "split_count": 3,
            "month_year": "10/2026"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(bill["due_day"], 10);
    assert_eq!(bill["user_part_minor"], 3000);
    let id = bill["id"].as_str().unwrap().to_string();

    let (status, bills) =
        json_call(&app, "GET", "/bills?month_year=10/2026", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bills.as_array().unwrap().len(), 1);
    let (_, bills) = json_call(&app, "GET", "/bills?month_year=11/2026", Some(&token), None).await;
    assert!(bills.as_array().unwrap().is_empty());

    let (status, bill) = json_call(
        &app,
        "PATCH",
        &format!("/bills/{id}"),
        Some(&token),
        Some(json!({ "is_paid": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bill["is_paid"], true);

    let (status, _) = json_call(&app, "GET", "/bills?month_year=13/2026", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = json_call(&app, "DELETE", &format!("/bills/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn dashboard_and_analytics() {
    let app = app().await;
    let token = sign_up(&app, "ana@example.com").await;
    json_call(
        &app,
        "POST",
        "/bills",
        Some(&token),
        Some(json!({ "title": "Internet", "amount_minor": 10000 })),
    )
    .await;

    let (status, dashboard) = json_call(&app, "GET", "/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["pending_bills"].as_array().unwrap().len(), 1);
    assert_eq!(dashboard["stats"]["unpaid_user_part_minor"], 5000);
    assert!(dashboard["open_session"].is_null());

    let (status, analytics) = json_call(&app, "GET", "/analytics", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(analytics["bills_total_minor"], 10000);
    assert_eq!(analytics["session_count"], 0);
}

#[tokio::test]
async fn missing_schema_is_reported_as_unavailable() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let app = server::router(ServerState::new(engine, DEBOUNCE));

    let (status, body) = json_call(
        &app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({ "email": "ana@example.com", "password": "segredo" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "store not configured");
}

#[tokio::test]
async fn monthly_report_lists_sessions_and_bills() {
    let app = app().await;
    let token = sign_up(&app, "ana@example.com").await;
    let (status, _) = json_call(
        &app,
        "POST",
        "/sessions",
        Some(&token),
        Some(json!({ "title": "Feira" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, bill) = json_call(
        &app,
        "POST",
        "/bills",
        Some(&token),
        Some(json!({ "title": "Internet", "amount_minor": "89,90" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(bill["amount_minor"], 8990);

    let (status, text, content_type) =
        call(&app, "GET", "/reports/monthly", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
    let text = String::from_utf8(text).unwrap();
    assert!(text.starts_with("Relatório de Despesas - "));
    assert!(text.contains("| Feira |"));
    assert!(text.contains("Internet | Valor R$ 89,90"));

    let (status, csv, content_type) =
        call(&app, "GET", "/reports/monthly?format=csv", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/csv"));
    let csv = String::from_utf8(csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "tipo,data,descricao,total,compartilhado,pessoal,pessoas,minha_parte,status"
    );
    assert!(lines[1].starts_with("sessao,"));
    assert_eq!(lines[2], "conta,,Internet,89.90,,,2,44.95,Em aberto");

    let (status, csv, _) = call(
        &app,
        "GET",
        "/reports/monthly?month_year=1/2020&format=csv",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(csv).unwrap().lines().count(), 1);

    let (status, _) =
        json_call(&app, "GET", "/reports/monthly?month_year=13/2026", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
