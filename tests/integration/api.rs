// tests/integration/api.rs

use std::sync::Arc;

use axum_test::TestServer;
use fundtrack_backend::config::AppConfig;
use fundtrack_backend::models::SeedEntry;
use fundtrack_backend::tracker_service::TrackerService;
use fundtrack_backend::web;

fn seed(name: &str, url: &str) -> SeedEntry {
    SeedEntry {
        name: name.to_string(),
        url: url.to_string(),
    }
}

fn test_server(seeds: Vec<SeedEntry>) -> TestServer {
    let service = Arc::new(TrackerService::new(AppConfig::default(), seeds).unwrap());
    TestServer::new(web::create_router(service)).unwrap()
}

#[tokio::test]
async fn test_list_organizations() {
    let server = test_server(vec![seed("A", "https://host/organization/a-b")]);

    let response = server.get("/api/organizations").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    let record = &body["a-b"];
    assert_eq!(record["id"], "a-b");
    assert_eq!(record["name"], "A");
    assert_eq!(record["total"], 0.0);
    assert_eq!(record["donors"], 0);
    assert!(record["error"].is_null());
    assert!(record["lastUpdated"].is_null());
}

#[tokio::test]
async fn test_refresh_unknown_organization_is_404() {
    let server = test_server(vec![seed("A", "https://host/organization/a")]);

    let response = server.put("/api/organizations/nope/refresh").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);

    let body: serde_json::Value = response.json();
    assert_eq!(body["id"], "nope");
    assert!(body["error"].is_string());
}

// Адрес в зоне .invalid не резолвится: fetch гарантированно падает
// без обращения к внешней сети
#[tokio::test]
async fn test_refresh_fetch_failure_returns_502_with_error_record() {
    let config = AppConfig {
        request_timeout_secs: 2,
        max_fetch_attempts: 1,
        batch_delay_ms: 1,
        ..AppConfig::default()
    };
    let service = Arc::new(
        TrackerService::new(
            config,
            vec![seed("X", "https://fundtrack.invalid/organization/x")],
        )
        .unwrap(),
    );
    let server = TestServer::new(web::create_router(service)).unwrap();

    let response = server.put("/api/organizations/x/refresh").await;
    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);

    let record: serde_json::Value = response.json();
    assert_eq!(record["id"], "x");
    assert!(record["error"].is_string());
    assert!(record["lastUpdated"].is_string());
    // числовые поля не тронуты неудачным обновлением
    assert_eq!(record["total"], 0.0);
    assert_eq!(record["donors"], 0);
    assert_eq!(record["goal"], 0.0);
}

#[tokio::test]
async fn test_summary_never_divides_by_zero() {
    let server = test_server(vec![
        seed("A", "https://host/organization/a"),
        seed("B", "https://host/organization/b"),
    ]);

    let response = server.get("/api/summary").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["organizationCount"], 2);
    assert_eq!(body["totalDonors"], 0);
    assert_eq!(body["averageGift"], 0.0);
    assert!(body["lastUpdated"].is_null());
}

#[tokio::test]
async fn test_csv_export_escapes_quotes() {
    let server = test_server(vec![seed("Test \"Org\"", "https://host/organization/t")]);

    let response = server.get("/api/export.csv").await;
    response.assert_status_ok();
    let content_type = response.header("content-type");
    assert!(content_type.to_str().unwrap().starts_with("text/csv"));

    let body = response.text();
    let mut lines = body.lines();
    assert_eq!(
        lines.next().unwrap(),
        r#""id","name","url","total","donors","goal","lastUpdated","error""#
    );
    assert!(lines.next().unwrap().contains(r#""Test ""Org""""#));
}

#[tokio::test]
async fn test_health() {
    let server = test_server(vec![seed("A", "https://host/organization/a")]);

    let response = server.get("/api/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["organizations"], 1);
}
