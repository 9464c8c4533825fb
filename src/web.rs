// src/web.rs

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::tracker_service::{TrackerError, TrackerService};

/// Состояние приложения
pub type AppState = Arc<TrackerService>;

async fn list_organizations(State(service): State<AppState>) -> impl IntoResponse {
    Json(service.organizations().await)
}

async fn refresh_organization(
    Path(id): Path<String>,
    State(service): State<AppState>,
) -> impl IntoResponse {
    match service.refresh_one(&id).await {
        // Неудачный fetch приходит как запись с заполненным error
        Ok(record) if record.error.is_some() => {
            (StatusCode::BAD_GATEWAY, Json(record)).into_response()
        }
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(TrackerError::NotFound(id)) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "Organization not found",
                "id": id
            })),
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "Internal error"
            })),
        )
            .into_response(),
    }
}

async fn refresh_all_organizations(State(service): State<AppState>) -> impl IntoResponse {
    let outcome = service.refresh_all().await;
    Json(serde_json::json!({
        "message": format!("Refreshed {} organizations", outcome.summary.total),
        "results": outcome.results,
        "data": outcome.data,
        "summary": outcome.summary,
    }))
}

async fn summary(State(service): State<AppState>) -> impl IntoResponse {
    Json(service.summary().await)
}

async fn export_csv(State(service): State<AppState>) -> impl IntoResponse {
    match service.export_csv().await {
        Ok(body) => ([(header::CONTENT_TYPE, "text/csv")], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "выгрузка CSV не удалась");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "CSV export failed"
                })),
            )
                .into_response()
        }
    }
}

async fn health(State(service): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "organizations": service.organizations().await.len(),
        "timestamp": chrono::Utc::now(),
    }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let list: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(AllowOrigin::list(list))
    }
}

pub fn create_router(service: AppState) -> Router {
    let cors = cors_layer(&service.config.allowed_origins);

    Router::new()
        .route("/api/organizations", get(list_organizations))
        .route("/api/organizations/refresh", put(refresh_all_organizations))
        .route("/api/organizations/:id/refresh", put(refresh_organization))
        .route("/api/summary", get(summary))
        .route("/api/export.csv", get(export_csv))
        .route("/api/health", get(health))
        .with_state(service)
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

pub async fn run_web_server(
    service: AppState,
    addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(service);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("🌐 Web API запущен на http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
