use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    app_state::AppState,
    middleware::{observability_middleware, require_admin_token},
    modules::{admin::routes::admin_routes, booking::routes::booking_routes},
};

pub fn create_router(state: AppState) -> Router {
    let mut api = Router::new().nest("/meetings", booking_routes());

    if state.env.admin.api_token.is_some() {
        api = api.nest(
            "/admin",
            admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_admin_token,
            )),
        );
    } else {
        tracing::info!("ADMIN_API_TOKEN not set, admin routes are disabled");
    }

    let cors = cors_layer(&state);

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_export))
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            observability_middleware,
        ))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .env
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if !origins.is_empty() {
        layer.allow_origin(origins)
    } else if state.env.is_development() {
        layer.allow_origin(Any)
    } else {
        layer
    }
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let (status, store_status) = match state.store.health_check().await {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(e) => {
            tracing::warn!("Reservation store health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
    };

    let body = Json(json!({
        "status": if status.is_success() { "ok" } else { "degraded" },
        "timestamp": OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "reservation_store": store_status,
        }
    }));

    (status, body)
}

async fn metrics_export(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.export_prometheus() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
