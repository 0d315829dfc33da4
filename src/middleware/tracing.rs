use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use opentelemetry::{
    global,
    trace::{Span, SpanKind, Status, Tracer},
    KeyValue,
};
use std::time::Instant;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::app_state::AppState;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

const MAX_REQUEST_ID_LEN: usize = 128;

/// Wraps every request in an `http_request` span, tags the response with an
/// `x-request-id` and counts the request by route and status.
pub async fn observability_middleware(
    State(state): State<AppState>,
    matched_path: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let start_time = Instant::now();

    // Unmatched requests share one label to keep cardinality bounded
    let route = matched_path
        .as_ref()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let request_id = request_id(request.headers());

    let tracer = global::tracer("agency-booking");
    let mut span = tracer
        .span_builder(format!("{} {}", method, route))
        .with_kind(SpanKind::Server)
        .with_attributes(vec![
            KeyValue::new("http.method", method.clone()),
            KeyValue::new("http.route", route.clone()),
            KeyValue::new("request.id", request_id.clone()),
        ])
        .start(&tracer);

    let tracing_span = info_span!(
        "http_request",
        method = %method,
        route = %route,
        request_id = %request_id,
    );

    let mut response = next.run(request).instrument(tracing_span).await;

    let elapsed = start_time.elapsed();
    let status_code = response.status().as_u16();

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
    }

    span.set_attribute(KeyValue::new("http.status_code", i64::from(status_code)));
    if response.status().is_server_error() {
        span.set_status(Status::Error {
            description: format!("HTTP {}", status_code).into(),
        });
    } else {
        span.set_status(Status::Ok);
    }
    span.end();

    state
        .metrics
        .observe_request(&method, &route, status_code, elapsed.as_secs_f64());

    response
}

/// Reuses a caller supplied id so a booking can be followed across the
/// frontend and this service. Anything unusable is replaced by a UUIDv7.
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::now_v7().to_string())
}
