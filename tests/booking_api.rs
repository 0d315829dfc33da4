use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use secrecy::SecretBox;
use serde_json::{json, Value};
use time::{macros::datetime, Date, Time};
use tower::ServiceExt;
use uuid::Uuid;

use agency_booking::{
    app::create_router,
    app_state::AppState,
    booking::{FixedClock, InMemoryReservationStore, ReservationStore, StoreError},
    config::{AdminConfig, AppConfig, Config, CorsConfig, Environment, ServerConfig},
    db::models::{NewReservation, Reservation},
    metrics::Metrics,
};

const ADMIN_TOKEN: &str = "test-admin-token";

fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
        },
        database: None,
        app: AppConfig {
            name: "Agency Booking".to_string(),
            environment: Environment::Development,
        },
        admin: AdminConfig {
            api_token: Some(Arc::new(SecretBox::new(Box::new(ADMIN_TOKEN.to_string())))),
        },
        cors: CorsConfig::default(),
    }
}

/// Router over an empty in-memory store, with "now" pinned to Monday
/// 2024-06-10 09:00 in Dubai.
fn test_app() -> Router {
    app_with_store(Arc::new(InMemoryReservationStore::new()))
}

fn app_with_store(store: Arc<dyn ReservationStore>) -> Router {
    let clock = Arc::new(FixedClock::new(datetime!(2024-06-10 05:00 UTC)));
    let metrics = Arc::new(Metrics::new().unwrap());
    let state = AppState::new(test_config(), store, clock, metrics);
    create_router(state)
}

/// A store whose backend is unreachable.
struct OfflineStore;

#[async_trait]
impl ReservationStore for OfflineStore {
    async fn list_reservations(&self, _date: Date) -> Result<HashSet<Time>, StoreError> {
        Err(StoreError::Storage("connection refused".to_string()))
    }

    async fn insert_if_absent(&self, _reservation: NewReservation) -> Result<Reservation, StoreError> {
        Err(StoreError::Storage("connection refused".to_string()))
    }

    async fn list_all(&self) -> Result<Vec<Reservation>, StoreError> {
        Err(StoreError::Storage("connection refused".to_string()))
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Reservation>, StoreError> {
        Err(StoreError::Storage("connection refused".to_string()))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Err(StoreError::Storage("connection refused".to_string()))
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn availability(app: &Router, date: &str) -> (StatusCode, Value) {
    let request = Request::get(format!("/api/meetings/availability?date={date}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn book(app: &Router, payload: Value) -> (StatusCode, Value) {
    post_raw(app, "application/json", payload.to_string()).await
}

async fn post_raw(app: &Router, content_type: &str, body: String) -> (StatusCode, Value) {
    let request = Request::post("/api/meetings")
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

fn booking_payload(date: &str, time: &str) -> Value {
    json!({
        "date": date,
        "time": time,
        "name": "Mariam Saleh",
        "email": "mariam@example.com",
        "phone": "+971 55 123 4567",
        "company": "Saleh Interiors",
        "service": "SEO & Content Marketing",
        "message": "Looking to grow organic traffic"
    })
}

fn unavailable_times(body: &Value) -> Vec<String> {
    body["timeSlots"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|slot| slot["available"] == json!(false))
        .map(|slot| slot["time"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn monday_offers_sixteen_open_slots() {
    let app = test_app();
    let (status, body) = availability(&app, "2024-06-10").await;

    assert_eq!(status, StatusCode::OK);
    let slots = body["timeSlots"].as_array().unwrap();
    assert_eq!(slots.len(), 16);
    assert_eq!(slots[0], json!({ "time": "09:00", "available": true }));
    assert_eq!(slots[1]["time"], "09:30");
    assert_eq!(slots[15]["time"], "16:30");
    assert!(unavailable_times(&body).is_empty());
    assert_eq!(body["timezone"], "Dubai time (GMT+4)");
}

#[tokio::test]
async fn saturday_and_past_dates_have_no_slots() {
    let app = test_app();

    let (status, body) = availability(&app, "2024-06-08").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timeSlots"], json!([]));

    let (status, body) = availability(&app, "2024-06-07").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timeSlots"], json!([]));
}

#[tokio::test]
async fn malformed_date_is_invalid_slot() {
    let app = test_app();
    let (status, body) = availability(&app, "June-10").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "InvalidSlot");
}

#[tokio::test]
async fn booking_marks_only_that_slot_unavailable() {
    let app = test_app();

    let (status, body) = book(&app, booking_payload("2024-06-10", "09:30")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["meeting"]["date"], "2024-06-10");
    assert_eq!(body["meeting"]["time"], "09:30");
    assert_eq!(body["meeting"]["service"], "SEO & Content Marketing");
    assert_eq!(body["meeting"]["durationMinutes"], 30);

    let (_, body) = availability(&app, "2024-06-10").await;
    assert_eq!(body["timeSlots"].as_array().unwrap().len(), 16);
    assert_eq!(unavailable_times(&body), vec!["09:30".to_string()]);
}

#[tokio::test]
async fn second_booking_of_a_slot_is_slot_taken() {
    let app = test_app();

    let (status, _) = book(&app, booking_payload("2024-06-11", "14:00")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = book(&app, booking_payload("2024-06-11", "14:00")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "SlotTaken");
    assert_eq!(
        body["error"]["message"],
        "That time was just booked. Please pick another."
    );
}

#[tokio::test]
async fn concurrent_requests_for_one_slot_confirm_once() {
    let app = test_app();

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { book(&app, booking_payload("2024-06-12", "11:00")).await })
        })
        .collect();

    let mut statuses = Vec::new();
    for attempt in attempts {
        statuses.push(attempt.await.unwrap().0);
    }

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count(), 7);

    let (_, body) = availability(&app, "2024-06-12").await;
    assert_eq!(unavailable_times(&body), vec!["11:00".to_string()]);
}

#[tokio::test]
async fn invalid_contact_is_rejected_without_writing() {
    let app = test_app();

    let mut payload = booking_payload("2024-06-13", "10:00");
    payload["email"] = json!("mariam-at-example");
    let (status, body) = book(&app, payload).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["kind"], "InvalidContact");
    assert_eq!(body["error"]["field"], "email");

    let mut payload = booking_payload("2024-06-13", "10:00");
    payload["name"] = json!("");
    let (status, body) = book(&app, payload).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["field"], "name");

    let (_, body) = availability(&app, "2024-06-13").await;
    assert!(unavailable_times(&body).is_empty());
}

#[tokio::test]
async fn off_ladder_and_weekend_bookings_are_invalid_slots() {
    let app = test_app();

    for (date, time) in [
        ("2024-06-10", "10:15"),
        ("2024-06-10", "17:00"),
        ("2024-06-15", "10:00"),
        ("2024-06-10", "ten o'clock"),
    ] {
        let (status, body) = book(&app, booking_payload(date, time)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{date} {time}");
        assert_eq!(body["error"]["kind"], "InvalidSlot");
    }
}

#[tokio::test]
async fn admin_routes_require_the_token() {
    let app = test_app();
    let (_, created) = book(&app, booking_payload("2024-06-14", "16:30")).await;
    let meeting_id = created["meeting"]["id"].as_str().unwrap().to_string();

    let request = Request::get("/api/admin/meetings").body(Body::empty()).unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::get("/api/admin/meetings")
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["time"], "16:30");

    let request = Request::get(format!("/api/admin/meetings/{meeting_id}"))
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "mariam@example.com");

    let request = Request::get(format!("/api/admin/meetings/{}", uuid::Uuid::new_v4()))
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_store_status() {
    let app = test_app();
    let request = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["services"]["reservation_store"], "healthy");
}

#[tokio::test]
async fn health_is_unavailable_when_the_store_is_down() {
    let app = app_with_store(Arc::new(OfflineStore));
    let request = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["reservation_store"], "unhealthy");
}

#[tokio::test]
async fn storage_outage_is_a_transient_failure() {
    let app = app_with_store(Arc::new(OfflineStore));

    let (status, body) = availability(&app, "2024-06-10").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["kind"], "TransientFailure");

    let (status, body) = book(&app, booking_payload("2024-06-10", "10:00")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["kind"], "TransientFailure");
    assert_eq!(body["error"]["message"], "Something went wrong. Please try again.");
}

#[tokio::test]
async fn wrongly_typed_field_is_invalid_contact_on_that_field() {
    let app = test_app();

    let mut payload = booking_payload("2024-06-10", "10:00");
    payload["phone"] = json!(971551234567_u64);
    let (status, body) = book(&app, payload).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["kind"], "InvalidContact");
    assert_eq!(body["error"]["field"], "phone");

    let mut payload = booking_payload("2024-06-10", "10:00");
    payload["time"] = json!(1000);
    let (status, body) = book(&app, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "InvalidSlot");

    let (_, body) = availability(&app, "2024-06-10").await;
    assert!(unavailable_times(&body).is_empty());
}

#[tokio::test]
async fn unreadable_bodies_get_a_structured_error() {
    let app = test_app();

    for (content_type, body) in [
        ("application/json", "{not json".to_string()),
        ("application/json", String::new()),
        ("text/plain", booking_payload("2024-06-10", "10:00").to_string()),
    ] {
        let (status, body) = post_raw(&app, content_type, body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{content_type}");
        assert_eq!(body["error"]["kind"], "InvalidContact");
        assert_eq!(body["error"]["field"], "body");
    }
}

#[tokio::test]
async fn repeated_date_parameter_is_invalid_slot() {
    let app = test_app();
    let (status, body) = availability(&app, "2024-06-10&date=2024-06-11").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "InvalidSlot");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = test_app();

    let request = Request::get("/api/meetings/availability?date=2024-06-10")
        .header("x-request-id", "form-submit-7")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "form-submit-7");

    let request = Request::get("/api/meetings/availability?date=2024-06-08")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert!(Uuid::parse_str(generated).is_ok());
}

#[tokio::test]
async fn metrics_count_requests_and_booking_outcomes() {
    let app = test_app();
    book(&app, booking_payload("2024-06-10", "12:00")).await;
    book(&app, booking_payload("2024-06-10", "12:00")).await;
    availability(&app, "2024-06-10").await;

    let request = Request::get("/metrics").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains(r#"booking_attempts_total{outcome="confirmed"} 1"#));
    assert!(text.contains(r#"booking_attempts_total{outcome="slot_taken"} 1"#));
    assert!(text.lines().any(|line| {
        line.starts_with(r#"http_requests_total{method="POST",route="/api/meetings"#)
            && line.ends_with(r#"status_code="409"} 1"#)
    }));
    assert!(text.contains(
        r#"http_requests_total{method="GET",route="/api/meetings/availability",status_code="200"} 1"#
    ));
}
