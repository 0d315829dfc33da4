use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{check_availability, create_meeting};
use crate::app_state::AppState;

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_meeting))
        .route("/availability", get(check_availability))
}
