use axum::{routing::get, Router};

use super::handlers::{list_meetings, show_meeting};
use crate::app_state::AppState;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/meetings", get(list_meetings))
        .route("/meetings/:meeting_id", get(show_meeting))
}
