use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::booking::calendar::{format_date, format_time_of_day};
use crate::db::models::{Reservation, Service};
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingsResponse {
    pub items: Vec<MeetingResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingResponse {
    pub id: Uuid,
    pub date: String,
    pub time: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub service: Service,
    pub message: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Reservation> for MeetingResponse {
    fn from(value: Reservation) -> Self {
        let Reservation {
            id,
            meeting_date,
            start_time,
            contact_name,
            contact_email,
            contact_phone,
            company,
            service,
            message,
            created_at,
        } = value;
        Self {
            id,
            date: format_date(meeting_date),
            time: format_time_of_day(start_time),
            name: contact_name,
            email: contact_email,
            phone: contact_phone,
            company,
            service,
            message,
            created_at,
        }
    }
}

pub async fn list_meetings(State(state): State<AppState>) -> AppResult<Json<MeetingsResponse>> {
    let items = state
        .store
        .list_all()
        .await?
        .into_iter()
        .map(MeetingResponse::from)
        .collect();

    Ok(Json(MeetingsResponse { items }))
}

pub async fn show_meeting(
    State(state): State<AppState>,
    Path(meeting_id): Path<Uuid>,
) -> AppResult<Json<MeetingResponse>> {
    state
        .store
        .find_by_id(meeting_id)
        .await?
        .map(|reservation| Json(MeetingResponse::from(reservation)))
        .ok_or_else(|| AppError::NotFound(format!("Meeting {} not found", meeting_id)))
}
