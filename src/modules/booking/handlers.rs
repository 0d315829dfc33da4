use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use super::extract::{BookingJson, BookingQuery};
use crate::app_state::AppState;
use crate::booking::calendar::{
    format_date, format_time_of_day, parse_date, parse_time_of_day, BUSINESS_TIMEZONE_LABEL,
};
use crate::booking::{BookingError, Confirmation, TimeSlot};
use crate::db::models::ContactFields;
use crate::error::AppResult;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AvailabilityQuery {
    pub date: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TimeSlotResponse {
    pub time: String,
    pub available: bool,
}

impl From<TimeSlot> for TimeSlotResponse {
    fn from(value: TimeSlot) -> Self {
        Self {
            time: format_time_of_day(value.start_time),
            available: value.available,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub date: String,
    pub timezone: &'static str,
    pub time_slots: Vec<TimeSlotResponse>,
    pub message: &'static str,
}

/// Booking form payload. Every field defaults so that missing values reach
/// validation and come back as a field-level error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateMeetingRequest {
    pub date: String,
    pub time: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub service: String,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateMeetingResponse {
    pub meeting: Confirmation,
    pub message: &'static str,
}

pub async fn check_availability(
    State(state): State<AppState>,
    BookingQuery(query): BookingQuery<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let date = parse_date(&query.date).map_err(|_| {
        BookingError::InvalidSlot(format!("'{}' is not a YYYY-MM-DD date", query.date))
    })?;

    let slots = state.availability.get_available_slots(date).await?;
    let message = if slots.is_empty() {
        "No slots available on this date"
    } else {
        "Successfully fetched time slots"
    };

    Ok(Json(AvailabilityResponse {
        date: format_date(date),
        timezone: BUSINESS_TIMEZONE_LABEL,
        time_slots: slots.into_iter().map(TimeSlotResponse::from).collect(),
        message,
    }))
}

pub async fn create_meeting(
    State(state): State<AppState>,
    BookingJson(req): BookingJson<CreateMeetingRequest>,
) -> AppResult<(StatusCode, Json<CreateMeetingResponse>)> {
    let CreateMeetingRequest {
        date,
        time,
        name,
        email,
        phone,
        company,
        service,
        message,
    } = req;

    let date = parse_date(&date)
        .map_err(|_| BookingError::InvalidSlot(format!("'{}' is not a YYYY-MM-DD date", date)))?;
    let start_time = parse_time_of_day(&time)
        .map_err(|_| BookingError::InvalidSlot(format!("'{}' is not an HH:mm time", time)))?;

    let contact = ContactFields {
        name,
        email,
        phone,
        company,
        service,
        message,
    };

    let meeting = state.bookings.submit_booking(date, start_time, contact).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateMeetingResponse {
            meeting,
            message: "Meeting scheduled successfully",
        }),
    ))
}
