use serde::Serialize;
use time::{Date, Time};
use uuid::Uuid;

use super::calendar::{
    format_date, format_time_of_day, BUSINESS_TIMEZONE_LABEL, MEETING_DURATION_MINUTES,
};
use crate::db::models::{Reservation, Service};

/// One rung of the day's slot ladder and whether it is still free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub date: Date,
    pub start_time: Time,
    pub available: bool,
}

/// What the visitor sees after a successful booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub id: Uuid,
    pub date: String,
    pub time: String,
    pub timezone: &'static str,
    pub duration_minutes: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub service: Service,
    pub message: Option<String>,
}

impl From<Reservation> for Confirmation {
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
            created_at: _,
        } = value;
        Self {
            id,
            date: format_date(meeting_date),
            time: format_time_of_day(start_time),
            timezone: BUSINESS_TIMEZONE_LABEL,
            duration_minutes: MEETING_DURATION_MINUTES,
            name: contact_name,
            email: contact_email,
            phone: contact_phone,
            company,
            service,
            message,
        }
    }
}
