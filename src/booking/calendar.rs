//! Business calendar rules: which dates can take meetings and which start
//! times exist on a working day. Everything here is expressed in the
//! agency's fixed business timezone and never touches stored bookings.

use time::{
    format_description::BorrowedFormatItem, macros::format_description, macros::offset,
    macros::time, Date, Duration, Time, UtcOffset, Weekday,
};

use super::clock::Clock;

/// The agency works on Dubai time all year round.
pub const BUSINESS_OFFSET: UtcOffset = offset!(+4);

/// Human readable label sent along with every set of slots.
pub const BUSINESS_TIMEZONE_LABEL: &str = "Dubai time (GMT+4)";

pub const BUSINESS_OPEN: Time = time!(09:00);
pub const BUSINESS_CLOSE: Time = time!(17:00);

pub const SLOT_STEP_MINUTES: i64 = 30;

/// Every meeting occupies exactly one slot.
pub const MEETING_DURATION_MINUTES: i64 = SLOT_STEP_MINUTES;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

/// A calendar date together with whether meetings may be booked on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessDay {
    pub date: Date,
    pub is_workable: bool,
}

impl BusinessDay {
    pub fn new(date: Date, today: Date) -> Self {
        Self {
            date,
            is_workable: is_workable_date(date, today),
        }
    }
}

/// Current calendar date at the business offset.
pub fn today_in_business_timezone(clock: &dyn Clock) -> Date {
    clock.now_utc().to_offset(BUSINESS_OFFSET).date()
}

/// Monday to Friday, and not before `today`.
///
/// Granularity is the whole day: `today` stays workable even after some of
/// its slots have passed.
pub fn is_workable_date(date: Date, today: Date) -> bool {
    let is_weekday = !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday);
    is_weekday && date >= today
}

/// The fixed ladder of start times for any day, ascending.
pub fn candidate_slots_for_date(_date: Date) -> Vec<Time> {
    let step = Duration::minutes(SLOT_STEP_MINUTES);
    let mut slots = Vec::new();
    let mut current = BUSINESS_OPEN;
    while current < BUSINESS_CLOSE {
        slots.push(current);
        current += step;
    }
    slots
}

/// True when `start_time` is one of the generated slots for `date`.
pub fn is_candidate_slot(date: Date, start_time: Time) -> bool {
    candidate_slots_for_date(date).contains(&start_time)
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<Date, time::error::Parse> {
    Date::parse(value.trim(), DATE_FORMAT)
}

/// Parses a 24-hour `HH:mm` wall-clock time.
pub fn parse_time_of_day(value: &str) -> Result<Time, time::error::Parse> {
    Time::parse(value.trim(), TIME_FORMAT)
}

pub fn format_date(date: Date) -> String {
    // The format items only reference components a Date always has.
    date.format(DATE_FORMAT).unwrap_or_default()
}

pub fn format_time_of_day(value: Time) -> String {
    value.format(TIME_FORMAT).unwrap_or_default()
}
