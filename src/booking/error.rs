use serde::Serialize;
use thiserror::Error;

use super::store::StoreError;

/// Outcome of a booking attempt that did not produce a meeting.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Invalid slot: {0}")]
    InvalidSlot(String),

    #[error("Invalid {field}: {reason}")]
    InvalidContact { field: String, reason: String },

    #[error("Slot {date} {time} has just been booked")]
    SlotTaken { date: String, time: String },

    #[error("Temporary failure: {0}")]
    TransientFailure(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BookingErrorKind {
    InvalidSlot,
    InvalidContact,
    SlotTaken,
    TransientFailure,
}

impl BookingError {
    pub fn kind(&self) -> BookingErrorKind {
        match self {
            BookingError::InvalidSlot(_) => BookingErrorKind::InvalidSlot,
            BookingError::InvalidContact { .. } => BookingErrorKind::InvalidContact,
            BookingError::SlotTaken { .. } => BookingErrorKind::SlotTaken,
            BookingError::TransientFailure(_) => BookingErrorKind::TransientFailure,
        }
    }

    /// Message meant for the visitor.
    pub fn user_message(&self) -> String {
        match self {
            BookingError::InvalidSlot(_) => {
                "That date or time cannot be booked. Please pick one of the offered slots.".to_string()
            }
            BookingError::InvalidContact { reason, .. } => reason.clone(),
            BookingError::SlotTaken { .. } => {
                "That time was just booked. Please pick another.".to_string()
            }
            BookingError::TransientFailure(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { date, start_time } => BookingError::SlotTaken {
                date: super::calendar::format_date(date),
                time: super::calendar::format_time_of_day(start_time),
            },
            StoreError::Storage(details) => BookingError::TransientFailure(details),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    #[test]
    fn store_conflict_becomes_slot_taken() {
        let err = BookingError::from(StoreError::Conflict {
            date: date!(2024 - 06 - 10),
            start_time: time!(09:30),
        });
        assert_eq!(err.kind(), BookingErrorKind::SlotTaken);
        assert_eq!(err.to_string(), "Slot 2024-06-10 09:30 has just been booked");
    }

    #[test]
    fn storage_failure_becomes_transient() {
        let err = BookingError::from(StoreError::Storage("connection reset".to_string()));
        assert_eq!(err.kind(), BookingErrorKind::TransientFailure);
        assert_ne!(err.user_message(), BookingError::SlotTaken {
            date: String::new(),
            time: String::new(),
        }
        .user_message());
    }
}
