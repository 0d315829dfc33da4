use std::sync::Arc;

use time::{Date, Time};
use tracing::{info, instrument, warn};
use validator::{Validate, ValidationErrors};

use super::calendar::{is_candidate_slot, is_workable_date, today_in_business_timezone};
use super::clock::Clock;
use super::error::BookingError;
use super::models::Confirmation;
use super::store::ReservationStore;
use crate::db::models::{ContactFields, NewReservation, Service};
use crate::metrics::Metrics;

const UNKNOWN_SERVICE: &str = "Please choose one of the offered services";

/// The write path. The only place a reservation gets created.
///
/// Each attempt is validated and then tried as one conditional insert.
/// Nothing is retried here; the caller decides whether to ask again.
#[derive(Clone)]
pub struct BookingHandler {
    store: Arc<dyn ReservationStore>,
    clock: Arc<dyn Clock>,
    metrics: Arc<Metrics>,
}

impl BookingHandler {
    pub fn new(
        store: Arc<dyn ReservationStore>,
        clock: Arc<dyn Clock>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            clock,
            metrics,
        }
    }

    #[instrument(skip_all, fields(%date, %start_time))]
    pub async fn submit_booking(
        &self,
        date: Date,
        start_time: Time,
        contact: ContactFields,
    ) -> Result<Confirmation, BookingError> {
        let outcome = self.try_submit(date, start_time, contact).await;
        self.metrics.record_booking(outcome_label(&outcome));
        outcome
    }

    async fn try_submit(
        &self,
        date: Date,
        start_time: Time,
        contact: ContactFields,
    ) -> Result<Confirmation, BookingError> {
        self.check_slot(date, start_time)?;
        let new_reservation = validate_contact(date, start_time, contact)?;

        match self.store.insert_if_absent(new_reservation).await {
            Ok(reservation) => {
                info!(meeting_id = %reservation.id, "Meeting booked");
                Ok(Confirmation::from(reservation))
            }
            Err(err) => {
                let err = BookingError::from(err);
                warn!(error = %err, "Meeting could not be stored");
                Err(err)
            }
        }
    }

    fn check_slot(&self, date: Date, start_time: Time) -> Result<(), BookingError> {
        let today = today_in_business_timezone(self.clock.as_ref());
        if !is_workable_date(date, today) {
            return Err(BookingError::InvalidSlot(format!(
                "{date} is not a bookable weekday"
            )));
        }
        if !is_candidate_slot(date, start_time) {
            return Err(BookingError::InvalidSlot(format!(
                "{start_time} is not one of the offered start times"
            )));
        }
        Ok(())
    }
}

fn validate_contact(
    date: Date,
    start_time: Time,
    contact: ContactFields,
) -> Result<NewReservation, BookingError> {
    let contact = contact.normalized();
    contact.validate().map_err(first_contact_error)?;

    // Checked after the derived rules so the earlier form fields win.
    let service = contact
        .service
        .parse::<Service>()
        .map_err(|_| BookingError::InvalidContact {
            field: "service".to_string(),
            reason: UNKNOWN_SERVICE.to_string(),
        })?;

    Ok(NewReservation {
        meeting_date: date,
        start_time,
        contact_name: contact.name,
        contact_email: contact.email,
        contact_phone: contact.phone,
        company: contact.company,
        service,
        message: contact.message,
    })
}

/// Reports the first failing field in form order.
fn first_contact_error(errors: ValidationErrors) -> BookingError {
    let field_errors = errors.field_errors();
    for field in ContactFields::FIELD_ORDER {
        if let Some(error) = field_errors.get(field).and_then(|list| list.first()) {
            let reason = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            return BookingError::InvalidContact {
                field: field.to_string(),
                reason,
            };
        }
    }
    BookingError::InvalidContact {
        field: "contact".to_string(),
        reason: errors.to_string(),
    }
}

fn outcome_label(outcome: &Result<Confirmation, BookingError>) -> &'static str {
    match outcome {
        Ok(_) => "confirmed",
        Err(BookingError::InvalidSlot(_)) => "invalid_slot",
        Err(BookingError::InvalidContact { .. }) => "invalid_contact",
        Err(BookingError::SlotTaken { .. }) => "slot_taken",
        Err(BookingError::TransientFailure(_)) => "transient_failure",
    }
}
