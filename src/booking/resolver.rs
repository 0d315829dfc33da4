use std::sync::Arc;

use time::Date;
use tracing::debug;

use super::calendar::{candidate_slots_for_date, is_workable_date, today_in_business_timezone};
use super::clock::Clock;
use super::error::BookingError;
use super::models::TimeSlot;
use super::store::ReservationStore;

/// Answers "what can be picked on this date right now". Reads the store on
/// every call; nothing is cached between requests.
#[derive(Clone)]
pub struct AvailabilityResolver {
    store: Arc<dyn ReservationStore>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityResolver {
    pub fn new(store: Arc<dyn ReservationStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Every candidate slot for `date` in ascending order, booked ones
    /// included and marked unavailable. Non-workable dates yield nothing.
    pub async fn get_available_slots(&self, date: Date) -> Result<Vec<TimeSlot>, BookingError> {
        let today = today_in_business_timezone(self.clock.as_ref());
        if !is_workable_date(date, today) {
            debug!(%date, %today, "Date is not workable, no slots offered");
            return Ok(Vec::new());
        }

        let candidates = candidate_slots_for_date(date);
        let booked = self.store.list_reservations(date).await?;

        Ok(candidates
            .into_iter()
            .map(|start_time| TimeSlot {
                date,
                start_time,
                available: !booked.contains(&start_time),
            })
            .collect())
    }
}
