use std::sync::Arc;

use crate::booking::{AvailabilityResolver, BookingHandler, Clock, ReservationStore};
use crate::config;
use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub env: config::Config,
    pub store: Arc<dyn ReservationStore>,
    pub metrics: Arc<Metrics>,
    pub availability: AvailabilityResolver,
    pub bookings: BookingHandler,
}

impl AppState {
    pub fn new(
        env: config::Config,
        store: Arc<dyn ReservationStore>,
        clock: Arc<dyn Clock>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let availability = AvailabilityResolver::new(Arc::clone(&store), Arc::clone(&clock));
        let bookings = BookingHandler::new(Arc::clone(&store), clock, Arc::clone(&metrics));
        Self {
            env,
            store,
            metrics,
            availability,
            bookings,
        }
    }
}
