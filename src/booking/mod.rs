//! Meeting booking core: the business calendar, the reservation store
//! boundary, availability resolution and the booking write path.

pub mod calendar;
pub mod clock;
pub mod error;
pub mod handler;
pub mod models;
pub mod resolver;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{BookingError, BookingErrorKind};
pub use handler::BookingHandler;
pub use models::{Confirmation, TimeSlot};
pub use resolver::AvailabilityResolver;
pub use store::{InMemoryReservationStore, ReservationStore, StoreError};
