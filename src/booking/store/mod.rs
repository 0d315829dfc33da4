//! Persistence boundary for confirmed meetings.
//!
//! Every implementation must make [`ReservationStore::insert_if_absent`] a
//! single atomic step: of any number of concurrent callers asking for the
//! same `(date, start_time)`, exactly one gets the row back and the rest see
//! [`StoreError::Conflict`].

mod memory;

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;
use time::{Date, Time};
use uuid::Uuid;

use crate::db::models::{NewReservation, Reservation};

pub use memory::InMemoryReservationStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("slot {date} {start_time} is already reserved")]
    Conflict { date: Date, start_time: Time },

    #[error("storage failure: {0}")]
    Storage(String),
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Start times already taken on `date`, fetched in one read.
    async fn list_reservations(&self, date: Date) -> Result<HashSet<Time>, StoreError>;

    /// Writes the reservation unless its slot is taken.
    async fn insert_if_absent(&self, reservation: NewReservation) -> Result<Reservation, StoreError>;

    /// All reservations, latest meeting date first, then by start time.
    async fn list_all(&self) -> Result<Vec<Reservation>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
