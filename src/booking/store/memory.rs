use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use super::{ReservationStore, StoreError};
use crate::db::models::{NewReservation, Reservation};

type Slots = BTreeMap<(Date, Time), Reservation>;

/// Process-local store keyed by slot. Lookup and insert happen under the same
/// lock, which is what makes `insert_if_absent` atomic.
#[derive(Debug, Default)]
pub struct InMemoryReservationStore {
    slots: Mutex<Slots>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Slots>, StoreError> {
        self.slots
            .lock()
            .map_err(|_| StoreError::Storage("reservation map lock poisoned".to_string()))
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn list_reservations(&self, date: Date) -> Result<HashSet<Time>, StoreError> {
        let slots = self.lock()?;
        Ok(slots
            .keys()
            .filter(|(day, _)| *day == date)
            .map(|(_, start_time)| *start_time)
            .collect())
    }

    async fn insert_if_absent(&self, reservation: NewReservation) -> Result<Reservation, StoreError> {
        let mut slots = self.lock()?;
        let key = (reservation.meeting_date, reservation.start_time);
        if slots.contains_key(&key) {
            return Err(StoreError::Conflict {
                date: key.0,
                start_time: key.1,
            });
        }

        let stored = reservation.into_reservation(Uuid::new_v4(), OffsetDateTime::now_utc());
        slots.insert(key, stored.clone());
        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<Reservation>, StoreError> {
        let slots = self.lock()?;
        let mut all: Vec<Reservation> = slots.values().cloned().collect();
        all.sort_by(|a, b| {
            b.meeting_date
                .cmp(&a.meeting_date)
                .then(a.start_time.cmp(&b.start_time))
        });
        Ok(all)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, StoreError> {
        let slots = self.lock()?;
        Ok(slots.values().find(|r| r.id == id).cloned())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }
}
