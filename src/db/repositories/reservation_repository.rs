use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;
use time::{Date, Time};
use tracing::error;
use uuid::Uuid;

use crate::booking::store::{ReservationStore, StoreError};
use crate::db::models::{NewReservation, Reservation};
use crate::db::DatabaseError;

const RESERVATION_COLUMNS: &str = "id, meeting_date, start_time, contact_name, contact_email, \
     contact_phone, company, service, message, created_at";

/// PostgreSQL-backed reservation store. Slot uniqueness is enforced by the
/// `meetings_slot_unique` constraint; inserts use `ON CONFLICT DO NOTHING`
/// against it so a lost race comes back as "no row" instead of an error.
#[derive(Clone)]
pub struct PgReservationStore {
    pool: PgPool,
}

impl PgReservationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn storage_error(err: sqlx::Error) -> StoreError {
    let err = DatabaseError::from(err);
    error!(error = %err, "Reservation store query failed");
    StoreError::Storage(err.to_string())
}

#[async_trait]
impl ReservationStore for PgReservationStore {
    async fn list_reservations(&self, date: Date) -> Result<HashSet<Time>, StoreError> {
        let rows: Vec<(Time,)> =
            sqlx::query_as("SELECT start_time FROM meetings WHERE meeting_date = $1")
                .bind(date)
                .fetch_all(&self.pool)
                .await
                .map_err(storage_error)?;

        Ok(rows.into_iter().map(|(start_time,)| start_time).collect())
    }

    async fn insert_if_absent(&self, reservation: NewReservation) -> Result<Reservation, StoreError> {
        let query = format!(
            r#"
            INSERT INTO meetings (id, meeting_date, start_time, contact_name, contact_email,
                                  contact_phone, company, service, message)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (meeting_date, start_time) DO NOTHING
            RETURNING {RESERVATION_COLUMNS}
            "#
        );

        let inserted = sqlx::query_as::<_, Reservation>(&query)
            .bind(Uuid::new_v4())
            .bind(reservation.meeting_date)
            .bind(reservation.start_time)
            .bind(&reservation.contact_name)
            .bind(&reservation.contact_email)
            .bind(&reservation.contact_phone)
            .bind(&reservation.company)
            .bind(reservation.service)
            .bind(&reservation.message)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        inserted.ok_or(StoreError::Conflict {
            date: reservation.meeting_date,
            start_time: reservation.start_time,
        })
    }

    async fn list_all(&self) -> Result<Vec<Reservation>, StoreError> {
        let query = format!(
            "SELECT {RESERVATION_COLUMNS} FROM meetings ORDER BY meeting_date DESC, start_time ASC"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, StoreError> {
        let query = format!("SELECT {RESERVATION_COLUMNS} FROM meetings WHERE id = $1");
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(storage_error)
    }
}
