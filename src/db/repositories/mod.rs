mod reservation_repository;

pub use reservation_repository::PgReservationStore;
