pub mod admin;
pub mod booking;
