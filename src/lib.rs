pub mod app;
pub mod app_state;
pub mod booking;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod telemetry;
