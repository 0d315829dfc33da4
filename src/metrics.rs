//! Prometheus metrics for the booking service, served at `/metrics`.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

/// Latency buckets in seconds, 1ms to 10s.
fn latency_buckets() -> Vec<f64> {
    vec![
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ]
}

pub struct Metrics {
    registry: Registry,

    /// Requests by method, matched route and status code.
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,

    /// Booking attempts by outcome (`confirmed` or a booking error kind).
    pub booking_attempts_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "route", "status_code"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(latency_buckets()),
            &["method", "route"],
        )?;

        let booking_attempts_total = IntCounterVec::new(
            Opts::new("booking_attempts_total", "Booking attempts by outcome"),
            &["outcome"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(booking_attempts_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            booking_attempts_total,
        })
    }

    pub fn observe_request(&self, method: &str, route: &str, status_code: u16, seconds: f64) {
        self.http_requests_total
            .with_label_values(&[method, route, &status_code.to_string()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, route])
            .observe(seconds);
    }

    pub fn record_booking(&self, outcome: &str) {
        self.booking_attempts_total.with_label_values(&[outcome]).inc();
    }

    /// Everything registered, in the Prometheus text exposition format.
    pub fn export_prometheus(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }
}
