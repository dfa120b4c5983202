use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: booking requests handled. Labels: status.
pub const REQUESTS_TOTAL: &str = "boxoffice_requests_total";

/// Counter: tickets sold.
pub const TICKETS_SOLD_TOTAL: &str = "boxoffice_tickets_sold_total";

/// Counter: validation rejections. Labels: field.
pub const REJECTIONS_TOTAL: &str = "boxoffice_rejections_total";

/// Counter: confirmations delivered.
pub const CONFIRMATIONS_TOTAL: &str = "boxoffice_confirmations_total";

/// Histogram: confirmation dispatch duration in seconds.
pub const DISPATCH_DURATION_SECONDS: &str = "boxoffice_dispatch_duration_seconds";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: tickets remaining in the pool.
pub const TICKETS_REMAINING: &str = "boxoffice_tickets_remaining";

/// Gauge: confirmation dispatches currently in flight.
pub const DISPATCHES_IN_FLIGHT: &str = "boxoffice_dispatches_in_flight";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
