//! Prometheus metrics for observability.
//!
//! The store and the HTTP client record through the `metrics` facade. This
//! module installs a Prometheus recorder for the process and renders the
//! current values on demand (the CLI prints them with `--metrics`).
//!
//! # Example
//!
//! ```rust,no_run
//! use staffdesk_runtime::metrics::MetricsRecorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let recorder = MetricsRecorder::install()?;
//!
//! // ... run commands ...
//!
//! if let Some(text) = recorder.render() {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Process-wide Prometheus recorder.
///
/// Without an installed recorder every `counter!`/`histogram!` call is a
/// no-op, so installing is optional.
pub struct MetricsRecorder {
    handle: Option<PrometheusHandle>,
}

impl MetricsRecorder {
    /// Describe all metrics and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// If another recorder is already installed (e.g., in tests) the returned
    /// recorder has no handle and [`MetricsRecorder::render`] yields `None`.
    pub fn install() -> Result<Self, MetricsError> {
        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        let handle = match builder.install_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    None
                } else {
                    return Err(MetricsError::Install(err_msg));
                }
            },
        };

        // Descriptions attach to whichever recorder is now global.
        register_metrics();

        Ok(Self { handle })
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    // Store
    describe_counter!("store_actions_total", "Total number of actions dispatched to the store");
    describe_counter!(
        "store_rejected_actions_total",
        "Actions rejected because the store was shutting down"
    );
    describe_histogram!(
        "store_reducer_duration_seconds",
        "Time spent inside the root reducer per action"
    );
    describe_counter!(
        "store_effects_executed_total",
        "Effects executed by the store, labelled by effect type"
    );
    describe_counter!("store_shutdown_total", "Graceful store shutdowns initiated");

    // HTTP client
    describe_counter!(
        "api_requests_total",
        "HTTP requests issued to the backend, labelled by method and outcome"
    );
    describe_histogram!(
        "api_request_duration_seconds",
        "Round-trip latency of backend requests"
    );
    describe_counter!(
        "api_session_expired_total",
        "Responses classified as an expired or invalid session"
    );

    // Notifications
    describe_counter!("toasts_shown_total", "Toast notifications raised, labelled by kind");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_install_is_tolerated() {
        let first = MetricsRecorder::install();
        let second = MetricsRecorder::install();

        assert!(first.is_ok());
        assert!(second.is_ok());
        // At most one of them owns the global recorder.
        let owners = [&first, &second]
            .iter()
            .filter(|r| r.as_ref().is_ok_and(|r| r.handle().is_some()))
            .count();
        assert!(owners <= 1);
    }

    #[test]
    fn rendered_output_contains_recorded_counters() {
        let Ok(recorder) = MetricsRecorder::install() else {
            return;
        };
        counter!("store_actions_total").increment(1);

        if let Some(text) = recorder.render() {
            assert!(text.contains("store_actions_total"));
        }
    }
}
