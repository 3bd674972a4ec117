//! Prometheus metrics for account-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Accounts opened, by outcome.
pub static ACCOUNTS_CREATED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "account_accounts_created_total",
        "Total number of account creation attempts",
        &["status"]
    )
    .expect("Failed to register accounts_created")
});

/// Balance adjustments by direction and outcome.
pub static BALANCE_ADJUSTMENTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "account_balance_adjustments_total",
        "Total number of balance adjustments",
        &["direction", "status"]
    )
    .expect("Failed to register balance_adjustments_total")
});

/// Transfers by outcome (no account labels to keep cardinality flat).
pub static TRANSFERS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "account_transfers_total",
        "Total number of transfers",
        &["status"]
    )
    .expect("Failed to register transfers_total")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "account_errors_total",
        "Total number of errors by type",
        &["error_type"]  // not_found, validation, store, ...
    )
    .expect("Failed to register errors_total")
});

/// Store operation duration histogram.
pub static STORE_OPERATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "account_store_operation_duration_seconds",
        "Account store operation duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register store_operation_duration")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&ACCOUNTS_CREATED);
    Lazy::force(&BALANCE_ADJUSTMENTS_TOTAL);
    Lazy::force(&TRANSFERS_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
    Lazy::force(&STORE_OPERATION_DURATION);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_are_exported() {
        init_metrics();
        TRANSFERS_TOTAL.with_label_values(&["ok"]).inc();

        let text = get_metrics();
        assert!(text.contains("account_transfers_total"));
    }

    #[test]
    fn test_metric_names_and_labels() {
        init_metrics();
        ACCOUNTS_CREATED.with_label_values(&["ok"]).inc();
        BALANCE_ADJUSTMENTS_TOTAL
            .with_label_values(&["credit", "ok"])
            .inc();
        ERRORS_TOTAL.with_label_values(&["overflow"]).inc();
        STORE_OPERATION_DURATION
            .with_label_values(&["fetch_all"])
            .observe(0.002);

        let text = get_metrics();
        assert!(text.contains(r#"account_accounts_created_total{status="ok"}"#));
        assert!(text.contains(
            r#"account_balance_adjustments_total{direction="credit",status="ok"}"#
        ));
        assert!(text.contains(r#"account_errors_total{error_type="overflow"}"#));
        assert!(text.contains(
            r#"account_store_operation_duration_seconds_bucket{operation="fetch_all""#
        ));
    }
}
