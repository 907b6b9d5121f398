use std::sync::Once;

use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_target(true)
            .with_thread_names(false)
            .with_test_writer()
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Partner records forming one chain `1 <- 2 <- ... <- n`, each with `revenue`.
pub fn chain_records(n: i64, revenue: f64) -> Value {
    let records: Vec<Value> = (1..=n)
        .map(|id| {
            if id == 1 {
                json!({"id": id, "name": format!("P{}", id), "monthly_revenue": revenue})
            } else {
                json!({"id": id, "parent_id": id - 1, "name": format!("P{}", id), "monthly_revenue": revenue})
            }
        })
        .collect();
    Value::Array(records)
}
