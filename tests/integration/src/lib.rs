//! Scenario tests for docquery.
//!
//! Each test builds criteria or resolves fields through the public API only
//! and checks the JSON a driver would send.
//!
//! Run them with:
//! ```text
//! RUST_LOG=docquery_core=trace cargo test -p docquery-integration
//! ```

use std::sync::Once;

use docquery_model::Document;

static INIT: Once = Once::new();

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Serialize a document the way a JSON wire encoder would.
#[must_use]
pub fn to_json(document: &Document) -> serde_json::Value {
    match serde_json::to_value(document) {
        Ok(value) => value,
        Err(e) => panic!("document failed to serialize: {e}"),
    }
}

mod test_aggregation;
mod test_criteria;
