//! Logging setup for the binary.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;

use crate::common::config::LoggingSettings;

/// Installs a hierarchical `tracing` subscriber. `RUST_LOG` wins over the
/// configured filter. Calling this twice leaves the first subscriber in place.
pub fn init_logging(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let layer = HierarchicalLayer::default()
        .with_indent_lines(settings.indent_lines)
        .with_targets(true);
    let subscriber = Registry::default().with(filter).with(layer);
    let _ = tracing::subscriber::set_global_default(subscriber);
}
