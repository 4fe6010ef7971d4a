//! Logging initialisation.
//!
//! The SDK only emits `tracing` events; nothing is printed until a
//! subscriber is installed. [`init_logging`] installs one whose level is
//! picked by [`SdkConfig::debug`], unless `RUST_LOG` is set.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::SdkConfig;

const SDK_TARGETS: [&str; 4] = ["abel_core", "abel_crypto", "abel_tx", "abel_chain"];

/// Builds the filter directives for the SDK targets.
pub fn filter_directives(debug: bool) -> String {
    if !debug {
        return "off".into();
    }

    SDK_TARGETS
        .iter()
        .map(|target| format!("{}=debug", target))
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs a global `tracing` subscriber.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(config: &SdkConfig) {
    let directives = filter_directives(config.debug);

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives)))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
