//! Tracing bootstrap for binaries and tests.
//!
//! The engine only ever logs through the `tracing` facade; nothing here is
//! required for library use. Hosts that want console output without wiring
//! their own subscriber can call [`init`] once at startup and control
//! verbosity through `RUST_LOG`.

use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Install an env-filtered fmt subscriber with span-trace capture.
///
/// Fails if a global subscriber is already set.
pub fn try_init() -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(ErrorLayer::default())
        .try_init()
}

/// Like [`try_init`], but quietly keeps an already-installed subscriber.
pub fn init() {
    let _ = try_init();
}
