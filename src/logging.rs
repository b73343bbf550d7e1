//! Tracing subscriber setup
//!
//! The crate emits `tracing` events unconditionally; installing a
//! subscriber is the host's business. This opt-in helper (feature
//! `logging`) covers hosts that don't bring their own.

use tracing_subscriber::EnvFilter;

/// Install a global tracing subscriber for phasr events.
///
/// Respects `RUST_LOG` and defaults to warnings only. Does nothing if a
/// global subscriber is already set.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .without_time()
        .try_init();
}
