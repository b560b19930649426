//! # Telemetry
//!
//! Tracing subscriber setup for binaries and tests embedding the engine.
//! The library itself only emits events; installing a subscriber is up
//! to the host.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info,folio=debug";

/// Installs a formatting subscriber filtered by `RUST_LOG`.
///
/// Returns `false` when a global subscriber was already installed, so it is
/// safe to call more than once (e.g. from several tests).
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
