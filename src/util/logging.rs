//! Tracing subscriber setup.
//!
//! The library only emits `tracing` spans and events; installing a subscriber
//! is left to the host. [`init_tracing`] is a convenience for tests and small
//! tools that just want formatted output on stderr.

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "TRACER_BVH_LOG";

/// Filter from [`LOG_ENV`], then `RUST_LOG`, then `warn`.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Registry with the env filter and a `fmt` layer writing to `writer`.
pub fn subscriber<W>(writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
}

/// Install a global stderr subscriber filtered by [`LOG_ENV`] / `RUST_LOG`.
///
/// Returns `false` if a global subscriber was already set.
pub fn init_tracing() -> bool {
    tracing::subscriber::set_global_default(subscriber(std::io::stderr)).is_ok()
}
