//! Diagnostic logging.
//!
//! Every line sent (`>>`) and received (`<<`) is traced at `debug`, so
//! running with `RUST_LOG=ircprobe=debug` shows the full conversation with
//! the server under test. Peer misbehaviour the reader tolerates (NUL bytes,
//! blank lines, closure) is reported at `warn`.

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` wins over the configured level. Calling this twice is
/// harmless; the second subscriber is simply not installed.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
