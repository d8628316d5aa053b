//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a default so an empty file (or no file) probes a server
//! on `127.0.0.1:6667` with the usual deadlines.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root probe configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub reader: ReaderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The server under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Hostname or IP address of the IRC server.
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// `host:port`, as handed to the connector and shown in errors.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Deadlines, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_connect_ms")]
    pub connect_ms: u64,
    /// Deadline for one application-level line.
    #[serde(default = "default_read_ms")]
    pub read_ms: u64,
    /// Shorter deadline used when flushing backlog.
    #[serde(default = "default_drain_ms")]
    pub drain_ms: u64,
    #[serde(default = "default_write_ms")]
    pub write_ms: u64,
    /// Pause after closing every session, so the server finishes its own
    /// teardown before the next scenario connects.
    #[serde(default = "default_teardown_pause_ms")]
    pub teardown_pause_ms: u64,
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }
    pub fn read(&self) -> Duration {
        Duration::from_millis(self.read_ms)
    }
    pub fn drain(&self) -> Duration {
        Duration::from_millis(self.drain_ms)
    }
    pub fn write(&self) -> Duration {
        Duration::from_millis(self.write_ms)
    }
    pub fn teardown_pause(&self) -> Duration {
        Duration::from_millis(self.teardown_pause_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_ms(),
            read_ms: default_read_ms(),
            drain_ms: default_drain_ms(),
            write_ms: default_write_ms(),
            teardown_pause_ms: default_teardown_pause_ms(),
        }
    }
}

/// Line reader tolerances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Consecutive blank reads after which the peer is declared gone.
    #[serde(default = "default_blank_line_limit")]
    pub blank_line_limit: u32,
    /// Longest line accepted, terminator included. Longer lines fail the
    /// read instead of growing the buffer.
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            blank_line_limit: default_blank_line_limit(),
            max_line_bytes: default_max_line_bytes(),
        }
    }
}

/// Diagnostic logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    6667
}
fn default_connect_ms() -> u64 {
    5000
}
fn default_read_ms() -> u64 {
    5000
}
fn default_drain_ms() -> u64 {
    1000
}
fn default_write_ms() -> u64 {
    5000
}
fn default_teardown_pause_ms() -> u64 {
    1000
}
fn default_blank_line_limit() -> u32 {
    5
}
fn default_max_line_bytes() -> usize {
    8192
}
fn default_level() -> String {
    "info".to_string()
}
