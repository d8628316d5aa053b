//! Failure taxonomy for protocol exchanges.
//!
//! Every variant is a scenario-level failure: the engine never retries
//! (apart from the bounded blank-line tolerance in the line reader) and
//! never swallows these on behalf of the caller. Each one carries enough
//! context (nick, awaited pattern, received line) to diagnose what the
//! remote server did wrong.

use std::io;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The transport for `nick` could not be established.
    #[error("could not connect {nick} to {endpoint}: {source}")]
    Connection {
        nick: String,
        endpoint: String,
        #[source]
        source: io::Error,
    },

    /// A line was sent for a nick that has no live session. The registry
    /// only evicts on detected peer closure, so this means the server hung up
    /// earlier.
    #[error("server closed the connection of {nick}; could not send: {line}")]
    SessionClosed { nick: String, line: String },

    #[error("{}", describe_timeout(.nick, .pattern.as_deref(), .after))]
    ReadTimeout {
        nick: String,
        pattern: Option<String>,
        after: Duration,
    },

    #[error("connection of {nick} was closed unexpectedly by the server")]
    UnexpectedClosure { nick: String },

    #[error("received data {received:?} for {nick} does not match expected pattern {pattern:?}")]
    ExpectationMismatch {
        nick: String,
        received: String,
        pattern: String,
    },

    /// Write or flush failed on a session that is still registered.
    #[error("i/o failure on connection of {nick}: {source}")]
    Io {
        nick: String,
        #[source]
        source: io::Error,
    },

    /// The peer sent more than `limit` bytes without a line terminator.
    #[error("line sent to {nick} exceeds {limit} bytes without a terminator")]
    LineTooLong { nick: String, limit: usize },

    #[error("invalid expectation pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

fn describe_timeout(nick: &str, pattern: Option<&str>, after: &Duration) -> String {
    match pattern {
        Some(p) => format!(
            "expected pattern {:?} on connection of {} but timed out after {:?}",
            p, nick, after
        ),
        None => format!(
            "expected data on connection of {} but timed out after {:?}",
            nick, after
        ),
    }
}

impl Error {
    /// True for deadline expiry. Drain and collect loops treat this as their
    /// normal stop condition.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::ReadTimeout { .. })
    }

    /// The nick the failure belongs to, when there is one.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Error::Connection { nick, .. }
            | Error::SessionClosed { nick, .. }
            | Error::ReadTimeout { nick, .. }
            | Error::UnexpectedClosure { nick }
            | Error::ExpectationMismatch { nick, .. }
            | Error::Io { nick, .. }
            | Error::LineTooLong { nick, .. } => Some(nick),
            Error::InvalidPattern { .. } => None,
        }
    }
}
