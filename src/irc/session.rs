//! One logical user's connection and its line reader.
//!
//! A [`Session`] owns its TCP stream exclusively, split into a buffered
//! reader and a buffered writer so reads and writes carry independent
//! deadlines. Bytes of a line that arrive before a deadline expires are kept
//! in a carry-over buffer and completed by the next read, so a timeout never
//! loses or splits data.
//!
//! The reader hides two kinds of traffic from callers: keepalive probes
//! (`PING <token>`), which are answered on the spot, and blank lines, which
//! are skipped while fewer than a configured number arrive back to back.
//! Reaching that number within one read treats the peer as gone. Anything
//! else the reader consumes (a keepalive, the end of the call) breaks the
//! run.

use crate::error::{Error, Result};
use crate::irc::commands;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, info, warn};

/// Per-session tunables, copied from the probe configuration at open time.
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub write_timeout: Duration,
    pub blank_line_limit: u32,
    pub max_line_bytes: usize,
}

pub struct Session {
    nick: String,
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    carry: Vec<u8>,
    limits: SessionLimits,
}

impl Session {
    /// Open the transport for `nick`. No protocol traffic is exchanged here;
    /// registration is the registry's job.
    pub async fn connect(
        nick: &str,
        endpoint: &str,
        connect_timeout: Duration,
        limits: SessionLimits,
    ) -> Result<Self> {
        let connection_error = |source: io::Error| Error::Connection {
            nick: nick.to_string(),
            endpoint: endpoint.to_string(),
            source,
        };

        let stream = match timeout(connect_timeout, TcpStream::connect(endpoint)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(connection_error(e)),
            Err(_) => {
                return Err(connection_error(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("no connection after {:?}", connect_timeout),
                )))
            }
        };
        stream.set_nodelay(true).map_err(connection_error)?;

        let (read_half, write_half) = stream.into_split();
        info!("Connected {} to {}", nick, endpoint);

        Ok(Self {
            nick: nick.to_string(),
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
            carry: Vec::new(),
            limits,
        })
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// Write `line` plus CRLF and flush, bounded by the write deadline.
    pub async fn write_line(&mut self, line: &str) -> io::Result<()> {
        debug!(">> {}: {}", self.nick, line);
        let limit = self.limits.write_timeout;
        let writer = &mut self.writer;
        let write = async {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\r\n").await?;
            writer.flush().await
        };
        match timeout(limit, write).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "write deadline exceeded",
            )),
        }
    }

    /// Read one application-level line, terminators stripped.
    ///
    /// Keepalive probes are answered and skipped, blank lines are skipped.
    /// `awaiting` only feeds the timeout diagnostic. On detected closure the
    /// transport is shut down before [`Error::UnexpectedClosure`] is
    /// returned; the caller must drop the session. A line longer than the
    /// configured maximum fails with [`Error::LineTooLong`] and is dropped.
    pub async fn read_line(&mut self, within: Duration, awaiting: Option<&str>) -> Result<String> {
        let deadline = Instant::now() + within;
        let mut blanks: u32 = 0;
        loop {
            let room = self.limits.max_line_bytes.saturating_sub(self.carry.len()).max(1);
            let read = {
                let mut bounded = (&mut self.reader).take(room as u64);
                timeout_at(deadline, bounded.read_until(b'\n', &mut self.carry)).await
            };
            let raw = match read {
                Err(_) => {
                    return Err(Error::ReadTimeout {
                        nick: self.nick.clone(),
                        pattern: awaiting.map(|p| p.to_string()),
                        after: within,
                    })
                }
                Ok(Err(e)) => {
                    warn!("Read from {} failed: {}", self.nick, e);
                    return Err(self.closed().await);
                }
                Ok(Ok(0)) if self.carry.is_empty() => None,
                Ok(Ok(_)) => {
                    if !self.carry.ends_with(b"\n") && self.carry.len() >= self.limits.max_line_bytes {
                        warn!(
                            "Dropping a line of more than {} bytes sent to {}",
                            self.limits.max_line_bytes, self.nick
                        );
                        self.carry.clear();
                        return Err(Error::LineTooLong {
                            nick: self.nick.clone(),
                            limit: self.limits.max_line_bytes,
                        });
                    }
                    Some(std::mem::take(&mut self.carry))
                }
            };

            let line = match raw {
                Some(bytes) => self.decode(bytes),
                None => String::new(),
            };

            if line.is_empty() {
                blanks += 1;
                debug!("<< {}: blank line ({} in a row)", self.nick, blanks);
                if blanks >= self.limits.blank_line_limit {
                    return Err(self.closed().await);
                }
                continue;
            }

            self.report_blanks(blanks);
            blanks = 0;

            if let Some(token) = keepalive_token(&line) {
                debug!("<< {}: {} (keepalive)", self.nick, line);
                let reply = commands::pong(token);
                if let Err(e) = self.write_line(&reply).await {
                    return Err(Error::Io {
                        nick: self.nick.clone(),
                        source: e,
                    });
                }
                continue;
            }

            debug!("<< {}: {}", self.nick, line);
            return Ok(line);
        }
    }

    fn report_blanks(&self, blanks: u32) {
        if blanks > 0 {
            warn!(
                "Received {} unexpected blank line(s) on connection of {}; the previous \
                 message may have malformed line terminators",
                blanks, self.nick
            );
        }
    }

    /// Half-close the write side, then let the caller drop the transport.
    /// Errors are irrelevant at this point.
    pub async fn shutdown(&mut self) {
        let _ = self.writer.shutdown().await;
    }

    async fn closed(&mut self) -> Error {
        warn!("Connection of {} was closed by the server", self.nick);
        self.shutdown().await;
        Error::UnexpectedClosure {
            nick: self.nick.clone(),
        }
    }

    fn decode(&self, mut bytes: Vec<u8>) -> String {
        // Some servers pad lines with NUL; tolerated rather than rejected.
        if bytes.contains(&0) {
            warn!("Stripping NUL bytes from a line sent to {}", self.nick);
            bytes.retain(|b| *b != 0);
        }
        String::from_utf8_lossy(&bytes).trim_end().to_string()
    }
}

/// Token of a server keepalive probe (`PING <token>`), if `line` is one.
pub fn keepalive_token(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("PING ")?;
    if rest.starts_with(char::is_whitespace) {
        return None;
    }
    rest.split_whitespace().next()
}
