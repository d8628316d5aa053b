//! Session registry: logical nick -> live [`Session`].
//!
//! The registry is a plain value owned by whoever runs a scenario; there is
//! no process-wide connection table. Independent registries can therefore
//! drive separate servers (or the same server) in parallel, while each one
//! is driven by exactly one task at a time through `&mut self`.
//!
//! Sessions leave the registry in two ways only: explicit teardown
//! ([`close`](SessionRegistry::close), [`close_all`](SessionRegistry::close_all))
//! or detected peer closure inside the line reader.

use crate::config::ProbeConfig;
use crate::error::{Error, Result};
use crate::irc::codes::{self, Response};
use crate::irc::commands;
use crate::irc::pattern::Pattern;
use crate::irc::session::{Session, SessionLimits};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

pub struct SessionRegistry {
    config: ProbeConfig,
    sessions: HashMap<String, Session>,
}

impl SessionRegistry {
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn is_open(&self, nick: &str) -> bool {
        self.sessions.contains_key(nick)
    }

    /// Nicks with a live session, in no particular order.
    pub fn nicks(&self) -> impl Iterator<Item = &str> {
        self.sessions.keys().map(String::as_str)
    }

    /// Connect and register `nick`, or reuse its live session.
    ///
    /// Reuse drains whatever the server sent since the last exchange, so the
    /// caller starts from a clean slate either way. A fresh session sends
    /// `NICK` and `USER`, discards everything up to the `001` welcome for
    /// `nick`, then drains the rest of the registration burst. A session that
    /// fails to register is dropped again.
    pub async fn open(&mut self, nick: &str) -> Result<()> {
        if self.sessions.contains_key(nick) {
            self.drain_available(nick).await;
            return Ok(());
        }

        let limits = SessionLimits {
            write_timeout: self.config.timeouts.write(),
            blank_line_limit: self.config.reader.blank_line_limit,
            max_line_bytes: self.config.reader.max_line_bytes,
        };
        let session = Session::connect(
            nick,
            &self.config.server.endpoint(),
            self.config.timeouts.connect(),
            limits,
        )
        .await?;
        self.sessions.insert(nick.to_string(), session);

        if let Err(e) = self.register(nick).await {
            self.close(nick).await;
            return Err(e);
        }
        info!("Registered {}", nick);
        Ok(())
    }

    async fn register(&mut self, nick: &str) -> Result<()> {
        self.send(nick, &commands::nick(nick)).await?;
        self.send(nick, &commands::user(nick)).await?;
        let welcome = Pattern::new(&format!(
            r":\S* {} {} :.*",
            codes::wire(Response::RPL_WELCOME),
            regex::escape(nick)
        ))?;
        self.discard_until(nick, &welcome).await?;
        self.drain_available(nick).await;
        Ok(())
    }

    /// Write `line` and the line terminator to `nick`'s transport.
    ///
    /// Fails with [`Error::SessionClosed`] when `nick` has no live session,
    /// which means the server closed it earlier.
    pub async fn send(&mut self, nick: &str, line: &str) -> Result<()> {
        let session = self
            .sessions
            .get_mut(nick)
            .ok_or_else(|| Error::SessionClosed {
                nick: nick.to_string(),
                line: line.to_string(),
            })?;
        session.write_line(line).await.map_err(|e| Error::Io {
            nick: nick.to_string(),
            source: e,
        })
    }

    /// Tear down one session. Best effort; unknown nicks are ignored.
    pub async fn close(&mut self, nick: &str) {
        if let Some(mut session) = self.sessions.remove(nick) {
            session.shutdown().await;
            debug!("Closed connection of {}", nick);
        }
    }

    /// Tear down every session, then pause so the server can finish its own
    /// cleanup before the next scenario connects.
    pub async fn close_all(&mut self) {
        debug!("Closing all active connections...");
        for (nick, mut session) in self.sessions.drain() {
            session.shutdown().await;
            debug!("Closed connection of {}", nick);
        }
        tokio::time::sleep(self.config.timeouts.teardown_pause()).await;
    }

    /// Read one line for `nick` through its session's line reader, evicting
    /// the session if the reader detects peer closure.
    pub(crate) async fn read_line(
        &mut self,
        nick: &str,
        within: Duration,
        awaiting: Option<&Pattern>,
    ) -> Result<String> {
        let session = self
            .sessions
            .get_mut(nick)
            .ok_or_else(|| Error::UnexpectedClosure {
                nick: nick.to_string(),
            })?;
        let result = session.read_line(within, awaiting.map(Pattern::as_str)).await;
        if let Err(Error::UnexpectedClosure { .. }) = result {
            self.sessions.remove(nick);
        }
        result
    }

    pub(crate) fn read_timeout(&self) -> Duration {
        self.config.timeouts.read()
    }

    pub(crate) fn drain_timeout(&self) -> Duration {
        self.config.timeouts.drain()
    }
}
