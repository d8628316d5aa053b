//! Protocol actions.
//!
//! Each helper sends one logical request and checks the one reply shape a
//! conforming server must produce for it. Scenarios call these instead of
//! writing raw protocol lines. Failures come straight from the engine: a
//! wrong reply is an [`ExpectationMismatch`], silence is a [`ReadTimeout`].
//!
//! Channel names are passed in full (`#room`). User-supplied text is
//! regex-escaped before it is spliced into an expectation.
//!
//! [`ExpectationMismatch`]: crate::error::Error::ExpectationMismatch
//! [`ReadTimeout`]: crate::error::Error::ReadTimeout

use crate::error::Result;
use crate::irc::codes::{self, Response};
use crate::irc::commands;
use crate::irc::expect::CollectedResponses;
use crate::irc::message;
use crate::irc::registry::SessionRegistry;
use regex::escape;
use tracing::debug;

/// One `RPL_LIST` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEntry {
    pub name: String,
    /// Visible user count, verbatim.
    pub visible: String,
    pub topic: String,
}

impl SessionRegistry {
    /// `JOIN` a channel (with an optional key) and require the join echo.
    /// The burst that follows a join (names, topic) is drained.
    pub async fn join_channel(&mut self, nick: &str, channel: &str, key: Option<&str>) -> Result<()> {
        self.send(nick, &commands::join(channel, key)).await?;
        self.expect_match(nick, format!(r":\S+ JOIN :{}", escape(channel)))
            .await?;
        self.drain_available(nick).await;
        Ok(())
    }

    /// `PART` a channel and require the part echo.
    pub async fn part_channel(&mut self, nick: &str, channel: &str, reason: Option<&str>) -> Result<()> {
        self.send(nick, &commands::part(channel, reason)).await?;
        self.expect_match(nick, format!(r":\S+ PART {}( |$)", escape(channel)))
            .await?;
        Ok(())
    }

    /// Set a channel topic, require the change echo, then query the topic
    /// back and require `RPL_TOPIC` to carry the new value.
    pub async fn set_channel_topic(&mut self, nick: &str, channel: &str, topic: &str) -> Result<()> {
        self.send(nick, &commands::topic(channel, Some(topic))).await?;
        self.expect_match(
            nick,
            format!(r":\S+ TOPIC {} :{}", escape(channel), escape(topic)),
        )
        .await?;

        self.send(nick, &commands::topic(channel, None)).await?;
        self.expect_match(
            nick,
            format!(
                r":\S+ {} {} {} :{}",
                codes::wire(Response::RPL_TOPIC),
                escape(nick),
                escape(channel),
                escape(topic)
            ),
        )
        .await?;
        self.drain_available(nick).await;
        Ok(())
    }

    /// Send `LIST` and return every listed channel up to `RPL_LISTEND`.
    pub async fn channel_list(&mut self, nick: &str) -> Result<Vec<ChannelEntry>> {
        self.send(nick, &commands::list()).await?;
        let within = self.read_timeout();
        let mut channels = Vec::new();
        loop {
            let line = self.read_line(nick, within, None).await?;
            let Ok(msg) = message::parse(&line) else {
                debug!("Skipping unrecognised LIST line for {}: {}", nick, line);
                continue;
            };
            if msg.is_reply(Response::RPL_LISTEND) {
                break;
            }
            if !msg.is_reply(Response::RPL_LIST) {
                continue;
            }
            match msg.param(1) {
                Some(name) if name.starts_with('#') => channels.push(ChannelEntry {
                    name: name.to_string(),
                    visible: msg.param(2).unwrap_or_default().to_string(),
                    topic: msg.param(3).unwrap_or_default().to_string(),
                }),
                _ => {}
            }
        }
        Ok(channels)
    }

    /// Send `NAMES` for a channel and return its members, up to
    /// `RPL_ENDOFNAMES`. Channel status prefixes (`@`, `+`) are stripped.
    pub async fn channel_users(&mut self, nick: &str, channel: &str) -> Result<Vec<String>> {
        self.send(nick, &commands::names(channel)).await?;
        let within = self.read_timeout();
        let mut users = Vec::new();
        loop {
            let line = self.read_line(nick, within, None).await?;
            let Ok(msg) = message::parse(&line) else {
                debug!("Skipping unrecognised NAMES line for {}: {}", nick, line);
                continue;
            };
            if msg.is_reply(Response::RPL_ENDOFNAMES) {
                break;
            }
            if msg.is_reply(Response::RPL_NAMREPLY) {
                if let Some(names) = msg.trailing() {
                    users.extend(
                        names
                            .split_whitespace()
                            .map(|n| n.trim_start_matches(['@', '+']).to_string()),
                    );
                }
            }
        }
        Ok(users)
    }

    /// Private message from `from` to `to`; `to` must receive it verbatim as
    /// its next line.
    pub async fn send_message_to_user(&mut self, from: &str, to: &str, text: &str) -> Result<()> {
        self.send(from, &commands::privmsg(to, text)).await?;
        self.expect_match(to, format!(r":\S+ PRIVMSG {} :{}", escape(to), escape(text)))
            .await?;
        Ok(())
    }

    /// Channel message from `from`; every nick in `members` must eventually
    /// receive it. Unrelated traffic before it is skipped.
    pub async fn send_message_to_channel(
        &mut self,
        from: &str,
        members: &[&str],
        channel: &str,
        text: &str,
    ) -> Result<()> {
        self.send(from, &commands::privmsg(channel, text)).await?;
        let expected = format!(r":\S+ PRIVMSG {} :{}", escape(channel), escape(text));
        for member in members {
            self.discard_until(member, &expected).await?;
        }
        Ok(())
    }

    /// Change the nick on `nick`'s session and require the `NICK` echo.
    /// The session stays registered under `nick`.
    pub async fn change_nick(&mut self, nick: &str, new_nick: &str) -> Result<()> {
        self.send(nick, &commands::nick(new_nick)).await?;
        self.expect_match(nick, format!(r":\S+ NICK :{}", escape(new_nick)))
            .await?;
        Ok(())
    }

    /// `WHOIS target` and collect replies up to `RPL_ENDOFWHOIS`.
    pub async fn whois(&mut self, nick: &str, target: &str) -> Result<CollectedResponses> {
        self.send(nick, &commands::whois(target)).await?;
        let terminator = codes::name(Response::RPL_ENDOFWHOIS);
        self.collect_until(nick, Some(&terminator)).await
    }

    /// Client-initiated `PING`; the server must answer `PONG <server> :<token>`.
    pub async fn ping(&mut self, nick: &str, token: &str) -> Result<()> {
        self.send(nick, &commands::ping(token)).await?;
        self.expect_match(nick, format!(r":\S+ PONG \S+ :{}", escape(token)))
            .await?;
        Ok(())
    }
}
