//! Expectation and collection primitives.
//!
//! Everything a scenario asserts about the server goes through these four
//! operations on [`SessionRegistry`]:
//!
//! - [`expect_match`](SessionRegistry::expect_match): the next line must
//!   match a pattern.
//! - [`discard_until`](SessionRegistry::discard_until): skip lines until one
//!   matches.
//! - [`drain_available`](SessionRegistry::drain_available): flush backlog
//!   until the line reader goes quiet.
//! - [`collect_until`](SessionRegistry::collect_until): gather parsed lines
//!   keyed by command until a terminator or a quiet period.

use crate::error::{Error, Result};
use crate::irc::message;
use crate::irc::pattern::IntoPattern;
use crate::irc::registry::SessionRegistry;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// A line that satisfied an expectation, with its capture groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched {
    pub line: String,
    groups: Vec<Option<String>>,
}

impl Matched {
    /// Capture group `index`; group 0 is the matched prefix of the line.
    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(|g| g.as_deref())
    }
}

/// Most recent raw line per command, gathered by
/// [`collect_until`](SessionRegistry::collect_until).
///
/// A later line with the same command replaces the earlier one; scenarios
/// rely on seeing the last reply of each kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedResponses {
    lines: BTreeMap<String, String>,
}

impl CollectedResponses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `line` under `command`, replacing any earlier line.
    pub fn record(&mut self, command: impl Into<String>, line: impl Into<String>) {
        self.lines.insert(command.into(), line.into());
    }

    pub fn get(&self, command: &str) -> Option<&str> {
        self.lines.get(command).map(String::as_str)
    }

    pub fn contains(&self, command: &str) -> bool {
        self.lines.contains_key(command)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.lines.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().map(|(c, l)| (c.as_str(), l.as_str()))
    }
}

impl SessionRegistry {
    /// Read the next line for `nick` and require it to match `pattern`.
    pub async fn expect_match(&mut self, nick: &str, pattern: impl IntoPattern) -> Result<Matched> {
        let within = self.read_timeout();
        self.expect_match_within(nick, pattern, within).await
    }

    /// [`expect_match`](Self::expect_match) with an explicit read deadline.
    pub async fn expect_match_within(
        &mut self,
        nick: &str,
        pattern: impl IntoPattern,
        within: Duration,
    ) -> Result<Matched> {
        let pattern = pattern.into_pattern()?;
        let line = self.read_line(nick, within, Some(&pattern)).await?;
        let groups: Option<Vec<Option<String>>> = pattern.captures(&line).map(|caps| {
            caps.iter()
                .map(|g| g.map(|m| m.as_str().to_string()))
                .collect()
        });
        match groups {
            Some(groups) => Ok(Matched { line, groups }),
            None => Err(Error::ExpectationMismatch {
                nick: nick.to_string(),
                received: line,
                pattern: pattern.as_str().to_string(),
            }),
        }
    }

    /// Discard lines for `nick` until one matches `pattern`, and return it.
    ///
    /// Bounded only by the read deadline applied to each line: a server that
    /// never sends the pattern but stays chatty keeps this going, a silent one
    /// ends it with [`Error::ReadTimeout`].
    pub async fn discard_until(&mut self, nick: &str, pattern: impl IntoPattern) -> Result<String> {
        let pattern = pattern.into_pattern()?;
        let within = self.read_timeout();
        loop {
            let line = self.read_line(nick, within, Some(&pattern)).await?;
            if pattern.is_match(&line) {
                return Ok(line);
            }
            debug!("Discarding line for {}: {}", nick, line);
        }
    }

    /// Read and throw away everything `nick` has pending, stopping at the
    /// first read that hits the short drain deadline. Returns how many lines
    /// were dropped.
    ///
    /// Never fails: a timeout is the normal end, and any other failure (the
    /// peer closing, for instance) surfaces on the caller's next real
    /// expectation instead.
    pub async fn drain_available(&mut self, nick: &str) -> usize {
        let within = self.drain_timeout();
        let mut dropped = 0;
        loop {
            match self.read_line(nick, within, None).await {
                Ok(line) => {
                    debug!("Draining line for {}: {}", nick, line);
                    dropped += 1;
                }
                Err(e) => {
                    if !e.is_timeout() {
                        debug!("Drain for {} stopped: {}", nick, e);
                    }
                    return dropped;
                }
            }
        }
    }

    /// Gather parsed lines for `nick`, keyed by resolved command name.
    ///
    /// With a `terminator`, stops after storing the first line whose command
    /// equals it. Without one, keeps reading until a read times out. Either
    /// way a timeout after the first line ends the collection normally; a
    /// timeout on the very first read means the server answered nothing and
    /// is returned as an error. Lines that do not parse are skipped.
    pub async fn collect_until(
        &mut self,
        nick: &str,
        terminator: Option<&str>,
    ) -> Result<CollectedResponses> {
        let within = self.read_timeout();
        let mut collected = CollectedResponses::new();
        let mut first = true;

        loop {
            let line = match self.read_line(nick, within, None).await {
                Ok(line) => line,
                Err(e) if e.is_timeout() && !first => break,
                Err(e) => return Err(e),
            };
            first = false;

            let msg = match message::parse(&line) {
                Ok(msg) => msg,
                Err(e) => {
                    debug!("Skipping unrecognised line for {} ({}): {}", nick, e, line);
                    continue;
                }
            };
            let done = terminator == Some(msg.command.as_str());
            collected.record(msg.command, line);
            if done {
                break;
            }
        }

        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_lines_replace_earlier_ones() {
        let mut set = CollectedResponses::new();
        set.record("RPL_AWAY", ":srv 301 yoda yoda :first");
        set.record("RPL_WHOISUSER", ":srv 311 yoda yoda u h * :r");
        set.record("RPL_AWAY", ":srv 301 yoda yoda :second");

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("RPL_AWAY"), Some(":srv 301 yoda yoda :second"));
        assert!(set.contains("RPL_WHOISUSER"));
        assert!(!set.contains("RPL_ENDOFWHOIS"));
        assert_eq!(set.commands().collect::<Vec<_>>(), vec!["RPL_AWAY", "RPL_WHOISUSER"]);
    }

    #[test]
    fn matched_exposes_groups() {
        let m = Matched {
            line: ":srv 332 yoda #c :topic".into(),
            groups: vec![Some(":srv 332 yoda #c :topic".into()), None, Some("topic".into())],
        };
        assert_eq!(m.group(2), Some("topic"));
        assert_eq!(m.group(1), None);
        assert_eq!(m.group(7), None);
    }
}
