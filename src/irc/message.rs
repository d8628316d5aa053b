//! Raw line parser.
//!
//! Turns one received line (terminators already stripped) into a structured
//! [`Message`]: optional prefix, command name, ordered parameters. Numeric
//! replies are resolved to their symbolic names through [`codes`], so a
//! `332` line comes back with `command == "RPL_TOPIC"`.
//!
//! [`codes`]: super::codes

use super::codes::{self, Response};
use std::str::FromStr;
use thiserror::Error;

/// A parsed protocol line. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Sender origin without the leading colon, e.g. `irc.example.org` or
    /// `yoda!yoda@host`.
    pub prefix: Option<String>,
    /// Word command (`PRIVMSG`) or the symbolic name of a numeric reply.
    pub command: String,
    /// Parameters in order. The last one may contain spaces when it was
    /// introduced by a colon on the wire.
    pub params: Vec<String>,
}

/// Why a line could not be turned into a [`Message`].
///
/// None of these are fatal: the collection engine skips such lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty line")]
    Empty,
    #[error("line has no command token")]
    MissingCommand,
    #[error("numeric reply {0:03} is not in the reply table")]
    UnknownNumeric(u16),
}

impl Message {
    /// Nick part of the prefix (`yoda` for `yoda!user@host`).
    pub fn source_nick(&self) -> Option<&str> {
        self.prefix
            .as_deref()
            .map(|p| p.split(['!', '@']).next().unwrap_or(p))
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// True when this line is the numeric reply `reply`.
    pub fn is_reply(&self, reply: Response) -> bool {
        self.command == codes::name(reply)
    }

    /// Last parameter, which carries free text for most commands.
    pub fn trailing(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }
}

impl FromStr for Message {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parse one raw line.
///
/// Deterministic and free of side effects: parsing the same line twice
/// yields equal messages.
pub fn parse(line: &str) -> Result<Message, ParseError> {
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut rest = line;
    let mut prefix = None;

    if let Some(stripped) = rest.strip_prefix(':') {
        let (origin, tail) = stripped.split_once(' ').ok_or(ParseError::MissingCommand)?;
        prefix = Some(origin.to_string());
        rest = tail;
    }

    let rest = rest.trim_start_matches(' ');
    let (token, mut rest) = match rest.split_once(' ') {
        Some((token, tail)) => (token, tail),
        None => (rest, ""),
    };
    if token.is_empty() {
        return Err(ParseError::MissingCommand);
    }

    let command = if is_numeric(token) {
        let code: u16 = token.parse().map_err(|_| ParseError::MissingCommand)?;
        codes::name_of(code).ok_or(ParseError::UnknownNumeric(code))?
    } else {
        token.to_string()
    };

    let mut params = Vec::new();
    while !rest.is_empty() {
        if let Some(trailing) = rest.strip_prefix(':') {
            params.push(trailing.to_string());
            break;
        }
        match rest.split_once(' ') {
            Some((middle, tail)) => {
                if !middle.is_empty() {
                    params.push(middle.to_string());
                }
                rest = tail;
            }
            None => {
                params.push(rest.to_string());
                break;
            }
        }
    }

    Ok(Message {
        prefix,
        command,
        params,
    })
}

fn is_numeric(token: &str) -> bool {
    token.len() == 3 && token.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefix_command_and_trailing() {
        let msg = parse(":yoda!yoda@localhost PRIVMSG luke :Luke, I am your father").unwrap();
        assert_eq!(msg.prefix.as_deref(), Some("yoda!yoda@localhost"));
        assert_eq!(msg.source_nick(), Some("yoda"));
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params, vec!["luke", "Luke, I am your father"]);
        assert_eq!(msg.trailing(), Some("Luke, I am your father"));
    }

    #[test]
    fn resolves_numeric_replies() {
        let msg = parse(":irc.local 322 yoda #abc 1 :some topic").unwrap();
        assert_eq!(msg.command, "RPL_LIST");
        assert_eq!(msg.params, vec!["yoda", "#abc", "1", "some topic"]);

        let msg = parse(":irc.local 001 yoda :Welcome").unwrap();
        assert_eq!(msg.command, "RPL_WELCOME");
        assert!(msg.is_reply(Response::RPL_WELCOME));
        assert!(!msg.is_reply(Response::RPL_YOURHOST));

        let msg = parse(":irc.local 266 yoda :Current global users: 3").unwrap();
        assert_eq!(msg.command, "RPL_GLOBALUSERS");
    }

    #[test]
    fn unknown_numeric_is_reported_not_fatal() {
        assert_eq!(
            parse(":irc.local 000 yoda :what"),
            Err(ParseError::UnknownNumeric(0))
        );
        // Four digits is not a numeric reply, just an odd word command.
        assert_eq!(parse("1234 x").unwrap().command, "1234");
    }

    #[test]
    fn command_without_prefix_or_params() {
        let msg = parse("LIST").unwrap();
        assert_eq!(msg.prefix, None);
        assert_eq!(msg.command, "LIST");
        assert!(msg.params.is_empty());

        let msg = parse("PING 1079550066").unwrap();
        assert_eq!(msg.params, vec!["1079550066"]);
    }

    #[test]
    fn trailing_may_be_empty_or_contain_colons() {
        let msg = parse(":srv TOPIC #c :").unwrap();
        assert_eq!(msg.params, vec!["#c", ""]);

        let msg = parse(":srv PRIVMSG #c :a :b c").unwrap();
        assert_eq!(msg.params, vec!["#c", "a :b c"]);
    }

    #[test]
    fn rejects_lines_without_command() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse(":onlyprefix"), Err(ParseError::MissingCommand));
        assert_eq!(parse(":prefix "), Err(ParseError::MissingCommand));
    }

    #[test]
    fn reparsing_is_deterministic() {
        let line = ":irc.local 353 yoda = #abc :@yoda luke";
        assert_eq!(parse(line), parse(line));
        assert_eq!(line.parse::<Message>(), parse(line));
    }
}
