//! Outbound command lines.
//!
//! Builds the request lines the probe sends, using the `irc` crate's typed
//! [`Command`] for formatting so that trailing parameters get their colon
//! exactly when the wire format requires one. Results carry no line
//! terminator; [`SessionRegistry::send`] appends it.
//!
//! [`SessionRegistry::send`]: super::registry::SessionRegistry::send

use irc::client::prelude::Command;

fn line(cmd: Command) -> String {
    String::from(&cmd)
}

/// Identity declaration sent first during registration.
pub fn nick(nick: &str) -> String {
    line(Command::NICK(nick.to_string()))
}

/// User declaration sent second during registration: `USER <nick> * * <nick>`,
/// the nick doubling as the real name.
pub fn user(nick: &str) -> String {
    // The crate inserts the unused `*` itself, so the mode slot carries the
    // other one.
    line(Command::USER(nick.to_string(), "*".to_string(), nick.to_string()))
}

pub fn join(channel: &str, key: Option<&str>) -> String {
    line(Command::JOIN(
        channel.to_string(),
        key.map(|k| k.to_string()),
        None,
    ))
}

pub fn part(channel: &str, reason: Option<&str>) -> String {
    line(Command::PART(channel.to_string(), reason.map(|r| r.to_string())))
}

/// `TOPIC <channel> :<text>` when `text` is given, otherwise a topic query.
pub fn topic(channel: &str, text: Option<&str>) -> String {
    line(Command::TOPIC(channel.to_string(), text.map(|t| t.to_string())))
}

pub fn list() -> String {
    line(Command::LIST(None, None))
}

pub fn names(channel: &str) -> String {
    line(Command::NAMES(Some(channel.to_string()), None))
}

pub fn privmsg(target: &str, text: &str) -> String {
    line(Command::PRIVMSG(target.to_string(), text.to_string()))
}

pub fn ping(token: &str) -> String {
    line(Command::PING(token.to_string(), None))
}

/// Keepalive acknowledgement. `token` is echoed verbatim, colon included if
/// the probe had one.
pub fn pong(token: &str) -> String {
    format!("PONG {}", token)
}

pub fn kick(channel: &str, user: &str, reason: Option<&str>) -> String {
    line(Command::KICK(
        channel.to_string(),
        user.to_string(),
        reason.map(|r| r.to_string()),
    ))
}

/// Raw `MODE <target> <modes...>`; the typed mode commands of the `irc`
/// crate would reject modes a conformance test deliberately sends.
pub fn mode(target: &str, modes: &str) -> String {
    let mut args = vec![target.to_string()];
    args.extend(modes.split_whitespace().map(|s| s.to_string()));
    line(Command::Raw("MODE".to_string(), args))
}

pub fn whois(nick: &str) -> String {
    line(Command::WHOIS(None, nick.to_string()))
}

pub fn away(message: Option<&str>) -> String {
    line(Command::AWAY(message.map(|m| m.to_string())))
}

pub fn quit(message: Option<&str>) -> String {
    line(Command::QUIT(message.map(|m| m.to_string())))
}

pub fn motd() -> String {
    line(Command::MOTD(None))
}
