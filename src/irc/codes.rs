//! Numeric reply lookups.
//!
//! The reply table itself is the `irc` crate's [`Response`] enum; this
//! module only maps between its three forms. Scenarios splice the wire form
//! into expectations (`wire(Response::RPL_TOPIC)` is `"332"`) and the parser
//! reports the symbolic name (`"RPL_TOPIC"`), so both directions are needed.

pub use irc::client::prelude::Response;

/// Symbolic name of a reply, e.g. `RPL_ENDOFWHOIS`.
pub fn name(reply: Response) -> String {
    format!("{:?}", reply)
}

/// Wire form, zero-padded to three digits (`"001"`).
pub fn wire(reply: Response) -> String {
    format!("{:03}", reply as u16)
}

/// The reply with numeric value `code`, if the table has one.
pub fn lookup(code: u16) -> Option<Response> {
    format!("{:03}", code).parse::<Response>().ok()
}

/// Symbolic name for a numeric reply, e.g. `332` -> `RPL_TOPIC`.
pub fn name_of(code: u16) -> Option<String> {
    lookup(code).map(name)
}

/// Numeric value for a symbolic name, e.g. `RPL_TOPIC` -> `332`.
pub fn code_of(symbol: &str) -> Option<u16> {
    (0..1000).find(|code| name_of(*code).as_deref() == Some(symbol))
}
