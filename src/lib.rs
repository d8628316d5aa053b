//! Conformance probe for IRC servers.
//!
//! The probe plays any number of clients against a server under test,
//! one [`Session`](crate::irc::session::Session) per logical nick, and asserts that
//! every reply has the expected shape. The surface scenarios use:
//!
//! - [`SessionRegistry`]: `open`, `send`, `close`, `close_all`.
//! - The expectation engine on the same type: `expect_match`,
//!   `discard_until`, `drain_available`, `collect_until`.
//! - Protocol actions (`join_channel`, `set_channel_topic`, `channel_list`,
//!   `channel_users`, `send_message_to_user`, `send_message_to_channel`, ...).
//!
//! Lines that arrive are parsed by [`crate::irc::message::parse`]; numeric replies
//! resolve through [`crate::irc::codes`].

pub mod config;
pub mod error;
pub mod irc;
pub mod logging;

pub use config::ProbeConfig;
pub use error::{Error, Result};
pub use crate::irc::actions::ChannelEntry;
pub use crate::irc::expect::{CollectedResponses, Matched};
pub use crate::irc::message::{Message, ParseError};
pub use crate::irc::pattern::Pattern;
pub use crate::irc::registry::SessionRegistry;
