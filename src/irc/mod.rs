//! IRC protocol layer: sessions, line reading, parsing, expectations and
//! the protocol actions built on them.

pub mod actions;
pub mod codes;
pub mod commands;
pub mod expect;
pub mod message;
pub mod pattern;
pub mod registry;
pub mod session;
