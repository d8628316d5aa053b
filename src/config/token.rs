//! Random identifiers.
//!
//! Scenarios need fresh nicks, channel names, topics and message payloads
//! that cannot collide with state left on the server by earlier runs.
//! Tokens are 8 ASCII letters, which fits the 9-character nickname limit
//! and is valid as a channel name body.

use rand::RngExt;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const TOKEN_LEN: usize = 8;

/// Generate a random token like `qTzkAbWe`.
pub fn random_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| LETTERS[rng.random_range(0..LETTERS.len())] as char)
        .collect()
}
