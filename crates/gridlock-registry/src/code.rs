//! Short public identifiers for live boards.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Short random public identifier for a live board, rendered base62.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct GameCode(u64);

impl GameCode {
    /// Draw a fresh random code.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self(rng.gen())
    }
}

impl fmt::Display for GameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("0");
        }
        // 62^11 > 2^64, so 11 digits always suffice.
        let mut digits = [0u8; 11];
        let mut n = self.0;
        let mut start = digits.len();
        while n > 0 {
            start -= 1;
            digits[start] = ALPHABET[(n % 62) as usize];
            n /= 62;
        }
        f.write_str(std::str::from_utf8(&digits[start..]).expect("base62 digits are ascii"))
    }
}

/// A character outside the base62 alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid game code character {0:?}")]
pub struct ParseCodeError(pub char);

impl FromStr for GameCode {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut value: u64 = 0;
        for ch in s.chars() {
            let digit = match ch {
                '0'..='9' => ch as u64 - '0' as u64,
                'A'..='Z' => ch as u64 - 'A' as u64 + 10,
                'a'..='z' => ch as u64 - 'a' as u64 + 36,
                _ => return Err(ParseCodeError(ch)),
            };
            value = value.wrapping_mul(62).wrapping_add(digit);
        }
        Ok(Self(value))
    }
}

impl From<GameCode> for String {
    fn from(code: GameCode) -> Self {
        code.to_string()
    }
}

impl TryFrom<String> for GameCode {
    type Error = ParseCodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
