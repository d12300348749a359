//! Language profiles.
//!
//! A [`Language`] is a closed tag selecting a fixed 26-letter frequency
//! table. New profiles are added as new variants; analysis code only ever
//! asks a profile for its table and its validity predicate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CryptanalysisError;

/// Number of letters in the modeled alphabet.
pub const ALPHABET_SIZE: usize = 26;

const ENGLISH_FREQUENCIES: [f64; ALPHABET_SIZE] = [
    0.082, 0.015, 0.028, 0.043, 0.127, 0.022, 0.020, 0.061, 0.070, 0.002, 0.008, 0.040, 0.024,
    0.067, 0.075, 0.019, 0.001, 0.060, 0.063, 0.091, 0.028, 0.010, 0.023, 0.001, 0.020, 0.001,
];

/// Language frequency model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
}

impl Language {
    /// All supported profiles.
    pub const ALL: [Language; 1] = [Language::English];

    /// Expected relative frequency of each letter `A..=Z`.
    pub fn letter_frequencies(&self) -> &'static [f64; ALPHABET_SIZE] {
        match self {
            Language::English => &ENGLISH_FREQUENCIES,
        }
    }

    /// Expected relative frequency of `c`, or `None` when `c` is not modeled.
    pub fn frequency(&self, c: char) -> Option<f64> {
        letter_index(c).map(|i| self.letter_frequencies()[i])
    }

    /// Whether `c` (in either case) is one of the modeled letters.
    pub fn is_valid_character(&self, c: char) -> bool {
        letter_index(c).is_some_and(|i| self.letter_frequencies()[i] > 0.0)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "english",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = CryptanalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CryptanalysisError::InvalidInput(format!("unknown language: {s}")))
    }
}

/// Alphabet index of an ASCII letter (case-insensitive).
pub fn letter_index(c: char) -> Option<usize> {
    if c.is_ascii_alphabetic() {
        Some((c.to_ascii_uppercase() as u8 - b'A') as usize)
    } else {
        None
    }
}

/// Uppercase letter at alphabet index `i` (taken mod 26).
pub fn index_letter(i: usize) -> char {
    (b'A' + (i % ALPHABET_SIZE) as u8) as char
}
