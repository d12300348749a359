//! Ciphertext documents and recovered keys.

use serde::Serialize;
use std::fmt;

use crate::error::{CryptanalysisError, Result};
use crate::language::{letter_index, Language};
use crate::pattern::{self, RepeatingPatterns};

/// Normalized ciphertext bound to a language model.
///
/// # Invariants
///
/// `text` is non-empty and every character is valid for `language`. The text
/// never changes after construction; only the key-length override may be
/// adjusted between analysis attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CiphertextDocument {
    text: String,
    key_length_override: Option<usize>,
    language: Language,
}

impl CiphertextDocument {
    /// Wrap already-normalized ciphertext.
    pub fn new(text: impl Into<String>, language: Language) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(CryptanalysisError::invalid_input("ciphertext is empty"));
        }
        if let Some((pos, c)) = text
            .char_indices()
            .find(|(_, c)| !c.is_ascii_uppercase() || !language.is_valid_character(*c))
        {
            return Err(CryptanalysisError::InvalidInput(format!(
                "ciphertext character {c:?} at offset {pos} is not a {language} letter"
            )));
        }
        Ok(Self {
            text,
            key_length_override: None,
            language,
        })
    }

    /// Uppercase raw input and drop whitespace. With `strip_non_letters`
    /// every character that is not an ASCII letter is dropped as well.
    pub fn normalize(raw: &str, strip_non_letters: bool) -> String {
        raw.chars()
            .filter(|c| {
                if strip_non_letters {
                    c.is_ascii_alphabetic()
                } else {
                    !c.is_whitespace()
                }
            })
            .map(|c| c.to_ascii_uppercase())
            .collect()
    }

    /// Normalize `raw` and wrap it.
    pub fn from_raw(raw: &str, language: Language, strip_non_letters: bool) -> Result<Self> {
        Self::new(Self::normalize(raw, strip_non_letters), language)
    }

    /// Set an explicit key length, bypassing Kasiski estimation.
    pub fn with_key_length(mut self, key_length: usize) -> Self {
        self.key_length_override = Some(key_length);
        self
    }

    /// Set or clear (`None` = automatic) the key-length override.
    pub fn set_key_length_override(&mut self, key_length: Option<usize>) {
        self.key_length_override = key_length;
    }

    pub fn key_length_override(&self) -> Option<usize> {
        self.key_length_override
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn find_repeating_patterns(&self, length: usize) -> Result<RepeatingPatterns> {
        pattern::find_repeating_patterns(&self.text, length)
    }

    pub fn substrings(&self, key_length: usize) -> Result<Vec<String>> {
        pattern::get_substrings(&self.text, key_length)
    }
}

/// A Vigenère key: uppercase letters, each one a Caesar shift.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Key {
    text: String,
    language: Language,
}

impl Key {
    /// Build a key for `language`; the input is uppercased.
    pub fn new(text: &str, language: Language) -> Result<Self> {
        let text = text.to_ascii_uppercase();
        if text.is_empty() {
            return Err(CryptanalysisError::invalid_input("key is empty"));
        }
        if let Some(c) = text.chars().find(|c| !language.is_valid_character(*c)) {
            return Err(CryptanalysisError::InvalidInput(format!(
                "key character {c:?} is not a {language} letter"
            )));
        }
        Ok(Self { text, language })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Every letter is modeled by the key's language.
    pub fn is_valid(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(|c| self.language.is_valid_character(c))
    }

    /// Shift applied at plaintext position `i` (the key repeats cyclically).
    pub fn shift_at(&self, i: usize) -> usize {
        let b = self.text.as_bytes()[i % self.text.len()];
        letter_index(b as char).unwrap_or(0)
    }

    /// Compare against a mask of the same length where `?` matches any letter.
    pub fn matches_pattern(&self, mask: &str) -> bool {
        mask.len() == self.text.len()
            && mask
                .chars()
                .zip(self.text.chars())
                .all(|(m, k)| m == '?' || m.to_ascii_uppercase() == k)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_accepts_uppercase_letters() {
        let doc = CiphertextDocument::new("LXFOPVEFRNHR", Language::English).unwrap();
        assert_eq!(doc.text(), "LXFOPVEFRNHR");
        assert_eq!(doc.len(), 12);
        assert_eq!(doc.key_length_override(), None);
        assert_eq!(doc.language(), Language::English);
    }

    #[test]
    fn test_document_rejects_empty_and_invalid() {
        assert!(matches!(
            CiphertextDocument::new("", Language::English),
            Err(CryptanalysisError::InvalidInput(_))
        ));
        let err = CiphertextDocument::new("ABC DEF", Language::English).unwrap_err();
        assert!(err.to_string().contains("offset 3"));
        assert!(CiphertextDocument::new("abc", Language::English).is_err());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            CiphertextDocument::normalize("lxfop vefrn\nhr", false),
            "LXFOPVEFRNHR"
        );
        assert_eq!(CiphertextDocument::normalize("ab, cd!", false), "AB,CD!");
        assert_eq!(CiphertextDocument::normalize("ab, cd!", true), "ABCD");
        assert!(CiphertextDocument::from_raw("ab, cd!", Language::English, false).is_err());
        assert!(CiphertextDocument::from_raw("ab, cd!", Language::English, true).is_ok());
    }

    #[test]
    fn test_override_is_mutable() {
        let mut doc = CiphertextDocument::new("ABCABC", Language::English)
            .unwrap()
            .with_key_length(3);
        assert_eq!(doc.key_length_override(), Some(3));
        doc.set_key_length_override(None);
        assert_eq!(doc.key_length_override(), None);
    }

    #[test]
    fn test_document_delegates() {
        let doc = CiphertextDocument::new("ABCXABC", Language::English).unwrap();
        assert_eq!(doc.find_repeating_patterns(3).unwrap()["ABC"], vec![0, 4]);
        assert_eq!(doc.substrings(2).unwrap(), vec!["ACAC", "BXB"]);
    }

    #[test]
    fn test_key_uppercases_and_validates() {
        let key = Key::new("lemon", Language::English).unwrap();
        assert_eq!(key.as_str(), "LEMON");
        assert!(key.is_valid());
        assert_eq!(key.len(), 5);
        assert!(Key::new("", Language::English).is_err());
        assert!(Key::new("LE MON", Language::English).is_err());
    }

    #[test]
    fn test_key_shift_is_cyclic() {
        let key = Key::new("LEMON", Language::English).unwrap();
        assert_eq!(key.shift_at(0), 11);
        assert_eq!(key.shift_at(1), 4);
        assert_eq!(key.shift_at(5), 11);
    }

    #[test]
    fn test_key_matches_pattern() {
        let key = Key::new("LEMON", Language::English).unwrap();
        assert!(key.matches_pattern("LEMON"));
        assert!(key.matches_pattern("L?M?N"));
        assert!(key.matches_pattern("?????"));
        assert!(key.matches_pattern("lemon"));
        assert!(!key.matches_pattern("LEMO"));
        assert!(!key.matches_pattern("LIMON"));
    }
}
