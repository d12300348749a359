//! Repeating-pattern extraction and key-length column splitting.

use std::collections::BTreeMap;

use crate::error::{CryptanalysisError, Result};

/// Repeated substring -> ascending start offsets (at least two).
pub type RepeatingPatterns = BTreeMap<String, Vec<usize>>;

/// Find every substring of `length` bytes that starts at two or more offsets.
///
/// Offsets are exhaustive and ascending. Text shorter than `length` yields an
/// empty map. Expects ASCII input, which a [`crate::CiphertextDocument`]
/// guarantees.
pub fn find_repeating_patterns(text: &str, length: usize) -> Result<RepeatingPatterns> {
    if length == 0 {
        return Err(CryptanalysisError::invalid_input(
            "pattern length must be positive",
        ));
    }
    if !text.is_ascii() {
        return Err(CryptanalysisError::invalid_input(
            "pattern extraction requires ASCII text",
        ));
    }

    let mut patterns: RepeatingPatterns = BTreeMap::new();
    if text.len() < length {
        return Ok(patterns);
    }

    for start in 0..=text.len() - length {
        patterns
            .entry(text[start..start + length].to_string())
            .or_default()
            .push(start);
    }

    patterns.retain(|_, offsets| offsets.len() >= 2);
    Ok(patterns)
}

/// Split `text` into `key_length` columns.
///
/// Column `i` holds the characters at positions congruent to `i` modulo
/// `key_length`, in their original order.
pub fn get_substrings(text: &str, key_length: usize) -> Result<Vec<String>> {
    if key_length == 0 {
        return Err(CryptanalysisError::invalid_input(
            "key length must be positive",
        ));
    }

    let mut columns = vec![String::with_capacity(text.len() / key_length + 1); key_length];
    for (i, c) in text.chars().enumerate() {
        columns[i % key_length].push(c);
    }
    Ok(columns)
}

/// Re-interleave columns produced by [`get_substrings`] into the original text.
pub fn interleave(columns: &[String]) -> String {
    if columns.is_empty() {
        return String::new();
    }
    let total: usize = columns.iter().map(String::len).sum();
    let mut iters: Vec<_> = columns.iter().map(|c| c.chars()).collect();
    let mut out = String::with_capacity(total);

    'rows: loop {
        for it in iters.iter_mut() {
            match it.next() {
                Some(c) => out.push(c),
                None => break 'rows,
            }
        }
    }
    out
}
