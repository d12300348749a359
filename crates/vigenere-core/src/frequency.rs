//! Letter-frequency statistics: distributions, chi-square, index of coincidence.

use serde::{Deserialize, Serialize};

use crate::error::{CryptanalysisError, Result};
use crate::language::{index_letter, letter_index, Language, ALPHABET_SIZE};

/// Relative frequency per letter `A..=Z`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LetterFrequencies([f64; ALPHABET_SIZE]);

impl LetterFrequencies {
    pub fn from_table(table: &[f64; ALPHABET_SIZE]) -> Self {
        Self(*table)
    }

    /// Frequency of `c`; zero for anything outside the alphabet.
    pub fn get(&self, c: char) -> f64 {
        letter_index(c).map_or(0.0, |i| self.0[i])
    }

    /// Frequency at alphabet index `i` (taken mod 26).
    pub fn at(&self, i: usize) -> f64 {
        self.0[i % ALPHABET_SIZE]
    }

    pub fn as_array(&self) -> &[f64; ALPHABET_SIZE] {
        &self.0
    }

    /// `(letter, frequency)` pairs in alphabetical order.
    pub fn iter(&self) -> impl Iterator<Item = (char, f64)> + '_ {
        self.0.iter().enumerate().map(|(i, f)| (index_letter(i), *f))
    }
}

impl From<Language> for LetterFrequencies {
    fn from(language: Language) -> Self {
        Self::from_table(language.letter_frequencies())
    }
}

/// Raw letter counts; non-letters are skipped. Returns the counts and the
/// number of letters seen.
pub fn letter_counts(text: &str) -> ([u64; ALPHABET_SIZE], u64) {
    let mut counts = [0u64; ALPHABET_SIZE];
    let mut total = 0u64;
    for i in text.chars().filter_map(letter_index) {
        counts[i] += 1;
        total += 1;
    }
    (counts, total)
}

/// Relative frequency of each letter in `text` (count / total letters).
///
/// Characters that are not letters are ignored.
pub fn analyze_frequencies(text: &str) -> Result<LetterFrequencies> {
    let (counts, total) = letter_counts(text);
    if total == 0 {
        return Err(CryptanalysisError::invalid_input(
            "frequency analysis needs at least one letter",
        ));
    }

    let mut freqs = [0.0; ALPHABET_SIZE];
    for (slot, count) in freqs.iter_mut().zip(counts) {
        *slot = count as f64 / total as f64;
    }
    Ok(LetterFrequencies(freqs))
}

/// Chi-square goodness of fit of `observed` against `expected`.
///
/// Letters with zero expected frequency are skipped.
pub fn calculate_chi_square(observed: &LetterFrequencies, expected: &LetterFrequencies) -> f64 {
    observed
        .0
        .iter()
        .zip(expected.0.iter())
        .filter(|(_, e)| **e > 0.0)
        .map(|(o, e)| (o - e).powi(2) / e)
        .sum()
}

/// Index of coincidence: `Σ n_i(n_i − 1) / (N(N − 1))`.
///
/// Every character must be a letter; fewer than two letters leaves the
/// statistic undefined.
pub fn calculate_index_of_coincidence(text: &str) -> Result<f64> {
    if let Some(bad) = text.chars().find(|c| letter_index(*c).is_none()) {
        return Err(CryptanalysisError::InvalidInput(format!(
            "index of coincidence requires letters only, found {bad:?}"
        )));
    }

    let (counts, n) = letter_counts(text);
    if n < 2 {
        return Err(CryptanalysisError::InsufficientEvidence(format!(
            "index of coincidence undefined for {n} letter(s)"
        )));
    }

    let coincidences: u64 = counts.iter().map(|c| c * c.saturating_sub(1)).sum();
    Ok(coincidences as f64 / (n * (n - 1)) as f64)
}
