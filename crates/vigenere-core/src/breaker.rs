//! Key recovery and Vigenère decryption.
//!
//! Once the key length `L` is known the ciphertext splits into `L` Caesar
//! columns. Each column's shift is the one whose back-shifted letter
//! distribution correlates best with the language model:
//!
//! ```text
//! score(s) = Σ_c observed(c) · expected(c − s mod 26)
//! ```
//!
//! The highest score wins; ties go to the smallest shift.

use serde::Serialize;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::document::{CiphertextDocument, Key};
use crate::error::{CryptanalysisError, Result};
use crate::frequency::{analyze_frequencies, calculate_chi_square, LetterFrequencies};
use crate::kasiski::{KasiskiAnalyzer, KasiskiExamination};
use crate::language::{index_letter, letter_index, Language, ALPHABET_SIZE};
use crate::obs::{emit_analysis_failed, emit_key_recovered, AnalysisSpan};

/// Where the key length used for recovery came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyLengthSource {
    /// Supplied by the caller on the document.
    Override,
    /// Top-ranked Kasiski candidate.
    Kasiski,
}

/// Outcome of a full break: key, plaintext and a fit diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    pub key_length: usize,
    pub key_length_source: KeyLengthSource,
    pub key: Key,
    pub plaintext: String,
    /// Chi-square of the plaintext letter distribution against the language.
    pub chi_square: f64,
}

/// Recovers keys and decrypts documents.
#[derive(Debug, Clone, Default)]
pub struct CipherBreaker {
    kasiski: KasiskiAnalyzer,
}

impl CipherBreaker {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        Ok(Self {
            kasiski: KasiskiAnalyzer::new(config)?,
        })
    }

    pub fn kasiski(&self) -> &KasiskiAnalyzer {
        &self.kasiski
    }

    /// The document's override if set (validated against the text), else
    /// the top Kasiski candidate.
    pub fn resolve_key_length(&self, doc: &CiphertextDocument) -> Result<(usize, KeyLengthSource)> {
        self.resolve_with(doc, None)
    }

    /// Like [`Self::resolve_key_length`], but takes the top candidate from
    /// `exam` when one is supplied instead of examining `doc` again.
    fn resolve_with(
        &self,
        doc: &CiphertextDocument,
        exam: Option<&KasiskiExamination>,
    ) -> Result<(usize, KeyLengthSource)> {
        if let Some(length) = doc.key_length_override() {
            if length < 2 || length > doc.len() {
                return Err(CryptanalysisError::InvalidInput(format!(
                    "key length {length} outside 2..={}",
                    doc.len()
                )));
            }
            return Ok((length, KeyLengthSource::Override));
        }

        let best = match exam {
            Some(exam) => exam.best().map(|c| c.length),
            None => self.kasiski.examine(doc)?.best().map(|c| c.length),
        };
        best.map(|length| (length, KeyLengthSource::Kasiski))
            .ok_or_else(|| CryptanalysisError::insufficient("no key length candidates"))
    }

    /// Recover the most likely key for `doc`.
    pub fn analyze_key(&self, doc: &CiphertextDocument) -> Result<Key> {
        self.recover(doc, None).map(|(_, _, key)| key)
    }

    fn recover(
        &self,
        doc: &CiphertextDocument,
        exam: Option<&KasiskiExamination>,
    ) -> Result<(usize, KeyLengthSource, Key)> {
        let _span = AnalysisSpan::enter("key_recovery", doc.len());
        let result = self.resolve_with(doc, exam).and_then(|(length, source)| {
            let key = self.key_for_length(doc, length)?;
            emit_key_recovered(length, source == KeyLengthSource::Override);
            Ok((length, source, key))
        });
        if let Err(err) = &result {
            emit_analysis_failed("key_recovery", err);
        }
        result
    }

    /// Solve each of the `key_length` columns independently.
    pub fn key_for_length(&self, doc: &CiphertextDocument, key_length: usize) -> Result<Key> {
        let expected = LetterFrequencies::from(doc.language());
        let mut key = String::with_capacity(key_length);

        for (column_index, column) in doc.substrings(key_length)?.iter().enumerate() {
            let observed = analyze_frequencies(column)?;
            let (shift, score) = best_shift(&observed, &expected);
            debug!(column = column_index, shift, score, "column solved");
            key.push(index_letter(shift));
        }

        Key::new(&key, doc.language())
    }

    /// Decrypt `doc` with `key`.
    pub fn decrypt(&self, doc: &CiphertextDocument, key: &Key) -> Result<String> {
        decrypt_text(doc.text(), key, doc.language())
    }

    /// Recover the key, decrypt, and score the plaintext fit.
    pub fn solve(&self, doc: &CiphertextDocument) -> Result<Solution> {
        self.solve_with(doc, None)
    }

    /// [`Self::solve`] reusing an examination already run on `doc`. An
    /// override on the document still takes precedence.
    pub fn solve_with(
        &self,
        doc: &CiphertextDocument,
        exam: Option<&KasiskiExamination>,
    ) -> Result<Solution> {
        let (key_length, key_length_source, key) = self.recover(doc, exam)?;
        let plaintext = self.decrypt(doc, &key)?;
        let chi_square = calculate_chi_square(
            &analyze_frequencies(&plaintext)?,
            &LetterFrequencies::from(doc.language()),
        );
        Ok(Solution {
            key_length,
            key_length_source,
            key,
            plaintext,
            chi_square,
        })
    }
}

/// Caesar shift maximising the correlation between `observed` (ciphertext)
/// and `expected` (plaintext language). Returns the shift and its score.
pub fn best_shift(observed: &LetterFrequencies, expected: &LetterFrequencies) -> (usize, f64) {
    let mut best = (0, f64::NEG_INFINITY);
    for shift in 0..ALPHABET_SIZE {
        let score: f64 = (0..ALPHABET_SIZE)
            .map(|c| observed.at(c) * expected.at(c + ALPHABET_SIZE - shift))
            .sum();
        if score > best.1 {
            best = (shift, score);
        }
    }
    best
}

/// `C_i = (P_i + K_{i mod |K|}) mod 26`.
pub fn encrypt(plaintext: &str, key: &Key, language: Language) -> Result<String> {
    apply_key(plaintext, key, language, |p, k| p + k)
}

/// `P_i = (C_i − K_{i mod |K|} + 26) mod 26`.
pub fn decrypt_text(ciphertext: &str, key: &Key, language: Language) -> Result<String> {
    apply_key(ciphertext, key, language, |c, k| c + ALPHABET_SIZE - k)
}

fn apply_key(
    text: &str,
    key: &Key,
    language: Language,
    combine: impl Fn(usize, usize) -> usize,
) -> Result<String> {
    if text.is_empty() {
        return Err(CryptanalysisError::invalid_input("text is empty"));
    }
    if !key.is_valid() || key.language() != language {
        return Err(CryptanalysisError::InvalidInput(format!(
            "key {key} is not a valid {language} key"
        )));
    }

    let mut out = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        let idx = match letter_index(c) {
            Some(idx) if c.is_ascii_uppercase() && language.is_valid_character(c) => idx,
            _ => {
                return Err(CryptanalysisError::InvalidInput(format!(
                    "character {c:?} at offset {i} is not an uppercase {language} letter"
                )))
            }
        };
        out.push(index_letter(combine(idx, key.shift_at(i))));
    }
    Ok(out)
}
