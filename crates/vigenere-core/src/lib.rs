//! Vigenère Core Library
//!
//! Statistical cryptanalysis of Vigenère ciphertext: Kasiski examination to
//! rank key lengths, per-column frequency correlation to recover the key,
//! and decryption. Re-exports the pipeline for programmatic access.

pub mod breaker;
pub mod config;
pub mod document;
pub mod error;
pub mod frequency;
pub mod kasiski;
pub mod language;
pub mod obs;
pub mod pattern;
pub mod reporting;
pub mod telemetry;

pub use breaker::{best_shift, decrypt_text, encrypt, CipherBreaker, KeyLengthSource, Solution};
pub use config::{AnalysisConfig, KEY_LENGTH_CAP};
pub use document::{CiphertextDocument, Key};
pub use error::{CryptanalysisError, Result};
pub use frequency::{
    analyze_frequencies, calculate_chi_square, calculate_index_of_coincidence, letter_counts,
    LetterFrequencies,
};
pub use kasiski::{
    divisors_within, rank_candidates, KasiskiAnalyzer, KasiskiExamination, KeyLengthCandidate,
};
pub use language::{index_letter, letter_index, Language, ALPHABET_SIZE};
pub use pattern::{find_repeating_patterns, get_substrings, interleave, RepeatingPatterns};
pub use reporting::{
    build_report, render_report_text, write_report_json, AnalysisReport, REPORT_SCHEMA_VERSION,
};

pub use obs::{
    emit_analysis_failed, emit_candidates_ranked, emit_key_recovered, emit_patterns_extracted,
    AnalysisSpan,
};
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
