//! Kasiski examination.
//!
//! Estimates the Vigenère key length from the distances between repeated
//! ciphertext substrings, corroborated by how monoalphabetic the resulting
//! columns look (mean index of coincidence).
//!
//! Scoring per candidate length `L`:
//!
//! ```text
//! probability(L) = Σ{count(d) : L | d} / Σ count(d)
//! final(L)       = probability·100·w_pattern
//!                + min((avgIC − baseline) / span, 1)·100·w_ic
//! ```
//!
//! Candidates are ranked by descending final score; equal scores fall back
//! to ascending length.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::document::CiphertextDocument;
use crate::error::{CryptanalysisError, Result};
use crate::frequency::calculate_index_of_coincidence;
use crate::obs::{
    emit_analysis_failed, emit_candidates_ranked, emit_patterns_extracted, AnalysisSpan,
};

/// A scored key-length hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyLengthCandidate {
    pub length: usize,
    /// Share of the distance histogram divisible by `length` (0.0–1.0).
    pub pattern_probability: f64,
    /// Repeated patterns whose first two occurrences are `length`-aligned.
    pub pattern_count: usize,
    pub average_index_of_coincidence: f64,
    pub final_score: f64,
}

impl KeyLengthCandidate {
    /// Combine pattern evidence and column IC into a final score.
    pub fn score(
        length: usize,
        pattern_probability: f64,
        pattern_count: usize,
        average_index_of_coincidence: f64,
        config: &AnalysisConfig,
    ) -> Self {
        let normalized_ic =
            ((average_index_of_coincidence - config.ic_baseline) / config.ic_span).min(1.0);
        let final_score = pattern_probability * 100.0 * config.pattern_weight
            + normalized_ic * 100.0 * config.ic_weight;
        Self {
            length,
            pattern_probability,
            pattern_count,
            average_index_of_coincidence,
            final_score,
        }
    }
}

impl fmt::Display for KeyLengthCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Length: {} | Pattern Probability: {:.2}% | Pattern Count: {} | Coincidence Index: {:.3} | Final Score: {:.2}%",
            self.length,
            self.pattern_probability * 100.0,
            self.pattern_count,
            self.average_index_of_coincidence,
            self.final_score,
        )
    }
}

/// Snapshot of one Kasiski examination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KasiskiExamination {
    /// Pairwise occurrence distance -> number of occurrence pairs.
    pub distance_frequencies: BTreeMap<usize, usize>,
    /// Divisor of each pattern's first-pair distance -> number of patterns.
    pub pattern_counts: BTreeMap<usize, usize>,
    /// Ranked best-first.
    pub candidates: Vec<KeyLengthCandidate>,
}

impl KasiskiExamination {
    /// Total number of occurrence pairs in the histogram.
    pub fn histogram_mass(&self) -> usize {
        self.distance_frequencies.values().sum()
    }

    pub fn best(&self) -> Option<&KeyLengthCandidate> {
        self.candidates.first()
    }
}

/// Stateless key-length estimator.
#[derive(Debug, Clone, Default)]
pub struct KasiskiAnalyzer {
    config: AnalysisConfig,
}

impl KasiskiAnalyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Ranked key-length candidates for `doc`, best first.
    pub fn find_possible_key_lengths(
        &self,
        doc: &CiphertextDocument,
    ) -> Result<Vec<KeyLengthCandidate>> {
        self.examine(doc).map(|exam| exam.candidates)
    }

    /// Full examination: histogram, pattern counts and ranked candidates.
    pub fn examine(&self, doc: &CiphertextDocument) -> Result<KasiskiExamination> {
        let _span = AnalysisSpan::enter("kasiski", doc.len());
        self.run(doc).map_err(|err| {
            emit_analysis_failed("kasiski", &err);
            err
        })
    }

    fn run(&self, doc: &CiphertextDocument) -> Result<KasiskiExamination> {
        let cfg = &self.config;
        let mut distance_frequencies: BTreeMap<usize, usize> = BTreeMap::new();
        let mut pattern_counts: BTreeMap<usize, usize> = BTreeMap::new();

        for pattern_length in cfg.min_pattern_length..=cfg.max_pattern_length {
            let patterns = doc.find_repeating_patterns(pattern_length)?;
            emit_patterns_extracted(pattern_length, patterns.len());

            for (pattern, offsets) in &patterns {
                for (i, &earlier) in offsets.iter().enumerate() {
                    for &later in &offsets[i + 1..] {
                        let distance = pair_distance(pattern, earlier, later)?;
                        *distance_frequencies.entry(distance).or_insert(0) += 1;
                    }
                }

                // Only the first two occurrences feed the pattern count.
                if let [first, second, ..] = offsets.as_slice() {
                    let distance = pair_distance(pattern, *first, *second)?;
                    for divisor in divisors_within(distance, cfg.min_key_length, cfg.max_key_length)
                    {
                        *pattern_counts.entry(divisor).or_insert(0) += 1;
                    }
                }
            }
        }

        if distance_frequencies.is_empty() {
            return Err(CryptanalysisError::insufficient(format!(
                "no repeating patterns of length {}..={} found",
                cfg.min_pattern_length, cfg.max_pattern_length
            )));
        }

        let lengths: BTreeSet<usize> = distance_frequencies
            .keys()
            .flat_map(|&d| divisors_within(d, cfg.min_key_length, cfg.max_key_length))
            .collect();
        if lengths.is_empty() {
            return Err(CryptanalysisError::insufficient(format!(
                "no pattern distance has a divisor in {}..={}",
                cfg.min_key_length, cfg.max_key_length
            )));
        }

        let total_mass: usize = distance_frequencies.values().sum();
        let mut candidates = Vec::with_capacity(lengths.len());

        for length in lengths {
            let Some(avg_ic) = average_column_ic(doc, length)? else {
                debug!(length, "skipping candidate: a column has fewer than two letters");
                continue;
            };

            let frequency_score: usize = distance_frequencies
                .iter()
                .filter(|(d, _)| *d % length == 0)
                .map(|(_, count)| count)
                .sum();
            let probability = frequency_score as f64 / total_mass as f64;
            let pattern_count = pattern_counts.get(&length).copied().unwrap_or(0);

            let candidate =
                KeyLengthCandidate::score(length, probability, pattern_count, avg_ic, cfg);
            debug!(
                length,
                frequency_score,
                probability,
                avg_ic,
                final_score = candidate.final_score,
                "scored candidate"
            );
            candidates.push(candidate);
        }

        if candidates.is_empty() {
            return Err(CryptanalysisError::insufficient(
                "text too short to measure coincidence for any candidate length",
            ));
        }

        rank_candidates(&mut candidates);
        emit_candidates_ranked(total_mass, &candidates);

        Ok(KasiskiExamination {
            distance_frequencies,
            pattern_counts,
            candidates,
        })
    }
}

/// Sort best-first: descending final score, then ascending length.
pub fn rank_candidates(candidates: &mut [KeyLengthCandidate]) {
    candidates.sort_by(|a, b| {
        b.final_score
            .total_cmp(&a.final_score)
            .then_with(|| a.length.cmp(&b.length))
    });
}

/// Divisors of `n` within `min..=max`, ascending.
pub fn divisors_within(n: usize, min: usize, max: usize) -> Vec<usize> {
    (min.max(1)..=max.min(n)).filter(|d| n % d == 0).collect()
}

fn pair_distance(pattern: &str, earlier: usize, later: usize) -> Result<usize> {
    match later.checked_sub(earlier) {
        Some(distance) if distance > 0 => Ok(distance),
        _ => Err(CryptanalysisError::InconsistentState(format!(
            "pattern {pattern:?} has non-positive distance between offsets {earlier} and {later}"
        ))),
    }
}

/// Mean IC over the `length` columns, or `None` when a column is too short
/// for the statistic to be defined.
fn average_column_ic(doc: &CiphertextDocument, length: usize) -> Result<Option<f64>> {
    let columns = doc.substrings(length)?;
    if columns.iter().any(|c| c.len() < 2) {
        return Ok(None);
    }

    let mut total = 0.0;
    for column in &columns {
        total += calculate_index_of_coincidence(column)?;
    }
    Ok(Some(total / length as f64))
}
