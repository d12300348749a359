//! Structured observability hooks for the analysis pipeline.
//!
//! This module provides:
//! - An analysis-scoped tracing span via the `AnalysisSpan` RAII guard
//! - Emission functions for pipeline milestones: patterns extracted,
//!   candidates ranked, key recovered, analysis failed
//!
//! Events are emitted at `info!` level; failures at `warn!`.

use tracing::info;

use crate::error::CryptanalysisError;
use crate::kasiski::KeyLengthCandidate;

/// RAII guard that enters an analysis-scoped span for its lifetime.
///
/// # Example
///
/// ```ignore
/// let _span = AnalysisSpan::enter("kasiski", doc.len());
/// // tracing calls are now tagged with stage = "kasiski", text_len = ...
/// ```
pub struct AnalysisSpan {
    _span: tracing::span::EnteredSpan,
}

impl AnalysisSpan {
    /// Create and enter a span tagged with the stage name and text length.
    pub fn enter(stage: &str, text_len: usize) -> Self {
        let span = tracing::info_span!("vigenere.analysis", stage = %stage, text_len = text_len);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: repeated patterns of one length were extracted.
pub fn emit_patterns_extracted(pattern_length: usize, repeated: usize) {
    tracing::debug!(
        event = "patterns.extracted",
        pattern_length = pattern_length,
        repeated = repeated,
    );
}

/// Emit event: key-length candidates ranked, with the winner if any.
pub fn emit_candidates_ranked(histogram_mass: usize, candidates: &[KeyLengthCandidate]) {
    let top = candidates.first();
    info!(
        event = "kasiski.ranked",
        histogram_mass = histogram_mass,
        candidates = candidates.len(),
        top_length = top.map(|c| c.length),
        top_score = top.map(|c| c.final_score),
    );
}

/// Emit event: a key was recovered for the given length.
pub fn emit_key_recovered(key_length: usize, from_override: bool) {
    info!(
        event = "key.recovered",
        key_length = key_length,
        from_override = from_override,
    );
}

/// Emit event: an analysis stage failed (warning level).
pub fn emit_analysis_failed(stage: &str, error: &CryptanalysisError) {
    tracing::warn!(
        event = "analysis.failed",
        stage = %stage,
        kind = error.kind(),
        error = %error,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_span_create() {
        let _span = AnalysisSpan::enter("test-stage", 42);
    }

    #[test]
    fn test_emitters_accept_empty_input() {
        emit_patterns_extracted(3, 0);
        emit_candidates_ranked(0, &[]);
        emit_key_recovered(5, true);
        emit_analysis_failed(
            "kasiski",
            &CryptanalysisError::InsufficientEvidence("no repeats".to_string()),
        );
    }
}
