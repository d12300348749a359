use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::Path;

use crate::breaker::{CipherBreaker, Solution};
use crate::document::CiphertextDocument;
use crate::error::CryptanalysisError;
use crate::kasiski::KasiskiExamination;
use crate::language::Language;
use crate::pattern::RepeatingPatterns;

pub const REPORT_SCHEMA_VERSION: &str = "1.0";

/// Everything one analysis produced, in a form suitable for JSON artifacts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub language: Language,
    pub text_length: usize,
    pub key_length_override: Option<usize>,
    /// Pattern length -> repeated patterns of that length (empty lengths omitted).
    pub repeated_patterns: BTreeMap<usize, RepeatingPatterns>,
    /// Absent only when an override made Kasiski evidence unnecessary.
    pub examination: Option<KasiskiExamination>,
    pub solution: Solution,
}

/// Run the full pipeline on `doc` and collect a report.
///
/// `pattern_lengths` selects which repeated-pattern lengths are listed; the
/// Kasiski examination itself always uses the analyzer's configuration.
pub fn build_report(
    breaker: &CipherBreaker,
    doc: &CiphertextDocument,
    pattern_lengths: RangeInclusive<usize>,
) -> std::result::Result<AnalysisReport, CryptanalysisError> {
    let mut repeated_patterns = BTreeMap::new();
    for length in pattern_lengths {
        let patterns = doc.find_repeating_patterns(length)?;
        if !patterns.is_empty() {
            repeated_patterns.insert(length, patterns);
        }
    }

    let examination = match breaker.kasiski().examine(doc) {
        Ok(exam) => Some(exam),
        Err(CryptanalysisError::InsufficientEvidence(_)) if doc.key_length_override().is_some() => {
            None
        }
        Err(err) => return Err(err),
    };

    let solution = breaker.solve_with(doc, examination.as_ref())?;

    Ok(AnalysisReport {
        schema_version: REPORT_SCHEMA_VERSION.to_string(),
        generated_at: Utc::now(),
        language: doc.language(),
        text_length: doc.len(),
        key_length_override: doc.key_length_override(),
        repeated_patterns,
        examination,
        solution,
    })
}

/// Render the report as a plain-text summary for terminals.
pub fn render_report_text(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Ciphertext: {} letters ({})\n\n",
        report.text_length, report.language
    ));

    out.push_str("1. Repeated patterns\n");
    if report.repeated_patterns.is_empty() {
        out.push_str("  none\n");
    }
    for (length, patterns) in &report.repeated_patterns {
        out.push_str(&format!("  length {}:\n", length));
        for (pattern, offsets) in patterns {
            out.push_str(&format!("    {} -> positions {:?}\n", pattern, offsets));
        }
    }

    out.push_str("\n2. Candidate key lengths\n");
    match &report.examination {
        Some(exam) => {
            for (rank, candidate) in exam.candidates.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", rank + 1, candidate));
            }
        }
        None => out.push_str("  skipped (no repeated patterns; using override)\n"),
    }

    let solution = &report.solution;
    out.push_str(&format!(
        "\n3. Key (length {}, {:?})\n  {}\n",
        solution.key_length, solution.key_length_source, solution.key
    ));
    out.push_str(&format!(
        "\n4. Plaintext (chi-square {:.4})\n  {}\n",
        solution.chi_square, solution.plaintext
    ));
    out
}

/// Write the report as pretty JSON.
pub fn write_report_json(path: &Path, report: &AnalysisReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report).context("serialize analysis report")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaker::{encrypt, KeyLengthSource};
    use crate::document::Key;

    fn sample_doc() -> CiphertextDocument {
        let plain = "THEQUICKBROWNFOXJUMPSOVERTHELAZYDOGS".repeat(2);
        let key = Key::new("KEY", Language::English).unwrap();
        let cipher = encrypt(&plain, &key, Language::English).unwrap();
        CiphertextDocument::new(cipher, Language::English).unwrap()
    }

    #[test]
    fn report_schema_has_expected_keys() {
        let report = build_report(&CipherBreaker::default(), &sample_doc(), 3..=5).unwrap();
        let raw = serde_json::to_value(&report).expect("serialize report");
        let obj = raw.as_object().expect("report object");
        assert!(obj.contains_key("schema_version"));
        assert!(obj.contains_key("generated_at"));
        assert!(obj.contains_key("repeated_patterns"));
        assert!(obj.contains_key("examination"));
        assert!(obj.contains_key("solution"));
        assert_eq!(raw["schema_version"], "1.0");
        assert_eq!(raw["language"], "english");
        assert!(raw["solution"]["key"]["text"].is_string());
    }

    #[test]
    fn report_solution_follows_its_examination() {
        let report = build_report(&CipherBreaker::default(), &sample_doc(), 3..=5).unwrap();
        let exam = report.examination.as_ref().expect("examination");
        assert_eq!(
            Some(report.solution.key_length),
            exam.best().map(|c| c.length)
        );
        assert_eq!(report.solution.key_length_source, KeyLengthSource::Kasiski);
    }

    #[test]
    fn report_uses_override_without_repeats() {
        let doc = CiphertextDocument::new("QWERTYUIOPASDFGHJKLZXCVBNM", Language::English)
            .unwrap()
            .with_key_length(3);
        let report = build_report(&CipherBreaker::default(), &doc, 3..=5).unwrap();
        assert!(report.examination.is_none());
        assert!(report.repeated_patterns.is_empty());
        assert_eq!(report.solution.key.len(), 3);

        let text = render_report_text(&report);
        assert!(text.contains("skipped"));
    }

    #[test]
    fn report_without_override_propagates_insufficient_evidence() {
        let doc = CiphertextDocument::new("QWERTYUIOPASDFGHJKLZXCVBNM", Language::English).unwrap();
        let err = build_report(&CipherBreaker::default(), &doc, 3..=5).unwrap_err();
        assert!(matches!(err, CryptanalysisError::InsufficientEvidence(_)));
    }

    #[test]
    fn render_text_lists_sections() {
        let report = build_report(&CipherBreaker::default(), &sample_doc(), 3..=5).unwrap();
        let text = render_report_text(&report);
        assert!(text.contains("1. Repeated patterns"));
        assert!(text.contains("2. Candidate key lengths"));
        assert!(text.contains("3. Key"));
        assert!(text.contains("4. Plaintext"));
        assert!(text.contains("Length: "));
    }

    #[test]
    fn write_report_json_roundtrips_through_disk() {
        let report = build_report(&CipherBreaker::default(), &sample_doc(), 3..=3).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report_json(&path, &report).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["text_length"], 72);
    }
}
