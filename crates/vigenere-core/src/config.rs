//! Tunables for Kasiski examination and candidate scoring.

use serde::{Deserialize, Serialize};

use crate::error::{CryptanalysisError, Result};

/// Longest key length the examination will ever propose.
pub const KEY_LENGTH_CAP: usize = 19;

/// Analysis parameters.
///
/// The defaults reproduce the classic configuration: patterns of 3 to 7
/// letters, key lengths 2 to 19, pattern evidence weighted 60% against 40%
/// for the column index of coincidence normalised over `[0.03, 0.08]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub min_pattern_length: usize,
    pub max_pattern_length: usize,
    pub min_key_length: usize,
    pub max_key_length: usize,
    /// Weight of the distance-histogram probability in the final score.
    pub pattern_weight: f64,
    /// Weight of the normalised index of coincidence in the final score.
    pub ic_weight: f64,
    /// IC value mapped to a normalised score of zero.
    pub ic_baseline: f64,
    /// Width of the IC band mapped onto `[0, 1]`.
    pub ic_span: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_pattern_length: 3,
            max_pattern_length: 7,
            min_key_length: 2,
            max_key_length: KEY_LENGTH_CAP,
            pattern_weight: 0.6,
            ic_weight: 0.4,
            ic_baseline: 0.03,
            ic_span: 0.05,
        }
    }
}

impl AnalysisConfig {
    /// Defaults overlaid with `VIGENERE_MIN_PATTERN_LENGTH`,
    /// `VIGENERE_MAX_PATTERN_LENGTH` and `VIGENERE_MAX_KEY_LENGTH`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(v) = env_usize("VIGENERE_MIN_PATTERN_LENGTH")? {
            config.min_pattern_length = v;
        }
        if let Some(v) = env_usize("VIGENERE_MAX_PATTERN_LENGTH")? {
            config.max_pattern_length = v;
        }
        if let Some(v) = env_usize("VIGENERE_MAX_KEY_LENGTH")? {
            config.max_key_length = v;
        }
        config.validate()?;
        Ok(config)
    }

    /// Override the inclusive pattern-length range.
    pub fn with_pattern_lengths(mut self, min: usize, max: usize) -> Self {
        self.min_pattern_length = min;
        self.max_pattern_length = max;
        self
    }

    /// Override the largest key length considered.
    pub fn with_max_key_length(mut self, max: usize) -> Self {
        self.max_key_length = max;
        self
    }

    /// Override the score weights.
    pub fn with_weights(mut self, pattern_weight: f64, ic_weight: f64) -> Self {
        self.pattern_weight = pattern_weight;
        self.ic_weight = ic_weight;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_pattern_length < 2 {
            return Err(invalid("min_pattern_length must be at least 2"));
        }
        if self.min_pattern_length > self.max_pattern_length {
            return Err(invalid(format!(
                "pattern length range {}..={} is empty",
                self.min_pattern_length, self.max_pattern_length
            )));
        }
        if self.min_key_length < 2 {
            return Err(invalid("min_key_length must be at least 2"));
        }
        if self.min_key_length > self.max_key_length {
            return Err(invalid(format!(
                "key length range {}..={} is empty",
                self.min_key_length, self.max_key_length
            )));
        }
        if self.max_key_length > KEY_LENGTH_CAP {
            return Err(invalid(format!(
                "max_key_length {} exceeds {KEY_LENGTH_CAP}",
                self.max_key_length
            )));
        }
        if [self.pattern_weight, self.ic_weight]
            .iter()
            .any(|w| w.is_nan() || *w < 0.0)
        {
            return Err(invalid("score weights must be non-negative"));
        }
        if self.ic_span.is_nan() || self.ic_span <= 0.0 {
            return Err(invalid("ic_span must be positive"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> CryptanalysisError {
    CryptanalysisError::InvalidConfig(msg.into())
}

fn env_usize(name: &str) -> Result<Option<usize>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(format!("{name} must be a positive integer, got {raw:?}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_pattern_length, 3);
        assert_eq!(config.max_pattern_length, 7);
        assert_eq!(config.max_key_length, 19);
    }

    #[test]
    fn test_builder_overrides() {
        let config = AnalysisConfig::default()
            .with_pattern_lengths(4, 6)
            .with_max_key_length(12)
            .with_weights(0.5, 0.5);
        assert_eq!(config.min_pattern_length, 4);
        assert_eq!(config.max_pattern_length, 6);
        assert_eq!(config.max_key_length, 12);
        assert_eq!(config.pattern_weight, 0.5);
    }

    #[test]
    fn test_validate_rejects_empty_ranges() {
        let err = AnalysisConfig::default()
            .with_pattern_lengths(5, 3)
            .validate()
            .unwrap_err();
        assert!(matches!(err, CryptanalysisError::InvalidConfig(_)));

        let err = AnalysisConfig::default()
            .with_max_key_length(1)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("key length range"));
    }

    #[test]
    fn test_validate_caps_max_key_length() {
        assert!(AnalysisConfig::default()
            .with_max_key_length(19)
            .validate()
            .is_ok());

        let err = AnalysisConfig::default()
            .with_max_key_length(20)
            .validate()
            .unwrap_err();
        assert!(matches!(err, CryptanalysisError::InvalidConfig(_)));
        assert!(err.to_string().contains("exceeds 19"));
    }

    #[test]
    fn test_validate_rejects_bad_weights() {
        let err = AnalysisConfig::default()
            .with_weights(-0.1, 0.4)
            .validate()
            .unwrap_err();
        assert!(matches!(err, CryptanalysisError::InvalidConfig(_)));

        let config = AnalysisConfig {
            ic_span: 0.0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_env_overlay() {
        // Only this test touches the VIGENERE_* variables.
        std::env::set_var("VIGENERE_MAX_KEY_LENGTH", " 12 ");
        let config = AnalysisConfig::from_env().unwrap();
        assert_eq!(config.max_key_length, 12);
        assert_eq!(config.min_pattern_length, 3);

        std::env::set_var("VIGENERE_MAX_KEY_LENGTH", "twelve");
        let err = AnalysisConfig::from_env().unwrap_err();
        assert!(matches!(err, CryptanalysisError::InvalidConfig(_)));

        std::env::set_var("VIGENERE_MAX_KEY_LENGTH", "1");
        assert!(AnalysisConfig::from_env().is_err());

        std::env::set_var("VIGENERE_MAX_KEY_LENGTH", "40");
        assert!(AnalysisConfig::from_env().is_err());

        std::env::remove_var("VIGENERE_MAX_KEY_LENGTH");
        assert_eq!(AnalysisConfig::from_env().unwrap(), AnalysisConfig::default());
    }
}
