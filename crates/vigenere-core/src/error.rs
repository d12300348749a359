//! Error taxonomy for Vigenère cryptanalysis.

/// Errors produced by the analysis pipeline.
///
/// Every failure surfaces to the caller; nothing is defaulted, clamped or
/// retried inside the library.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CryptanalysisError {
    /// Empty text or key, non-modeled characters, out-of-range lengths.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The text does not carry enough statistical signal to answer.
    #[error("insufficient evidence: {0}")]
    InsufficientEvidence(String),

    /// Internal data contradicts itself (e.g. a non-positive pattern distance).
    #[error("inconsistent state: {0}")]
    InconsistentState(String),

    #[error("invalid analysis configuration: {0}")]
    InvalidConfig(String),
}

impl CryptanalysisError {
    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub(crate) fn insufficient(msg: impl Into<String>) -> Self {
        Self::InsufficientEvidence(msg.into())
    }

    /// Short machine-readable name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InsufficientEvidence(_) => "insufficient_evidence",
            Self::InconsistentState(_) => "inconsistent_state",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, CryptanalysisError>;
