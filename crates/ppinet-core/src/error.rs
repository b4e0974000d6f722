use std::fmt;

/// Machine-readable error codes for callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidInput,
    ConfigParseError,
    EvidenceUnavailable,
    ClassifierFailed,
    ProteinNotFound,
    CacheWriteFailed,
    UnknownGene,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidInput => "E1001",
            Self::ConfigParseError => "E1002",
            Self::EvidenceUnavailable => "E2001",
            Self::ClassifierFailed => "E2002",
            Self::ProteinNotFound => "E2003",
            Self::CacheWriteFailed => "E3001",
            Self::UnknownGene => "E3002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidInput => "Invalid input",
            Self::ConfigParseError => "Config file parse error",
            Self::EvidenceUnavailable => "Interaction evidence source unavailable",
            Self::ClassifierFailed => "Classifier request failed",
            Self::ProteinNotFound => "Protein not found in interaction database",
            Self::CacheWriteFailed => "Knowledge cache write failed",
            Self::UnknownGene => "Gene not in knowledge cache",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvalidInput => Some("Provide at least one gene symbol and a confidence in [0, 1]."),
            Self::ConfigParseError => Some("Fix syntax in ppinet.toml and retry."),
            Self::EvidenceUnavailable => Some("The evidence service may be down; retry later."),
            Self::ClassifierFailed => {
                Some("Check the classifier endpoint and that the API key variable is set.")
            }
            Self::ProteinNotFound => Some("Check the gene symbol spelling or try an alias."),
            Self::CacheWriteFailed => Some("Nothing was written. Retry the same request."),
            Self::UnknownGene => Some("Run `ppinet analyze` with this gene first to cache it."),
        }
    }

    /// Whether retrying the same request can succeed without operator action.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::EvidenceUnavailable | Self::CacheWriteFailed)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Domain failures that callers are expected to branch on.
///
/// These travel inside `anyhow::Error`; use [`PpiError::find`] to recover
/// one from an error chain.
#[derive(Debug, thiserror::Error)]
pub enum PpiError {
    /// The gene list or a request parameter is unusable. No work was done.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// `ppinet.toml` exists but could not be parsed.
    #[error("failed to parse {path}: {reason}")]
    ConfigParse { path: String, reason: String },

    /// The interaction-evidence service could not be reached or answered
    /// with a failure status.
    #[error("interaction evidence unavailable: {0}")]
    EvidenceUnavailable(String),

    /// A single classifier request failed. The batch path absorbs these.
    #[error("classifier failed for {symbol}: {reason}")]
    ClassifierFailed { symbol: String, reason: String },

    /// The interaction database has no protein for this symbol.
    #[error("protein {0} not found")]
    ProteinNotFound(String),

    /// A cache write transaction was rolled back; zero rows persisted.
    #[error("knowledge cache write rolled back: {0}")]
    CacheWrite(String),

    /// The requested gene has never been committed to the cache.
    #[error("gene {0} is not in the knowledge cache")]
    UnknownGene(String),
}

impl PpiError {
    /// The machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Self::EvidenceUnavailable(_) => ErrorCode::EvidenceUnavailable,
            Self::ClassifierFailed { .. } => ErrorCode::ClassifierFailed,
            Self::ProteinNotFound(_) => ErrorCode::ProteinNotFound,
            Self::CacheWrite(_) => ErrorCode::CacheWriteFailed,
            Self::UnknownGene(_) => ErrorCode::UnknownGene,
        }
    }

    /// Find the first `PpiError` in an `anyhow` chain.
    #[must_use]
    pub fn find(err: &anyhow::Error) -> Option<&Self> {
        err.chain().find_map(|cause| cause.downcast_ref::<Self>())
    }
}
