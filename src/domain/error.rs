//! Domain error types.

/// Top-level error type for swingsim.
#[derive(Debug, thiserror::Error)]
pub enum SwingError {
    #[error("no price data returned for {ticker}; check the ticker and period")]
    EmptyInput { ticker: String },

    #[error("price series has no usable closing prices")]
    NoUsablePrices,

    #[error("price series is not strictly increasing at index {index}")]
    UnorderedSeries { index: usize },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SwingError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SwingError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl SwingError {
    /// Process exit status for this error category.
    pub fn exit_status(&self) -> u8 {
        match self {
            SwingError::Io(_) => 1,
            SwingError::ConfigParse { .. } | SwingError::ConfigInvalid { .. } => 2,
            SwingError::DataSource { .. } | SwingError::Report { .. } => 3,
            SwingError::EmptyInput { .. }
            | SwingError::NoUsablePrices
            | SwingError::UnorderedSeries { .. } => 5,
        }
    }
}

impl From<&SwingError> for std::process::ExitCode {
    fn from(err: &SwingError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
