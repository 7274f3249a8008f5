//! Domain error types.
//!
//! All variants are terminal: the engine never retries and never substitutes
//! defaults for invalid input. Retry policy, if any, belongs to the caller.

/// Top-level error type for stratlab.
#[derive(Debug, thiserror::Error)]
pub enum StratlabError {
    #[error("validation error: {reason}")]
    Validation { reason: String },

    #[error("unknown strategy: {id}")]
    UnknownStrategy { id: String },

    #[error("no price data for {symbol} in the requested range")]
    DataUnavailable { symbol: String },

    #[error("strategy {id} failed during evaluation: {reason}")]
    StrategyExecution { id: String, reason: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StratlabError> for std::process::ExitCode {
    fn from(err: &StratlabError) -> Self {
        let code: u8 = match err {
            StratlabError::Io(_) => 1,
            StratlabError::ConfigParse { .. }
            | StratlabError::ConfigMissing { .. }
            | StratlabError::ConfigInvalid { .. } => 2,
            StratlabError::Validation { .. } => 3,
            StratlabError::UnknownStrategy { .. } => 4,
            StratlabError::DataUnavailable { .. } | StratlabError::DataSource { .. } => 5,
            StratlabError::StrategyExecution { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
