use thiserror::Error;

/// Result type for scope analysis
pub type Result<T> = std::result::Result<T, ScopeError>;

/// Errors that can occur while analyzing a buffer or answering a query
#[derive(Error, Debug)]
pub enum ScopeError {
    /// Buffer is larger than a span offset can address
    #[error("input of {bytes} bytes exceeds the supported size of {max} bytes")]
    InputTooLarge { bytes: u64, max: u64 },

    /// Buffer has more lines than a line index can address
    #[error("input has more lines ({lines}) than supported ({max})")]
    TooManyLines { lines: u64, max: u64 },

    /// Queried line does not exist in the analyzed buffer
    #[error("line {line} is out of range (buffer has {line_count} lines)")]
    IndexOutOfRange { line: u64, line_count: usize },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ScopeError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an out-of-range error for a 0-based line index
    pub(crate) fn out_of_range(index: usize, line_count: usize) -> Self {
        Self::IndexOutOfRange {
            line: index as u64 + 1,
            line_count,
        }
    }
}
