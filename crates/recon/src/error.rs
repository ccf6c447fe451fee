use std::fmt;

/// Whole-call failures. Per-record data-quality problems never surface here;
/// they are folded into the reconciliation report instead.
#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty strategy list, bad token length, etc.).
    ConfigValidation(String),
    /// A client record violates the input contract (e.g. no email address).
    MalformedClient { row: usize, reason: String },
    /// A corpus entry violates the input contract (e.g. empty local path).
    MalformedDocument { source_path: String, reason: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MalformedClient { row, reason } => {
                write!(f, "client at row {row}: {reason}")
            }
            Self::MalformedDocument { source_path, reason } => {
                write!(f, "document '{source_path}': {reason}")
            }
        }
    }
}

impl std::error::Error for ReconError {}
