use std::fmt;
use std::io;

/// Errors that abort an estimation run. None of them leave a partial report behind.
#[derive(Debug)]
pub enum EstimateError {
    /// The requested mode is not one of `D`, `C` or `DC`.
    InvalidMode(String),
    /// A size, count or budget parameter is zero.
    InvalidConfiguration(&'static str),
    /// Opening or reading the input failed.
    Io(io::Error),
}

impl fmt::Display for EstimateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimateError::InvalidMode(mode) => write!(f, "invalid mode: {mode:?}"),
            EstimateError::InvalidConfiguration(message) => {
                write!(f, "invalid configuration: {message}")
            }
            EstimateError::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for EstimateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EstimateError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for EstimateError {
    fn from(e: io::Error) -> Self {
        EstimateError::Io(e)
    }
}
