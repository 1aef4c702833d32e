//! Error handling for checker orchestration.
//!
//! A `CheckError` is what a checker reports when it could not do its job at
//! all. It is distinct from a `Problem`, which is a finding about the domain,
//! and from a not-applicable outcome, which is not an error.

use std::fmt;

/// Main error type for checker and configuration failures.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckError {
    /// A checker failed to complete (lookup failure, unexpected I/O, etc.)
    Malfunction {
        checker: String,
        message: String,
    },

    /// A checker panicked; the panic was caught at its task boundary
    Panicked {
        checker: String,
        message: String,
    },

    /// Configuration errors (invalid settings, etc.)
    ConfigError {
        message: String,
    },

    /// File I/O errors when reading configuration
    FileError {
        path: String,
        message: String,
    },

    /// Generic internal errors that don't fit other categories
    Internal {
        message: String,
    },
}

impl CheckError {
    /// Create a new malfunction error for the named checker.
    pub fn malfunction<C: Into<String>, M: Into<String>>(checker: C, message: M) -> Self {
        Self::Malfunction {
            checker: checker.into(),
            message: message.into(),
        }
    }

    /// Create an error describing a caught panic.
    pub fn panicked<C: Into<String>, M: Into<String>>(checker: C, message: M) -> Self {
        Self::Panicked {
            checker: checker.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error was derived from a caught panic.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Panicked { .. })
    }

    /// Name of the checker that produced this error, if any.
    pub fn checker(&self) -> Option<&str> {
        match self {
            Self::Malfunction { checker, .. } | Self::Panicked { checker, .. } => Some(checker),
            _ => None,
        }
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malfunction { checker, message } => {
                write!(f, "Checker '{}' failed: {}", checker, message)
            }
            Self::Panicked { checker, message } => {
                write!(f, "Checker '{}' panicked: {}", checker, message)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for CheckError {}

impl From<std::io::Error> for CheckError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<toml::de::Error> for CheckError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}

impl From<serde_json::Error> for CheckError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal {
            message: format!("JSON serialization failed: {}", err),
        }
    }
}
