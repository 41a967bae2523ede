//! Categorized application errors
//!
//! Classifies [`KiteError`]s for frontend treatment:
//! - user-correctable vs. transient vs. operational failures
//! - short labels and recovery hints for inline messages

use kite_core::KiteError;
use std::fmt;

/// High-level error categories for frontend error handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// User input validation errors (correctable by user)
    Input,
    /// Authorization errors
    Permission,
    /// Resource not found errors (transient or permanent)
    NotFound,
    /// Network connectivity errors (often transient)
    Network,
    /// General operation failures (catch-all)
    Operation,
}

impl ErrorCategory {
    /// Check if this error category is user-correctable.
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Input)
    }

    /// Check if this error category is likely transient.
    ///
    /// Transient errors may resolve on a manual retry. Nothing in the client
    /// core retries automatically.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network | Self::NotFound)
    }

    /// Get a short label for this category.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Permission => "Permission",
            Self::NotFound => "Not Found",
            Self::Network => "Network",
            Self::Operation => "Operation",
        }
    }

    /// Get a hint for the user on how to resolve this category of error.
    #[must_use]
    pub fn resolution_hint(&self) -> &'static str {
        match self {
            Self::Input => "Check your input and try again",
            Self::Permission => "You are not allowed to do that",
            Self::NotFound => "The requested resource could not be found",
            Self::Network => "Check your network connection and retry",
            Self::Operation => "Something went wrong, please try again",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<&KiteError> for ErrorCategory {
    fn from(err: &KiteError) -> Self {
        match err {
            KiteError::Invalid { .. } => Self::Input,
            KiteError::PermissionDenied { .. } => Self::Permission,
            KiteError::NotFound { .. } => Self::NotFound,
            KiteError::Network { .. } => Self::Network,
            KiteError::Backend { .. } | KiteError::Internal { .. } => Self::Operation,
        }
    }
}
