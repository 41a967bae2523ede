//! # Handle Validation View State
//!
//! Snapshot of the handle field on the sign-up and profile screens, plus the
//! pure normalization and format rules the validator applies on every edit.
//!
//! # Invariants
//!
//! - `availability` is `None` whenever `format_error` is `Some`
//! - "Taken" is derived from `availability == Some(false)`; it is never stored
//!   as a format error
//! - At most one of `is_debouncing` and `is_checking` is true

use kite_core::HandleRules;
use serde::{Deserialize, Serialize};

/// User-facing text shown when the backend reports the handle as taken.
pub const TAKEN_MESSAGE: &str = "This handle is already taken";

/// Whether `c` may appear in a normalized handle.
#[inline]
pub fn is_handle_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
}

/// Normalize raw input: lowercase, drop characters outside `[a-z0-9_]`, and
/// keep at most `max_len` characters.
///
/// ```
/// use kite_app::views::handle::normalize_handle;
///
/// assert_eq!(normalize_handle("My-Name!", 30), "myname");
/// ```
pub fn normalize_handle(raw: &str, max_len: usize) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| is_handle_char(*c))
        .take(max_len)
        .collect()
}

/// Synchronous handle format failures, in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum HandleFormatError {
    /// Fewer than `min` characters
    #[error("Handle must be at least {min} characters")]
    TooShort {
        /// Minimum length
        min: usize,
    },
    /// More than `max` characters
    #[error("Handle must be at most {max} characters")]
    TooLong {
        /// Maximum length
        max: usize,
    },
    /// Contains a character outside `[a-z0-9_]`
    #[error("Handle can only contain lowercase letters, numbers, and underscores")]
    InvalidCharacters,
}

/// Apply the format rules to `value` and return the first one violated.
///
/// Normalized input can never trip `TooLong` or `InvalidCharacters`; both are
/// kept for callers validating text that did not pass through
/// [`normalize_handle`].
pub fn validate_handle_format(value: &str, rules: &HandleRules) -> Result<(), HandleFormatError> {
    let len = value.chars().count();
    if len < rules.min_len {
        return Err(HandleFormatError::TooShort { min: rules.min_len });
    }
    if len > rules.max_len {
        return Err(HandleFormatError::TooLong { max: rules.max_len });
    }
    if !value.chars().all(is_handle_char) {
        return Err(HandleFormatError::InvalidCharacters);
    }
    Ok(())
}

/// Coarse status for driving an indicator next to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleStatus {
    /// Nothing typed
    Empty,
    /// Format rule violated
    Invalid,
    /// Waiting for typing to settle
    Debouncing,
    /// Availability request outstanding
    Checking,
    /// Backend confirmed the handle is free
    Available,
    /// Backend reported the handle as taken
    Taken,
    /// Last check failed; availability unknown until retried
    Indeterminate,
}

/// Handle field state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleValidationState {
    /// Last input as typed
    pub raw_input: String,
    /// Canonical form of `raw_input`
    pub normalized_input: String,
    /// Synchronous format failure, if any
    pub format_error: Option<HandleFormatError>,
    /// Result of the last completed check for `normalized_input`
    pub availability: Option<bool>,
    /// A check for `normalized_input` is outstanding
    pub is_checking: bool,
    /// A check for `normalized_input` is scheduled but not dispatched
    pub is_debouncing: bool,
    /// The last check for `normalized_input` failed in transport
    pub check_failed: bool,
}

impl HandleValidationState {
    /// True when the handle can be submitted.
    pub fn is_ready(&self, min_len: usize) -> bool {
        self.normalized_input.chars().count() >= min_len
            && self.availability == Some(true)
            && !self.is_checking
            && !self.is_debouncing
            && self.format_error.is_none()
    }

    /// Text to show under the field, if any.
    ///
    /// Transport failures produce no text.
    pub fn error_message(&self) -> Option<String> {
        if let Some(err) = &self.format_error {
            return Some(err.to_string());
        }
        (self.availability == Some(false)).then(|| TAKEN_MESSAGE.to_string())
    }

    /// Derived status for indicators.
    pub fn status(&self) -> HandleStatus {
        if self.normalized_input.is_empty() {
            HandleStatus::Empty
        } else if self.format_error.is_some() {
            HandleStatus::Invalid
        } else if self.is_debouncing {
            HandleStatus::Debouncing
        } else if self.is_checking {
            HandleStatus::Checking
        } else {
            match self.availability {
                Some(true) => HandleStatus::Available,
                Some(false) => HandleStatus::Taken,
                None => HandleStatus::Indeterminate,
            }
        }
    }
}
