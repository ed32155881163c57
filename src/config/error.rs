//! Configuration input error types.
//!
//! These errors never reach the user as failures. Every configuration read
//! recovers by substituting the field's default; the error only explains why.

use thiserror::Error;

use super::ConfigField;

/// Reasons a raw configuration input was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The input was empty or whitespace.
    #[error("{0} is blank")]
    Blank(ConfigField),

    /// The input could not be parsed as a number.
    #[error("{0} is not a number: '{1}'")]
    NotANumber(ConfigField, String),

    /// The input parsed but was zero or negative.
    #[error("{0} must be positive, got '{1}'")]
    NotPositive(ConfigField, String),

    /// The input does not fit the field's range.
    #[error("{0} is out of range: '{1}'")]
    OutOfRange(ConfigField, String),
}

impl ConfigError {
    /// Returns true if the input was empty.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank(_))
    }
}
