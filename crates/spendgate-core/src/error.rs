//! Error types for the policy engine boundary
//!
//! The engine itself never fails: a hard stop is expressed as a blocked
//! [`ValidationResult`](crate::ValidationResult). These errors are raised only
//! where callers construct inputs (contexts and profiles) before evaluation.

use thiserror::Error;

/// Error raised while constructing engine inputs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The validation context is malformed (negative amounts, duplicate keys, ...)
    #[error("Invalid context: {0}")]
    InvalidContext(String),

    /// The profile definition is malformed
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// No built-in profile exists with the requested name
    #[error("Unknown profile '{0}'")]
    UnknownProfile(String),
}

impl PolicyError {
    /// Create an invalid context error
    pub fn invalid_context(msg: impl Into<String>) -> Self {
        PolicyError::InvalidContext(msg.into())
    }

    /// Create an invalid profile error
    pub fn invalid_profile(msg: impl Into<String>) -> Self {
        PolicyError::InvalidProfile(msg.into())
    }

    /// Check if this error was caused by caller-supplied input
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            PolicyError::InvalidContext(_)
                | PolicyError::InvalidProfile(_)
                | PolicyError::UnknownProfile(_)
        )
    }
}

/// Result type alias for input construction
pub type Result<T> = std::result::Result<T, PolicyError>;
