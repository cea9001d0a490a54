//! Error types for the SpendGate agent
//!
//! Covers everything around the engine: file access, context and profile
//! parsing, rendering and telemetry.

use spendgate_core::PolicyError;
use thiserror::Error;

/// Main error type for agent operations
#[derive(Error, Debug)]
pub enum AgentError {
    /// Invalid input data or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File access or I/O error
    #[error("File error: {0}")]
    FileError(String),

    /// Context or profile parsing error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Profile lookup or definition error
    #[error("Profile error: {0}")]
    ProfileError(String),

    /// Serialization error while rendering output
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Metrics registry error
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AgentError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        AgentError::InvalidInput(msg.into())
    }

    /// Create a file error
    pub fn file_error(msg: impl Into<String>) -> Self {
        AgentError::FileError(msg.into())
    }

    /// Create a parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        AgentError::ParseError(msg.into())
    }

    /// Check if this is a user-facing error (vs internal)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AgentError::InvalidInput(_)
                | AgentError::FileError(_)
                | AgentError::ParseError(_)
                | AgentError::ProfileError(_)
        )
    }
}

impl From<std::io::Error> for AgentError {
    fn from(err: std::io::Error) -> Self {
        AgentError::FileError(err.to_string())
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::ParseError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for AgentError {
    fn from(err: serde_yaml::Error) -> Self {
        AgentError::ParseError(format!("YAML error: {}", err))
    }
}

impl From<toml::de::Error> for AgentError {
    fn from(err: toml::de::Error) -> Self {
        AgentError::ParseError(format!("TOML error: {}", err))
    }
}

impl From<prometheus::Error> for AgentError {
    fn from(err: prometheus::Error) -> Self {
        AgentError::Telemetry(err.to_string())
    }
}

impl From<PolicyError> for AgentError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::InvalidContext(msg) => AgentError::InvalidInput(msg),
            PolicyError::InvalidProfile(_) | PolicyError::UnknownProfile(_) => {
                AgentError::ProfileError(err.to_string())
            }
        }
    }
}

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;
