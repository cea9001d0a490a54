//! CLI module for SpendGate
//!
//! Evaluates contexts from files, lists profiles and replays context
//! sequences. Exit codes mirror the result level so the binary can gate
//! scripts and CI checks.

pub mod commands;
pub mod output;

pub use commands::{Commands, SpendGateCli};
pub use output::{OutputFormat, ResultOutput};

use spendgate_core::ResultLevel;

use crate::error::{AgentError, Result};

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Ready to proceed
    Ready = 0,
    /// Blocked
    Blocked = 1,
    /// Ready with warnings
    Warning = 2,
    /// Invalid input or arguments
    InvalidInput = 3,
    /// File not found or inaccessible
    FileError = 4,
    /// Unknown or malformed profile
    ProfileError = 5,
    /// Approval required before proceeding
    ApprovalRequired = 6,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Determine exit code from a result level
    pub fn from_level(level: ResultLevel) -> Self {
        match level {
            ResultLevel::Ok => ExitCode::Ready,
            ResultLevel::Warn => ExitCode::Warning,
            ResultLevel::ApprovalRequired => ExitCode::ApprovalRequired,
            ResultLevel::Block => ExitCode::Blocked,
        }
    }

    /// Determine exit code from a failed command
    pub fn from_error(err: &AgentError) -> Self {
        match err {
            AgentError::InvalidInput(_) | AgentError::ParseError(_) => ExitCode::InvalidInput,
            AgentError::FileError(_) => ExitCode::FileError,
            AgentError::ProfileError(_) => ExitCode::ProfileError,
            AgentError::SerializationError(_)
            | AgentError::Telemetry(_)
            | AgentError::InternalError(_) => ExitCode::InternalError,
        }
    }
}

/// Run the CLI with the given arguments and return the exit code
pub fn run(cli: SpendGateCli) -> Result<ExitCode> {
    let quiet = cli.quiet;
    match cli.command {
        Commands::Evaluate {
            context,
            profile,
            format,
        } => commands::execute_evaluate(context, profile, format, quiet),
        Commands::Profiles { format } => commands::execute_profiles(format, quiet),
        Commands::Transitions {
            contexts,
            profile,
            format,
        } => commands::execute_transitions(contexts, profile, format, quiet),
    }
}
