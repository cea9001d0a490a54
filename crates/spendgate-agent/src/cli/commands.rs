//! CLI command definitions for SpendGate
//!
//! Clap-based commands for evaluating a context, listing the built-in
//! profiles, and replaying a sequence of contexts to see level transitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use spendgate_core::{PolicyEngine, PolicyProfile};

use super::output::{format_profiles, format_transitions, OutputFormat, ResultOutput};
use super::ExitCode;
use crate::error::Result;
use crate::loader::{load_context, load_contexts, load_profile};
use crate::telemetry::TransitionTracker;

/// SpendGate CLI
///
/// Decide whether a spend can proceed, needs approval, or is blocked.
#[derive(Parser, Debug)]
#[command(name = "spendgate")]
#[command(about = "SpendGate - Evaluate spending policy for checkout and attestation screens", long_about = None)]
#[command(version)]
pub struct SpendGateCli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a single context
    ///
    /// The exit code reflects the result level, so scripts can branch on it.
    Evaluate {
        /// Context file (JSON, YAML or TOML)
        #[arg(short, long)]
        context: PathBuf,

        /// Built-in profile name or profile file
        #[arg(short, long, env = "SPENDGATE_PROFILE", default_value = "checkout")]
        profile: String,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// List the built-in profiles and their rule order
    Profiles {
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Evaluate a sequence of contexts and report level transitions
    ///
    /// Each context stands for one state of a screen; an event is printed
    /// whenever the level differs from the previous state.
    Transitions {
        /// File holding a list of contexts (JSON, YAML or TOML)
        #[arg(short, long)]
        contexts: PathBuf,

        /// Built-in profile name or profile file
        #[arg(short, long, env = "SPENDGATE_PROFILE", default_value = "checkout")]
        profile: String,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

fn build_engine(profile: &str) -> Result<(PolicyProfile, PolicyEngine)> {
    let profile = load_profile(profile)?;
    let engine = PolicyEngine::from_profile(&profile)?;
    Ok((profile, engine))
}

/// Execute the evaluate command
pub fn execute_evaluate(
    context: PathBuf,
    profile: String,
    format: OutputFormat,
    quiet: bool,
) -> Result<ExitCode> {
    let ctx = load_context(&context)?;
    let (profile, engine) = build_engine(&profile)?;

    let evaluation = engine.evaluate_detailed(&ctx);
    let level = evaluation.result.level;
    tracing::info!(
        profile = %profile.name,
        level = %level,
        rule = evaluation.result.triggered_by.as_deref().unwrap_or("default"),
        checked = evaluation.rules_checked.len(),
        "Evaluated context"
    );

    if !quiet {
        ResultOutput::from_evaluation(&profile.name, evaluation).render(format)?;
    }

    Ok(ExitCode::from_level(level))
}

/// Execute the profiles command
pub fn execute_profiles(format: OutputFormat, quiet: bool) -> Result<ExitCode> {
    let profiles = PolicyProfile::builtins();
    if !quiet {
        println!("{}", format_profiles(&profiles, format)?);
    }
    Ok(ExitCode::Ready)
}

/// Execute the transitions command
///
/// Exits with the code of the last context's level.
pub fn execute_transitions(
    contexts: PathBuf,
    profile: String,
    format: OutputFormat,
    quiet: bool,
) -> Result<ExitCode> {
    let sequence = load_contexts(&contexts)?;
    let (profile, engine) = build_engine(&profile)?;

    let mut tracker = TransitionTracker::new(profile.name.clone());
    let mut steps = Vec::new();
    let mut exit_code = ExitCode::Ready;

    for (index, ctx) in sequence.iter().enumerate() {
        let result = engine.evaluate(ctx);
        exit_code = ExitCode::from_level(result.level);

        if let Some(event) = tracker.observe(ctx, &result) {
            tracing::info!(step = index + 1, "{}", event.summary());
            steps.push((index + 1, event));
        }
    }

    if !quiet {
        println!("{}", format_transitions(&steps, sequence.len(), format)?);
    }

    Ok(exit_code)
}
