//! Output formatting for the SpendGate CLI
//!
//! JSON and YAML for machines, and a colored table for people, with the
//! result level driving the color.

use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use spendgate_core::{Evaluation, PolicyProfile, ResultLevel, ValidationResult};

use crate::error::{AgentError, Result};
use crate::telemetry::DecisionEvent;

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table format with colors
    #[default]
    Table,
    /// JSON format for machine processing
    Json,
    /// YAML format
    Yaml,
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| AgentError::SerializationError(e.to_string()))
}

fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| AgentError::SerializationError(e.to_string()))
}

fn level_marker(level: ResultLevel) -> ColoredString {
    match level {
        ResultLevel::Ok => "+".green(),
        ResultLevel::Warn => "!".yellow(),
        ResultLevel::ApprovalRequired => "?".blue(),
        ResultLevel::Block => "x".red(),
    }
}

fn colored_headline(level: ResultLevel, headline: &str) -> ColoredString {
    match level {
        ResultLevel::Ok => headline.green().bold(),
        ResultLevel::Warn => headline.yellow().bold(),
        ResultLevel::ApprovalRequired => headline.blue().bold(),
        ResultLevel::Block => headline.red().bold(),
    }
}

/// Evaluation output structure for rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultOutput {
    /// Profile the engine was built from
    pub profile: String,
    /// The decision
    #[serde(flatten)]
    pub result: ValidationResult,
    /// Rules consulted before the decision
    pub rules_checked: Vec<String>,
}

impl ResultOutput {
    pub fn from_evaluation(profile: impl Into<String>, evaluation: Evaluation) -> Self {
        Self {
            profile: profile.into(),
            result: evaluation.result,
            rules_checked: evaluation.rules_checked,
        }
    }

    /// Render output in the specified format
    pub fn render(&self, format: OutputFormat) -> Result<()> {
        println!("{}", self.format(format)?);
        Ok(())
    }

    pub fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => to_json(self),
            OutputFormat::Yaml => to_yaml(self),
            OutputFormat::Table => Ok(self.table()),
        }
    }

    fn table(&self) -> String {
        let result = &self.result;
        let mut out = String::new();

        writeln!(out).ok();
        writeln!(out, "{}", format!("Policy Check ({})", self.profile).cyan().bold()).ok();
        writeln!(out, "{}", "=".repeat(60)).ok();
        writeln!(
            out,
            "{} {}",
            level_marker(result.level),
            colored_headline(result.level, &result.headline)
        )
        .ok();
        writeln!(out).ok();

        writeln!(out, "{}", "Reasons:".cyan().bold()).ok();
        for reason in &result.reasons {
            writeln!(out, "  {} {}", "-".blue(), reason).ok();
        }
        writeln!(out).ok();

        writeln!(out, "{}", "Next steps:".cyan().bold()).ok();
        for step in &result.next_steps {
            writeln!(out, "  {} {}", "->".blue(), step).ok();
        }

        if let Some(hint) = &result.approval_hint {
            writeln!(out).ok();
            writeln!(out, "{} {}", "Approval chain:".cyan().bold(), hint).ok();
        }

        writeln!(out).ok();
        writeln!(
            out,
            "{} {}",
            "Decided by:".dimmed(),
            result.triggered_by.as_deref().unwrap_or("no rule fired")
        )
        .ok();
        writeln!(
            out,
            "{} {}",
            "Rules checked:".dimmed(),
            self.rules_checked.join(", ")
        )
        .ok();

        out
    }
}

/// One row of the profile listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileOutput {
    pub name: String,
    pub description: String,
    pub rules: Vec<String>,
    pub approval_chain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_notes_chars: Option<u32>,
}

impl From<&PolicyProfile> for ProfileOutput {
    fn from(profile: &PolicyProfile) -> Self {
        Self {
            name: profile.name.clone(),
            description: profile.description.clone(),
            rules: profile.rules.iter().map(|k| k.id().to_string()).collect(),
            approval_chain: profile.approval_chain.clone(),
            min_notes_chars: profile.min_notes_chars,
        }
    }
}

/// Render a profile listing
pub fn format_profiles(profiles: &[PolicyProfile], format: OutputFormat) -> Result<String> {
    let rows: Vec<ProfileOutput> = profiles.iter().map(ProfileOutput::from).collect();

    match format {
        OutputFormat::Json => to_json(&rows),
        OutputFormat::Yaml => to_yaml(&rows),
        OutputFormat::Table => {
            let mut out = String::new();
            writeln!(out, "{}", "Profiles".cyan().bold()).ok();
            writeln!(out, "{}", "=".repeat(60)).ok();
            for row in &rows {
                writeln!(out).ok();
                writeln!(out, "{} {}", row.name.green().bold(), row.description.dimmed()).ok();
                for (rank, rule) in row.rules.iter().enumerate() {
                    writeln!(out, "  {:>2}. {}", rank + 1, rule).ok();
                }
                writeln!(out, "  {} {}", "Approval chain:".cyan(), row.approval_chain).ok();
            }
            Ok(out)
        }
    }
}

/// Render the decision events of a context sequence
///
/// `steps` pairs each event with the 1-based position of the context that
/// produced it.
pub fn format_transitions(
    steps: &[(usize, DecisionEvent)],
    evaluated: usize,
    format: OutputFormat,
) -> Result<String> {
    #[derive(Serialize)]
    struct Step<'a> {
        step: usize,
        #[serde(flatten)]
        event: &'a DecisionEvent,
    }

    let rows: Vec<Step<'_>> = steps
        .iter()
        .map(|(step, event)| Step { step: *step, event })
        .collect();

    match format {
        OutputFormat::Json => to_json(&rows),
        OutputFormat::Yaml => to_yaml(&rows),
        OutputFormat::Table => {
            let mut out = String::new();
            writeln!(
                out,
                "{}",
                format!("Level transitions ({} of {} contexts)", rows.len(), evaluated)
                    .cyan()
                    .bold()
            )
            .ok();
            writeln!(out, "{}", "-".repeat(60)).ok();
            for row in &rows {
                let from = row
                    .event
                    .previous_level
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "start".to_string());
                writeln!(
                    out,
                    "{:>4}  {} {} -> {}  {}",
                    format!("#{}", row.step),
                    level_marker(row.event.level),
                    from,
                    colored_headline(row.event.level, &row.event.level.to_string()),
                    row.event.reason
                )
                .ok();
            }
            Ok(out)
        }
    }
}
