//! Validation result: the output of a single evaluation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal decision state
///
/// `Warn` and `ApprovalRequired` are deliberately separate: the first lets
/// the user proceed silently, the second forces an approval submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultLevel {
    /// Ready to proceed
    Ok,
    /// Proceed, but double-check
    Warn,
    /// Gated: must be submitted for approval
    ApprovalRequired,
    /// Cannot proceed without remediation
    Block,
}

impl ResultLevel {
    /// Default headline for this level
    pub fn headline(&self) -> &'static str {
        match self {
            ResultLevel::Ok => "Ready",
            ResultLevel::Warn => "Ready with warnings",
            ResultLevel::ApprovalRequired => "Approval required",
            ResultLevel::Block => "Blocked",
        }
    }

    /// Whether the transaction is stopped
    pub fn is_blocking(&self) -> bool {
        matches!(self, ResultLevel::Block)
    }

    /// Whether the transaction must go through the approval flow
    pub fn requires_approval(&self) -> bool {
        matches!(self, ResultLevel::ApprovalRequired)
    }

    /// Whether the user may continue without any gate
    pub fn can_proceed(&self) -> bool {
        matches!(self, ResultLevel::Ok | ResultLevel::Warn)
    }
}

impl fmt::Display for ResultLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultLevel::Ok => write!(f, "ok"),
            ResultLevel::Warn => write!(f, "warn"),
            ResultLevel::ApprovalRequired => write!(f, "approval_required"),
            ResultLevel::Block => write!(f, "block"),
        }
    }
}

/// Outcome of an evaluation
///
/// Constructors require one reason and one next step, so neither list can be
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Decision level
    pub level: ResultLevel,
    /// Short human-readable summary
    pub headline: String,
    /// Why this level was reached
    pub reasons: Vec<String>,
    /// What the user should do
    pub next_steps: Vec<String>,
    /// Likely approval chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_hint: Option<String>,
    /// Id of the rule that produced this outcome; `None` for the default pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_by: Option<String>,
}

impl ValidationResult {
    /// Create a result with the level's default headline
    pub fn new(level: ResultLevel, reason: impl Into<String>, next_step: impl Into<String>) -> Self {
        Self {
            level,
            headline: level.headline().to_string(),
            reasons: vec![reason.into()],
            next_steps: vec![next_step.into()],
            approval_hint: None,
            triggered_by: None,
        }
    }

    pub fn ok(reason: impl Into<String>, next_step: impl Into<String>) -> Self {
        Self::new(ResultLevel::Ok, reason, next_step)
    }

    pub fn warn(reason: impl Into<String>, next_step: impl Into<String>) -> Self {
        Self::new(ResultLevel::Warn, reason, next_step)
    }

    pub fn approval_required(reason: impl Into<String>, next_step: impl Into<String>) -> Self {
        Self::new(ResultLevel::ApprovalRequired, reason, next_step)
    }

    pub fn block(reason: impl Into<String>, next_step: impl Into<String>) -> Self {
        Self::new(ResultLevel::Block, reason, next_step)
    }

    /// The clean pass returned when no rule fires
    pub fn passed() -> Self {
        Self::ok("All checks passed", "Continue")
    }

    /// Override the headline
    pub fn with_headline(mut self, headline: impl Into<String>) -> Self {
        self.headline = headline.into();
        self
    }

    /// Append a reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }

    /// Append a next step
    pub fn with_next_step(mut self, step: impl Into<String>) -> Self {
        self.next_steps.push(step.into());
        self
    }

    /// Set the approval chain hint
    pub fn with_approval_hint(mut self, hint: impl Into<String>) -> Self {
        self.approval_hint = Some(hint.into());
        self
    }

    /// Record the rule that produced this outcome
    pub fn triggered_by(mut self, rule_id: impl Into<String>) -> Self {
        self.triggered_by = Some(rule_id.into());
        self
    }

    /// First reason, for one-line displays
    pub fn primary_reason(&self) -> &str {
        self.reasons.first().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.headline, self.primary_reason())
    }
}
