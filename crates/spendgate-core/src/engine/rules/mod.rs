//! Rule framework for policy evaluation
//!
//! A rule inspects a [`ValidationContext`] and either stays silent or produces
//! the terminal [`ValidationResult`]. The engine walks rules in order and
//! stops at the first one that fires.

pub mod caps;
pub mod funding;
pub mod notes;
pub mod required;
pub mod risk;
pub mod service;
pub mod threshold;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::context::ValidationContext;
use crate::result::ValidationResult;

/// Default escalation chain for approval outcomes
pub const DEFAULT_APPROVAL_CHAIN: &str = "Manager, then Finance if high-value";

/// Categories of policy rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    /// Account billing state
    Service,
    /// Availability of the selected funding source
    Funding,
    /// Mandatory form fields
    Required,
    /// Spending caps
    Caps,
    /// Approval threshold
    Approval,
    /// Sensitivity of the selection
    Risk,
    /// Quality of free-text input
    Quality,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCategory::Service => write!(f, "service"),
            RuleCategory::Funding => write!(f, "funding"),
            RuleCategory::Required => write!(f, "required"),
            RuleCategory::Caps => write!(f, "caps"),
            RuleCategory::Approval => write!(f, "approval"),
            RuleCategory::Risk => write!(f, "risk"),
            RuleCategory::Quality => write!(f, "quality"),
        }
    }
}

/// Declarative name of a built-in rule, as written in profile files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    ServiceSuspended,
    FundingDepleted,
    RequiredFields,
    CapBreach,
    ApprovalThreshold,
    HighRiskSelection,
    ShortNotes,
    PastDueGrace,
}

impl RuleKind {
    /// Every built-in rule in default evaluation order
    pub const DEFAULT_ORDER: [RuleKind; 8] = [
        RuleKind::ServiceSuspended,
        RuleKind::FundingDepleted,
        RuleKind::RequiredFields,
        RuleKind::CapBreach,
        RuleKind::ApprovalThreshold,
        RuleKind::HighRiskSelection,
        RuleKind::ShortNotes,
        RuleKind::PastDueGrace,
    ];

    /// Id of the rule this kind builds
    pub fn id(&self) -> &'static str {
        match self {
            RuleKind::ServiceSuspended => service::SUSPENDED_RULE_ID,
            RuleKind::FundingDepleted => funding::RULE_ID,
            RuleKind::RequiredFields => required::RULE_ID,
            RuleKind::CapBreach => caps::RULE_ID,
            RuleKind::ApprovalThreshold => threshold::RULE_ID,
            RuleKind::HighRiskSelection => risk::RULE_ID,
            RuleKind::ShortNotes => notes::RULE_ID,
            RuleKind::PastDueGrace => service::PAST_DUE_RULE_ID,
        }
    }

    /// Position in the default evaluation order
    pub fn default_rank(&self) -> usize {
        Self::DEFAULT_ORDER
            .iter()
            .position(|k| k == self)
            .unwrap_or(Self::DEFAULT_ORDER.len())
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Trait for implementing policy rules
///
/// Rules are pure: they read the context and return an outcome without
/// touching any state. A rule that returns `Some` ends the evaluation.
pub trait Rule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> &str;

    /// Human-readable name for this rule
    fn name(&self) -> &str;

    /// Description of what this rule checks
    fn description(&self) -> &str;

    /// Category this rule belongs to
    fn category(&self) -> RuleCategory;

    /// Check if this rule applies to the given context
    fn is_applicable(&self, _context: &ValidationContext) -> bool {
        true
    }

    /// Evaluate the rule; `None` means the rule did not fire
    fn evaluate(&self, context: &ValidationContext) -> Option<ValidationResult>;
}

/// A boxed rule for dynamic dispatch
pub type BoxedRule = Box<dyn Rule>;

/// Static description of a registered rule, for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleInfo {
    pub id: String,
    pub name: String,
    pub category: RuleCategory,
    pub description: String,
}

impl RuleInfo {
    pub fn of(rule: &dyn Rule) -> Self {
        Self {
            id: rule.id().to_string(),
            name: rule.name().to_string(),
            category: rule.category(),
            description: rule.description().to_string(),
        }
    }
}

/// Render an amount without trailing zeros
pub(crate) fn format_amount(amount: Decimal) -> String {
    amount.normalize().to_string()
}
