//! Spending cap rule
//!
//! Caps are walked in list order and the first one the amount breaches ends
//! the evaluation. A hard cap blocks; a soft cap sends the transaction down
//! the approval path.

use super::{format_amount, Rule, RuleCategory, DEFAULT_APPROVAL_CHAIN};
use crate::context::{CapKind, ValidationContext};
use crate::result::ValidationResult;

pub const RULE_ID: &str = "cap-breach";

/// Checks the amount against each enabled cap
#[derive(Debug)]
pub struct CapBreachRule {
    /// Approval chain suggested for soft-cap breaches
    approval_chain: String,
}

impl Default for CapBreachRule {
    fn default() -> Self {
        Self::new()
    }
}

impl CapBreachRule {
    pub fn new() -> Self {
        Self {
            approval_chain: DEFAULT_APPROVAL_CHAIN.to_string(),
        }
    }

    /// Set the approval chain suggested for soft-cap breaches
    pub fn with_approval_chain(mut self, chain: impl Into<String>) -> Self {
        self.approval_chain = chain.into();
        self
    }
}

impl Rule for CapBreachRule {
    fn id(&self) -> &str {
        RULE_ID
    }

    fn name(&self) -> &str {
        "Cap breach"
    }

    fn description(&self) -> &str {
        "Blocks on hard-cap breaches and escalates soft-cap breaches to approval"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Caps
    }

    fn is_applicable(&self, context: &ValidationContext) -> bool {
        context.caps.iter().any(|c| c.is_enabled())
    }

    fn evaluate(&self, context: &ValidationContext) -> Option<ValidationResult> {
        let cap = context
            .caps
            .iter()
            .find(|c| c.is_breached_by(context.amount))?;

        let reason = format!(
            "{} {} cap exceeded: {} requested, {} remaining",
            cap.name,
            cap.kind,
            format_amount(context.amount),
            format_amount(cap.remaining()),
        );

        let result = match cap.kind {
            CapKind::Hard => ValidationResult::block(reason, "Reduce the amount or request an exception"),
            CapKind::Soft => ValidationResult::approval_required(
                reason,
                "Submit for approval or request an exception",
            )
            .with_approval_hint(self.approval_chain.clone()),
        };

        Some(result.triggered_by(RULE_ID))
    }
}
