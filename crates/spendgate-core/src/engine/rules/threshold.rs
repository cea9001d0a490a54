//! Approval threshold rule

use super::{format_amount, Rule, RuleCategory, DEFAULT_APPROVAL_CHAIN};
use crate::context::ValidationContext;
use crate::result::ValidationResult;

pub const RULE_ID: &str = "approval-threshold";

/// Requires approval for amounts strictly above the configured threshold
#[derive(Debug)]
pub struct ApprovalThresholdRule {
    approval_chain: String,
}

impl Default for ApprovalThresholdRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ApprovalThresholdRule {
    pub fn new() -> Self {
        Self {
            approval_chain: DEFAULT_APPROVAL_CHAIN.to_string(),
        }
    }

    /// Set the escalation chain reported in the approval hint
    pub fn with_approval_chain(mut self, chain: impl Into<String>) -> Self {
        self.approval_chain = chain.into();
        self
    }
}

impl Rule for ApprovalThresholdRule {
    fn id(&self) -> &str {
        RULE_ID
    }

    fn name(&self) -> &str {
        "Approval threshold"
    }

    fn description(&self) -> &str {
        "Requires approval when the amount is above the approval threshold"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Approval
    }

    fn is_applicable(&self, context: &ValidationContext) -> bool {
        context.approval_threshold.is_some()
    }

    fn evaluate(&self, context: &ValidationContext) -> Option<ValidationResult> {
        let threshold = context.approval_threshold?;
        if context.amount <= threshold {
            return None;
        }

        Some(
            ValidationResult::approval_required(
                format!(
                    "Amount {} exceeds the approval threshold of {}",
                    format_amount(context.amount),
                    format_amount(threshold)
                ),
                "Submit for approval",
            )
            .with_approval_hint(self.approval_chain.clone())
            .triggered_by(RULE_ID),
        )
    }
}
