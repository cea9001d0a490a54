//! Selection sensitivity rule

use super::{Rule, RuleCategory};
use crate::context::{RiskLevel, ValidationContext};
use crate::result::ValidationResult;

pub const RULE_ID: &str = "high-risk-selection";

/// Warns when the chosen category or purpose is high-sensitivity
#[derive(Debug, Default)]
pub struct HighRiskSelectionRule;

impl HighRiskSelectionRule {
    pub fn new() -> Self {
        Self
    }
}

impl Rule for HighRiskSelectionRule {
    fn id(&self) -> &str {
        RULE_ID
    }

    fn name(&self) -> &str {
        "High-risk selection"
    }

    fn description(&self) -> &str {
        "Warns when the selected category or purpose is high-sensitivity"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Risk
    }

    fn evaluate(&self, context: &ValidationContext) -> Option<ValidationResult> {
        if context.selected_risk != Some(RiskLevel::High) {
            return None;
        }

        Some(
            ValidationResult::warn(
                "Selected option is high-sensitivity",
                "Double-check details before continuing",
            )
            .triggered_by(RULE_ID),
        )
    }
}
