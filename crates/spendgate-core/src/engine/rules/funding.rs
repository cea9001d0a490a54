//! Funding availability rule

use super::{Rule, RuleCategory};
use crate::context::{FundingMode, FundingStatus, ValidationContext};
use crate::result::ValidationResult;

pub const RULE_ID: &str = "funding-depleted";

/// Blocks when the selected funding source cannot cover anything
///
/// A prepaid deposit with no runway left counts as depleted even if its
/// reported status still says otherwise.
#[derive(Debug, Default)]
pub struct FundingDepletedRule;

impl FundingDepletedRule {
    pub fn new() -> Self {
        Self
    }

    fn is_depleted(context: &ValidationContext) -> bool {
        context.selected_funding_status() == FundingStatus::Depleted
            || (context.funding_mode == FundingMode::Prepaid && context.prepaid_runway_days == 0)
    }
}

impl Rule for FundingDepletedRule {
    fn id(&self) -> &str {
        RULE_ID
    }

    fn name(&self) -> &str {
        "Funding depleted"
    }

    fn description(&self) -> &str {
        "Blocks when the selected wallet, credit line or prepaid deposit is depleted"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Funding
    }

    fn evaluate(&self, context: &ValidationContext) -> Option<ValidationResult> {
        if !Self::is_depleted(context) {
            return None;
        }

        let mode = context.funding_mode;
        let reason = match mode {
            FundingMode::Prepaid if context.prepaid_runway_days == 0 => {
                "Prepaid deposit is depleted (0 days of runway left) and unavailable".to_string()
            }
            _ => format!("{} is depleted and unavailable", capitalize(mode.label())),
        };

        Some(
            ValidationResult::block(reason, format!("Top up the {}", mode.label()))
                .with_next_step("Or switch to another funding method")
                .with_headline("Funding unavailable")
                .triggered_by(RULE_ID),
        )
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
