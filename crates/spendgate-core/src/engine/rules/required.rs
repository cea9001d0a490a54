//! Required field rule
//!
//! Fields are checked in the order the caller declared them and only the
//! first missing one is reported. The next one surfaces once the first is
//! fixed and the context is evaluated again.

use super::{Rule, RuleCategory};
use crate::context::ValidationContext;
use crate::result::ValidationResult;

pub const RULE_ID: &str = "required-fields";

/// Blocks on the first required field that is not provided
#[derive(Debug, Default)]
pub struct RequiredFieldsRule;

impl RequiredFieldsRule {
    pub fn new() -> Self {
        Self
    }
}

impl Rule for RequiredFieldsRule {
    fn id(&self) -> &str {
        RULE_ID
    }

    fn name(&self) -> &str {
        "Required fields"
    }

    fn description(&self) -> &str {
        "Blocks until every field flagged as required has been provided"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Required
    }

    fn is_applicable(&self, context: &ValidationContext) -> bool {
        !context.required_fields.is_empty()
    }

    fn evaluate(&self, context: &ValidationContext) -> Option<ValidationResult> {
        let missing = context.required_fields.iter().find(|f| f.is_missing())?;
        let label = missing.key.label();

        Some(
            ValidationResult::block(
                format!("{} is required but missing", label),
                format!("Provide the {}", label.to_lowercase()),
            )
            .with_headline("Missing information")
            .triggered_by(RULE_ID),
        )
    }
}
