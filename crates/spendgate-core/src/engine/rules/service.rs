//! Billing-state rules
//!
//! A suspended account blocks every transaction. A past-due account still
//! passes, but the result says so, so that it can be told apart from a clean
//! pass.

use super::{Rule, RuleCategory};
use crate::context::{ServiceStatus, ValidationContext};
use crate::result::ValidationResult;

pub const SUSPENDED_RULE_ID: &str = "service-suspended";
pub const PAST_DUE_RULE_ID: &str = "past-due-grace";

/// Blocks when the service is suspended
#[derive(Debug, Default)]
pub struct SuspendedServiceRule;

impl SuspendedServiceRule {
    pub fn new() -> Self {
        Self
    }
}

impl Rule for SuspendedServiceRule {
    fn id(&self) -> &str {
        SUSPENDED_RULE_ID
    }

    fn name(&self) -> &str {
        "Service suspended"
    }

    fn description(&self) -> &str {
        "Blocks all spending while the account is suspended for billing non-compliance"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Service
    }

    fn evaluate(&self, context: &ValidationContext) -> Option<ValidationResult> {
        if context.service_status != ServiceStatus::Suspended {
            return None;
        }

        Some(
            ValidationResult::block(
                "Service suspended due to billing non-compliance",
                "Use an alternate payment method or contact your admin",
            )
            .with_headline("Service suspended")
            .triggered_by(SUSPENDED_RULE_ID),
        )
    }
}

/// Passes past-due accounts with an explicit grace-window note
#[derive(Debug, Default)]
pub struct PastDueGraceRule;

impl PastDueGraceRule {
    pub fn new() -> Self {
        Self
    }
}

impl Rule for PastDueGraceRule {
    fn id(&self) -> &str {
        PAST_DUE_RULE_ID
    }

    fn name(&self) -> &str {
        "Past-due grace window"
    }

    fn description(&self) -> &str {
        "Lets past-due accounts proceed while flagging the open grace window"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Service
    }

    fn evaluate(&self, context: &ValidationContext) -> Option<ValidationResult> {
        if context.service_status != ServiceStatus::PastDue {
            return None;
        }

        Some(
            ValidationResult::ok(
                "Account is past due; spending continues within the billing grace window",
                "Continue",
            )
            .with_next_step("Settle the overdue invoice before the grace window closes")
            .with_headline("Ready (past due)")
            .triggered_by(PAST_DUE_RULE_ID),
        )
    }
}
