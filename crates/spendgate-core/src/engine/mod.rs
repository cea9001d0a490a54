//! Policy engine
//!
//! The engine is an ordered list of rules. Evaluation walks the list and the
//! first rule that fires decides the outcome; later rules are never looked
//! at. When nothing fires the clean pass is returned.

pub mod rules;

use rules::{
    caps::CapBreachRule, funding::FundingDepletedRule, notes::ShortNotesRule,
    required::RequiredFieldsRule, risk::HighRiskSelectionRule,
    service::{PastDueGraceRule, SuspendedServiceRule},
    threshold::ApprovalThresholdRule, BoxedRule, Rule, RuleCategory, RuleInfo, RuleKind,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::context::ValidationContext;
use crate::error::Result;
use crate::profile::PolicyProfile;
use crate::result::ValidationResult;

/// Result of an evaluation together with the rules that were consulted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// The decision
    pub result: ValidationResult,
    /// Ids of the applicable rules consulted, in order
    pub rules_checked: Vec<String>,
}

/// The policy validation engine
///
/// Holds nothing but its rule list, so it can be shared freely across
/// threads and every call is independent of the previous ones.
#[derive(Clone)]
pub struct PolicyEngine {
    name: String,
    rules: Vec<Arc<dyn Rule>>,
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PolicyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyEngine")
            .field("name", &self.name)
            .field("rules", &self.rules.iter().map(|r| r.id()).collect::<Vec<_>>())
            .finish()
    }
}

impl PolicyEngine {
    /// Create an engine with the checkout rule order
    pub fn new() -> Self {
        let mut engine = Self::empty().with_name("checkout");
        engine.register_default_rules();
        engine
    }

    /// Create an engine without rules; every context passes
    pub fn empty() -> Self {
        Self {
            name: "custom".to_string(),
            rules: Vec::new(),
        }
    }

    /// Build the engine described by a profile
    ///
    /// Fails unless the profile passes [`PolicyProfile::validate`], so rules
    /// always run in the default precedence.
    pub fn from_profile(profile: &PolicyProfile) -> Result<Self> {
        profile.validate()?;

        let mut engine = Self::empty().with_name(profile.name.clone());
        for kind in &profile.rules {
            engine.register(build_rule(*kind, profile));
        }
        Ok(engine)
    }

    fn register_default_rules(&mut self) {
        self.register(Arc::new(SuspendedServiceRule::new()));
        self.register(Arc::new(FundingDepletedRule::new()));
        self.register(Arc::new(RequiredFieldsRule::new()));
        self.register(Arc::new(CapBreachRule::new()));
        self.register(Arc::new(ApprovalThresholdRule::new()));
        self.register(Arc::new(HighRiskSelectionRule::new()));
        self.register(Arc::new(PastDueGraceRule::new()));
    }

    /// Append a rule at the end of the evaluation order
    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Append a boxed rule
    pub fn register_boxed(&mut self, rule: BoxedRule) {
        self.rules.push(Arc::from(rule));
    }

    /// Set the engine name (usually the profile it was built from)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered rules in evaluation order
    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    /// Descriptions of the registered rules in evaluation order
    pub fn rule_infos(&self) -> Vec<RuleInfo> {
        self.rules.iter().map(|r| RuleInfo::of(r.as_ref())).collect()
    }

    /// Get rules by category
    pub fn rules_by_category(&self, category: RuleCategory) -> Vec<Arc<dyn Rule>> {
        self.rules
            .iter()
            .filter(|r| r.category() == category)
            .cloned()
            .collect()
    }

    /// Evaluate a context
    ///
    /// Deterministic and side-effect free: the same context always yields
    /// the same result.
    pub fn evaluate(&self, context: &ValidationContext) -> ValidationResult {
        self.rules
            .iter()
            .filter(|rule| rule.is_applicable(context))
            .find_map(|rule| rule.evaluate(context))
            .unwrap_or_else(ValidationResult::passed)
    }

    /// Evaluate a context and report which rules were consulted
    pub fn evaluate_detailed(&self, context: &ValidationContext) -> Evaluation {
        let mut rules_checked = Vec::new();

        for rule in self.rules.iter().filter(|r| r.is_applicable(context)) {
            rules_checked.push(rule.id().to_string());
            if let Some(result) = rule.evaluate(context) {
                return Evaluation {
                    result,
                    rules_checked,
                };
            }
        }

        Evaluation {
            result: ValidationResult::passed(),
            rules_checked,
        }
    }
}

/// Instantiate a built-in rule with the settings of `profile`
fn build_rule(kind: RuleKind, profile: &PolicyProfile) -> Arc<dyn Rule> {
    match kind {
        RuleKind::ServiceSuspended => Arc::new(SuspendedServiceRule::new()),
        RuleKind::FundingDepleted => Arc::new(FundingDepletedRule::new()),
        RuleKind::RequiredFields => Arc::new(RequiredFieldsRule::new()),
        RuleKind::CapBreach => {
            Arc::new(CapBreachRule::new().with_approval_chain(profile.soft_cap_chain()))
        }
        RuleKind::ApprovalThreshold => {
            Arc::new(ApprovalThresholdRule::new().with_approval_chain(profile.approval_chain.clone()))
        }
        RuleKind::HighRiskSelection => Arc::new(HighRiskSelectionRule::new()),
        RuleKind::ShortNotes => Arc::new(ShortNotesRule::new(
            profile
                .min_notes_chars
                .unwrap_or(rules::notes::DEFAULT_MIN_NOTES_CHARS),
        )),
        RuleKind::PastDueGrace => Arc::new(PastDueGraceRule::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Cap, ServiceStatus};
    use crate::result::ResultLevel;
    use rust_decimal::Decimal;

    struct AlwaysWarn;

    impl Rule for AlwaysWarn {
        fn id(&self) -> &str {
            "always-warn"
        }
        fn name(&self) -> &str {
            "Always warn"
        }
        fn description(&self) -> &str {
            "test rule"
        }
        fn category(&self) -> RuleCategory {
            RuleCategory::Risk
        }
        fn evaluate(&self, _context: &ValidationContext) -> Option<ValidationResult> {
            Some(ValidationResult::warn("always", "ignore").triggered_by("always-warn"))
        }
    }

    #[test]
    fn test_empty_engine_passes_everything() {
        let engine = PolicyEngine::empty();
        assert!(engine.rules().is_empty());

        let ctx = ValidationContext::builder()
            .service_status(ServiceStatus::Suspended)
            .build_unchecked();
        assert_eq!(engine.evaluate(&ctx), ValidationResult::passed());
    }

    #[test]
    fn test_default_engine_rule_order() {
        let ids: Vec<_> = PolicyEngine::new().rule_infos().into_iter().map(|r| r.id).collect();
        assert_eq!(
            ids,
            vec![
                "service-suspended",
                "funding-depleted",
                "required-fields",
                "cap-breach",
                "approval-threshold",
                "high-risk-selection",
                "past-due-grace",
            ]
        );
    }

    #[test]
    fn test_first_firing_rule_wins() {
        let mut engine = PolicyEngine::empty();
        engine.register_boxed(Box::new(AlwaysWarn));
        engine.register(Arc::new(SuspendedServiceRule::new()));

        let ctx = ValidationContext::builder()
            .service_status(ServiceStatus::Suspended)
            .build_unchecked();
        let result = engine.evaluate(&ctx);
        assert_eq!(result.level, ResultLevel::Warn);
        assert_eq!(result.triggered_by.as_deref(), Some("always-warn"));
    }

    #[test]
    fn test_evaluate_detailed_lists_checked_rules() {
        let engine = PolicyEngine::new();
        let ctx = ValidationContext::builder()
            .amount(Decimal::from(600))
            .cap(Cap::hard("Daily", Decimal::from(500), Decimal::ZERO))
            .build_unchecked();

        let evaluation = engine.evaluate_detailed(&ctx);
        assert_eq!(evaluation.result.level, ResultLevel::Block);
        assert_eq!(
            evaluation.rules_checked,
            vec!["service-suspended", "funding-depleted", "cap-breach"]
        );
        assert_eq!(evaluation.result, engine.evaluate(&ctx));
    }

    #[test]
    fn test_rules_by_category() {
        let engine = PolicyEngine::new();
        assert_eq!(engine.rules_by_category(RuleCategory::Service).len(), 2);
        assert!(engine.rules_by_category(RuleCategory::Quality).is_empty());
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PolicyEngine>();
    }
}
