//! Integration tests for the policy engine
//!
//! Covers:
//! - Rule precedence across the full checkout rule list
//! - Hard vs soft cap outcomes
//! - Threshold boundaries
//! - Required field precedence
//! - End-to-end checkout scenarios
//! - Profile-built engines
//! - Determinism (property-based)

use proptest::prelude::*;
use rust_decimal::Decimal;
use spendgate_core::{
    evaluate, Cap, FieldKey, FieldPolicy, FundingMode, FundingStatus, PolicyEngine,
    PolicyError, PolicyProfile, ResultLevel, RiskLevel, RuleKind, ServiceStatus,
    ValidationContext,
};

fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

/// Healthy checkout context with every required field satisfied
fn healthy_context() -> ValidationContext {
    ValidationContext::builder()
        .service_status(ServiceStatus::Active)
        .funding_mode(FundingMode::Wallet)
        .amount(dec(50_000))
        .approval_threshold(dec(200_000))
        .field(FieldKey::CostCenter, FieldPolicy::Required, true)
        .field(FieldKey::Purpose, FieldPolicy::Required, true)
        .field(FieldKey::Notes, FieldPolicy::Optional, false)
        .field(FieldKey::Attachments, FieldPolicy::NotUsed, false)
        .field(FieldKey::ComplianceCheck, FieldPolicy::Required, true)
        .build()
        .unwrap()
}

#[test]
fn test_suspended_preempts_cap_breach() {
    let mut ctx = healthy_context();
    ctx.service_status = ServiceStatus::Suspended;
    ctx.caps.push(Cap::hard("Daily", dec(250_000), dec(240_000)));
    ctx.amount = dec(20_000);

    let result = evaluate(&ctx);
    assert_eq!(result.level, ResultLevel::Block);
    assert_eq!(result.triggered_by.as_deref(), Some("service-suspended"));
    assert!(result.reasons[0].contains("suspended"));
}

#[test]
fn test_funding_preempts_required_fields() {
    let ctx = ValidationContext::builder()
        .funding_mode(FundingMode::Credit)
        .funding_status(FundingMode::Credit, FundingStatus::Depleted)
        .field(FieldKey::CostCenter, FieldPolicy::Required, false)
        .build()
        .unwrap();

    let result = evaluate(&ctx);
    assert_eq!(result.triggered_by.as_deref(), Some("funding-depleted"));
    assert!(result.reasons[0].contains("Credit line"));
}

#[test]
fn test_hard_cap_blocks() {
    let mut ctx = healthy_context();
    ctx.amount = dec(20_000);
    ctx.caps = vec![Cap::hard("Daily", dec(250_000), dec(240_000))];

    let result = evaluate(&ctx);
    assert_eq!(result.level, ResultLevel::Block);
    assert!(result.reasons[0].contains("Daily"));
    assert!(result.reasons[0].contains("10000"));
    assert_eq!(result.next_steps, vec!["Reduce the amount or request an exception"]);
}

#[test]
fn test_soft_cap_requires_approval_with_hint() {
    let mut ctx = healthy_context();
    ctx.amount = dec(20_000);
    ctx.caps = vec![Cap::soft("Daily", dec(250_000), dec(240_000))];

    let result = evaluate(&ctx);
    assert_eq!(result.level, ResultLevel::ApprovalRequired);
    assert!(result.approval_hint.is_some());
    assert!(result.reasons[0].contains("10000"));
}

#[test]
fn test_soft_cap_stops_before_threshold() {
    let mut ctx = healthy_context();
    ctx.amount = dec(300_000);
    ctx.caps = vec![
        Cap::soft("Weekly", dec(400_000), dec(150_000)),
        Cap::hard("Monthly", dec(1_000_000), dec(900_000)),
    ];

    let result = evaluate(&ctx);
    assert_eq!(result.triggered_by.as_deref(), Some("cap-breach"));
    assert!(result.reasons[0].starts_with("Weekly"));
}

#[test]
fn test_threshold_boundary() {
    let mut ctx = healthy_context();
    ctx.amount = dec(200_000);
    assert_eq!(evaluate(&ctx).level, ResultLevel::Ok);

    ctx.amount = dec(200_001);
    let result = evaluate(&ctx);
    assert_eq!(result.level, ResultLevel::ApprovalRequired);
    assert!(result.reasons[0].contains("200000"));
    assert_eq!(result.next_steps, vec!["Submit for approval"]);
    assert_eq!(
        result.approval_hint.as_deref(),
        Some("Manager, then Finance if high-value")
    );
}

#[test]
fn test_required_field_precedence() {
    let mut ctx = healthy_context();
    ctx.required_fields[0].provided = false; // cost center
    ctx.required_fields[1].provided = false; // purpose

    let first = evaluate(&ctx);
    assert_eq!(first.level, ResultLevel::Block);
    assert_eq!(first.reasons.len(), 1);
    assert!(first.reasons[0].contains("Cost center"));
    assert!(!first.reasons[0].contains("Purpose"));

    ctx.required_fields[0].provided = true;
    let second = evaluate(&ctx);
    assert_eq!(second.reasons.len(), 1);
    assert!(second.reasons[0].contains("Purpose"));

    ctx.required_fields[1].provided = true;
    assert_eq!(evaluate(&ctx).level, ResultLevel::Ok);
}

#[test]
fn test_high_risk_warns_only_when_nothing_else_fires() {
    let mut ctx = healthy_context();
    ctx.selected_risk = Some(RiskLevel::High);
    assert_eq!(evaluate(&ctx).level, ResultLevel::Warn);

    ctx.amount = dec(250_000);
    assert_eq!(evaluate(&ctx).level, ResultLevel::ApprovalRequired);
}

#[test]
fn test_warn_and_approval_are_distinct() {
    let mut warn_ctx = healthy_context();
    warn_ctx.selected_risk = Some(RiskLevel::High);
    let warn = evaluate(&warn_ctx);

    let mut approval_ctx = healthy_context();
    approval_ctx.amount = dec(250_000);
    let approval = evaluate(&approval_ctx);

    assert_ne!(warn.level, approval.level);
    assert!(warn.level.can_proceed());
    assert!(approval.level.requires_approval());
    assert!(warn.approval_hint.is_none());
}

#[test]
fn test_scenario_a_prepaid_without_runway() {
    let ctx = ValidationContext::builder()
        .service_status(ServiceStatus::Active)
        .funding_mode(FundingMode::Prepaid)
        .prepaid_runway_days(0)
        .amount(dec(1_000))
        .build()
        .unwrap();

    let result = evaluate(&ctx);
    assert_eq!(result.level, ResultLevel::Block);
    assert!(result.reasons[0].contains("deposit"));
    assert!(result.reasons[0].contains("depleted"));
}

#[test]
fn test_scenario_b_clean_pass() {
    let result = evaluate(&healthy_context());
    assert_eq!(result.level, ResultLevel::Ok);
    assert_eq!(result.headline, "Ready");
    assert_eq!(result.reasons, vec!["All checks passed"]);
    assert_eq!(result.next_steps, vec!["Continue"]);
    assert!(result.triggered_by.is_none());
}

#[test]
fn test_scenario_c_past_due_is_distinguishable() {
    let clean = evaluate(&healthy_context());

    let mut ctx = healthy_context();
    ctx.service_status = ServiceStatus::PastDue;
    let past_due = evaluate(&ctx);

    assert_eq!(past_due.level, ResultLevel::Ok);
    assert_ne!(past_due.reasons, clean.reasons);
    assert!(past_due.reasons[0].contains("past due"));
    assert!(past_due.reasons[0].contains("grace"));
    assert_eq!(past_due.triggered_by.as_deref(), Some("past-due-grace"));
}

#[test]
fn test_attestation_profile_warns_on_short_notes() {
    let engine = PolicyEngine::from_profile(&PolicyProfile::attestation()).unwrap();
    let ctx = ValidationContext::builder()
        .field(FieldKey::Purpose, FieldPolicy::Required, true)
        .field(FieldKey::Notes, FieldPolicy::Required, true)
        .field(FieldKey::ComplianceCheck, FieldPolicy::Required, true)
        .notes_length(8)
        .build()
        .unwrap();

    let result = engine.evaluate(&ctx);
    assert_eq!(result.level, ResultLevel::Warn);
    assert_eq!(result.triggered_by.as_deref(), Some("short-notes"));
}

#[test]
fn test_attestation_ignores_funding() {
    let engine = PolicyEngine::from_profile(&PolicyProfile::attestation()).unwrap();
    let ctx = ValidationContext::builder()
        .funding_mode(FundingMode::Prepaid)
        .prepaid_runway_days(0)
        .build()
        .unwrap();
    assert_eq!(engine.evaluate(&ctx).level, ResultLevel::Ok);
}

#[test]
fn test_tag_picker_soft_cap_uses_guardian_chain() {
    let engine = PolicyEngine::from_profile(&PolicyProfile::tag_picker()).unwrap();
    let ctx = ValidationContext::builder()
        .amount(dec(40))
        .cap(Cap::soft("Snacks", dec(100), dec(80)))
        .build()
        .unwrap();

    let result = engine.evaluate(&ctx);
    assert_eq!(result.level, ResultLevel::ApprovalRequired);
    assert_eq!(result.approval_hint.as_deref(), Some("Parent or guardian"));
}

#[test]
fn test_reordered_profile_is_rejected() {
    let profile = PolicyProfile::new(
        "risk-first",
        vec![
            RuleKind::HighRiskSelection,
            RuleKind::CapBreach,
            RuleKind::ServiceSuspended,
        ],
    );
    assert!(matches!(
        PolicyEngine::from_profile(&profile),
        Err(PolicyError::InvalidProfile(_))
    ));
}

#[test]
fn test_every_builtin_profile_blocks_suspended_accounts() {
    let ctx = ValidationContext::builder()
        .service_status(ServiceStatus::Suspended)
        .amount(dec(20_000))
        .cap(Cap::soft("Daily", dec(250_000), dec(240_000)))
        .selected_risk(RiskLevel::High)
        .build()
        .unwrap();

    for profile in PolicyProfile::builtins() {
        let result = PolicyEngine::from_profile(&profile).unwrap().evaluate(&ctx);
        assert_eq!(result.level, ResultLevel::Block, "profile {}", profile.name);
        assert_eq!(result.triggered_by.as_deref(), Some("service-suspended"));
    }
}

#[test]
fn test_invalid_profile_is_rejected() {
    let profile = PolicyProfile::new("broken", vec![]);
    assert!(PolicyEngine::from_profile(&profile).is_err());
}

#[test]
fn test_context_loads_from_yaml() {
    let yaml = r#"
service_status: active
funding_mode: prepaid
prepaid_runway_days: 12
amount: 1500
approval_threshold: 1000
required_fields:
  - key: cost_center
    policy: required
    provided: true
"#;
    let ctx: ValidationContext = serde_yaml::from_str(yaml).unwrap();
    let result = evaluate(&ctx);
    assert_eq!(result.level, ResultLevel::ApprovalRequired);
}

fn arb_service() -> impl Strategy<Value = ServiceStatus> {
    prop_oneof![
        Just(ServiceStatus::Active),
        Just(ServiceStatus::PastDue),
        Just(ServiceStatus::Suspended),
    ]
}

fn arb_mode() -> impl Strategy<Value = FundingMode> {
    prop_oneof![
        Just(FundingMode::Wallet),
        Just(FundingMode::Credit),
        Just(FundingMode::Prepaid),
    ]
}

fn arb_funding() -> impl Strategy<Value = FundingStatus> {
    prop_oneof![
        Just(FundingStatus::Active),
        Just(FundingStatus::Low),
        Just(FundingStatus::Depleted),
    ]
}

fn arb_context() -> impl Strategy<Value = ValidationContext> {
    (
        arb_service(),
        arb_mode(),
        arb_funding(),
        0u32..60,
        0i64..500_000,
        proptest::option::of(0i64..400_000),
        proptest::collection::vec((any::<bool>(), 0i64..300_000, 0i64..300_000), 0..4),
        proptest::collection::vec(any::<bool>(), 0..4),
        any::<bool>(),
    )
        .prop_map(
            |(service, mode, funding, runway, amount, threshold, caps, provided, high_risk)| {
                let keys = [
                    FieldKey::CostCenter,
                    FieldKey::Purpose,
                    FieldKey::Notes,
                    FieldKey::Attachments,
                ];
                let mut builder = ValidationContext::builder()
                    .service_status(service)
                    .funding_mode(mode)
                    .funding_status(mode, funding)
                    .prepaid_runway_days(runway)
                    .amount(dec(amount));
                if let Some(t) = threshold {
                    builder = builder.approval_threshold(dec(t));
                }
                for (i, (hard, limit, used)) in caps.into_iter().enumerate() {
                    let name = format!("Cap {}", i);
                    builder = builder.cap(if hard {
                        Cap::hard(name, dec(limit), dec(used))
                    } else {
                        Cap::soft(name, dec(limit), dec(used))
                    });
                }
                for (key, provided) in keys.into_iter().zip(provided) {
                    builder = builder.field(key, FieldPolicy::Required, provided);
                }
                if high_risk {
                    builder = builder.selected_risk(RiskLevel::High);
                }
                builder.build_unchecked()
            },
        )
}

proptest! {
    #[test]
    fn prop_evaluation_is_deterministic(ctx in arb_context()) {
        let engine = PolicyEngine::new();
        let first = engine.evaluate(&ctx);
        let second = engine.evaluate(&ctx.clone());
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first, evaluate(&ctx));
    }

    #[test]
    fn prop_result_lists_never_empty(ctx in arb_context()) {
        let result = evaluate(&ctx);
        prop_assert!(!result.reasons.is_empty());
        prop_assert!(!result.next_steps.is_empty());
    }

    #[test]
    fn prop_block_only_from_blocking_rules(ctx in arb_context()) {
        let result = evaluate(&ctx);
        if result.level == ResultLevel::Block {
            let rule = result.triggered_by.clone().unwrap_or_default();
            prop_assert!(
                ["service-suspended", "funding-depleted", "required-fields", "cap-breach"]
                    .contains(&rule.as_str()),
                "unexpected blocking rule {}", rule
            );
        }
    }

    #[test]
    fn prop_suspended_always_blocks(ctx in arb_context()) {
        let mut ctx = ctx;
        ctx.service_status = ServiceStatus::Suspended;
        let result = evaluate(&ctx);
        prop_assert_eq!(result.level, ResultLevel::Block);
        prop_assert_eq!(result.triggered_by.as_deref(), Some("service-suspended"));
    }

    #[test]
    fn prop_approval_results_carry_hint(ctx in arb_context()) {
        let result = evaluate(&ctx);
        if result.level == ResultLevel::ApprovalRequired {
            prop_assert!(result.approval_hint.is_some());
        }
    }
}
