//! Integration tests for the SpendGate agent
//!
//! Drive the CLI through parsed arguments against files on disk, and the
//! monitor through a paused tokio clock.

use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

use rust_decimal::Decimal;
use spendgate_agent::cli;
use spendgate_agent::{
    load_profile, run_cli, AgentError, ExitCode, MonitorConfig, PolicyMetricsRegistry,
    SpendGateCli, ValidationMonitor,
};
use spendgate_core::{
    Cap, FieldKey, FieldPolicy, PolicyEngine, ResultLevel, ServiceStatus, ValidationContext,
};

fn write_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn run(args: &[&str]) -> ExitCode {
    let mut argv = vec!["spendgate", "--quiet"];
    argv.extend_from_slice(args);
    run_cli(SpendGateCli::try_parse_from(argv).unwrap())
}

fn evaluate_file(file: &NamedTempFile, profile: &str) -> ExitCode {
    run(&[
        "evaluate",
        "--context",
        file.path().to_str().unwrap(),
        "--profile",
        profile,
    ])
}

// ============================================================================
// evaluate
// ============================================================================

#[test]
fn test_evaluate_clean_context_is_ready() {
    let file = write_file(".json", r#"{"amount": "1500.00", "approval_threshold": 200000}"#);
    assert_eq!(evaluate_file(&file, "checkout"), ExitCode::Ready);
}

#[test]
fn test_evaluate_suspended_is_blocked() {
    let file = write_file(
        ".yaml",
        r#"
service_status: suspended
amount: 20000
caps:
  - name: Daily
    kind: hard
    limit: 250000
    used: 240000
"#,
    );
    assert_eq!(evaluate_file(&file, "checkout"), ExitCode::Blocked);
}

#[test]
fn test_evaluate_soft_cap_requires_approval() {
    let file = write_file(
        ".toml",
        r#"
amount = 20000

[[caps]]
name = "Daily"
kind = "soft"
limit = 250000
used = 240000
"#,
    );
    assert_eq!(evaluate_file(&file, "checkout"), ExitCode::ApprovalRequired);
}

#[test]
fn test_evaluate_high_risk_is_warning() {
    let file = write_file(".json", r#"{"amount": 10, "selected_risk": "high"}"#);
    assert_eq!(evaluate_file(&file, "checkout"), ExitCode::Warning);
}

#[test]
fn test_evaluate_attestation_short_notes() {
    let file = write_file(
        ".yaml",
        r#"
notes_length: 5
required_fields:
  - key: purpose
    policy: required
    provided: true
"#,
    );
    assert_eq!(evaluate_file(&file, "attestation"), ExitCode::Warning);
    assert_eq!(evaluate_file(&file, "checkout"), ExitCode::Ready);
}

#[test]
fn test_evaluate_profile_from_file() {
    let profile = write_file(
        ".yaml",
        "name: kiosk\nrules: [service_suspended, high_risk_selection]\napproval_chain: Store manager\n",
    );
    let profile_path = profile.path().to_str().unwrap();

    let risky = write_file(".json", r#"{"selected_risk": "high"}"#);
    assert_eq!(evaluate_file(&risky, profile_path), ExitCode::Warning);

    let suspended = write_file(
        ".json",
        r#"{"service_status": "suspended", "selected_risk": "high"}"#,
    );
    assert_eq!(evaluate_file(&suspended, profile_path), ExitCode::Blocked);
}

#[test]
fn test_reordered_profile_file_is_rejected() {
    let profile = write_file(
        ".json",
        r#"{"name": "risk-first", "rules": ["high_risk_selection", "cap_breach", "service_suspended"]}"#,
    );
    let context = write_file(
        ".yaml",
        r#"
service_status: suspended
amount: 20000
caps:
  - name: Daily
    kind: soft
    limit: 250000
    used: 240000
"#,
    );

    assert_eq!(
        evaluate_file(&context, profile.path().to_str().unwrap()),
        ExitCode::ProfileError
    );
}

// ============================================================================
// error exit codes
// ============================================================================

#[test]
fn test_missing_context_file() {
    let code = run(&["evaluate", "--context", "/nonexistent/ctx.json"]);
    assert_eq!(code, ExitCode::FileError);
}

#[test]
fn test_malformed_context_is_invalid_input() {
    let file = write_file(".json", "{ amount: ");
    assert_eq!(evaluate_file(&file, "checkout"), ExitCode::InvalidInput);
}

#[test]
fn test_negative_amount_is_invalid_input() {
    let file = write_file(".json", r#"{"amount": -1}"#);
    assert_eq!(evaluate_file(&file, "checkout"), ExitCode::InvalidInput);
}

#[test]
fn test_missing_profile_file() {
    let file = write_file(".json", r#"{"amount": 1}"#);
    assert_eq!(evaluate_file(&file, "profiles/kiosk.yaml"), ExitCode::FileError);
}

#[test]
fn test_unknown_profile() {
    let file = write_file(".json", r#"{"amount": 1}"#);
    assert_eq!(evaluate_file(&file, "kiosk"), ExitCode::ProfileError);
}

#[test]
fn test_profile_file_with_duplicate_rules() {
    let profile = write_file(".json", r#"{"name": "dup", "rules": ["cap_breach", "cap_breach"]}"#);
    let err = load_profile(profile.path().to_str().unwrap()).unwrap_err();
    assert!(matches!(err, AgentError::ProfileError(_)));
}

// ============================================================================
// profiles and transitions
// ============================================================================

#[test]
fn test_profiles_command() {
    assert_eq!(run(&["profiles", "--format", "json"]), ExitCode::Ready);
}

#[test]
fn test_transitions_exit_with_last_level() {
    let file = write_file(
        ".yaml",
        r#"
- amount: 100
- amount: 100
  service_status: suspended
- amount: 100
  service_status: past_due
"#,
    );
    let code = run(&["transitions", "--contexts", file.path().to_str().unwrap()]);
    assert_eq!(code, ExitCode::Ready);
}

#[test]
fn test_transitions_rejects_empty_sequence() {
    let file = write_file(".json", "[]");
    let code = run(&["transitions", "--contexts", file.path().to_str().unwrap()]);
    assert_eq!(code, ExitCode::InvalidInput);
}

#[test]
fn test_run_returns_errors_to_caller() {
    let cli = SpendGateCli::try_parse_from([
        "spendgate",
        "-q",
        "evaluate",
        "--context",
        "ctx.unknown",
    ])
    .unwrap();
    let err = cli::run(cli).unwrap_err();
    assert!(err.is_user_error());
}

// ============================================================================
// monitor
// ============================================================================

fn missing_cost_center() -> ValidationContext {
    ValidationContext::builder()
        .amount(Decimal::from(500))
        .field(FieldKey::CostCenter, FieldPolicy::Required, false)
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_monitor_follows_a_checkout_session() {
    let registry = PolicyMetricsRegistry::new().unwrap();
    let mut handle = ValidationMonitor::spawn_with_metrics(
        Arc::new(PolicyEngine::new()),
        MonitorConfig::default(),
        missing_cost_center(),
        Some(registry.policy()),
    );
    assert_eq!(handle.latest().level, ResultLevel::Block);

    // The user fills in the cost center, then picks a large amount
    let filled = ValidationContext::builder()
        .amount(Decimal::from(500))
        .field(FieldKey::CostCenter, FieldPolicy::Required, true)
        .build()
        .unwrap();
    handle.update(filled).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(handle.latest().level, ResultLevel::Ok);

    let over_cap = ValidationContext::builder()
        .amount(Decimal::from(20_000))
        .field(FieldKey::CostCenter, FieldPolicy::Required, true)
        .cap(Cap::hard("Daily", Decimal::from(250_000), Decimal::from(240_000)))
        .build()
        .unwrap();
    handle.update(over_cap).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(handle.latest().level, ResultLevel::Block);
    assert_eq!(handle.latest().triggered_by.as_deref(), Some("cap-breach"));

    let events = handle.shutdown().await.unwrap();
    let levels: Vec<_> = events.iter().map(|e| e.level).collect();
    assert_eq!(
        levels,
        vec![ResultLevel::Block, ResultLevel::Ok, ResultLevel::Block]
    );
    assert_eq!(events[0].triggered_by.as_deref(), Some("required-fields"));

    let text = registry.encode_text().unwrap();
    assert!(text.contains("spendgate_level_transitions_total{from=\"ok\",to=\"block\"} 1"));
}

#[tokio::test(start_paused = true)]
async fn test_monitor_uses_profile_engine() {
    let profile = load_profile("attestation").unwrap();
    let engine = PolicyEngine::from_profile(&profile).unwrap();
    let config = MonitorConfig::builder()
        .debounce(Duration::from_millis(10))
        .build()
        .unwrap();

    let suspended = ValidationContext::builder()
        .service_status(ServiceStatus::Suspended)
        .build()
        .unwrap();
    let mut handle = ValidationMonitor::spawn(Arc::new(engine), config, suspended);

    let events = handle.take_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].profile, "attestation");
    assert_eq!(events[0].level, ResultLevel::Block);
}
