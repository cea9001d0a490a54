//! Prometheus metrics for policy evaluations
//!
//! - `spendgate_evaluations_total` (counter) - evaluations by profile and level
//! - `spendgate_rule_triggers_total` (counter) - outcomes by deciding rule
//! - `spendgate_level_transitions_total` (counter) - level changes
//! - `spendgate_evaluation_duration_seconds` (histogram) - evaluation latency
//!
//! # Example
//!
//! ```rust
//! use spendgate_agent::telemetry::PolicyMetricsRegistry;
//! use spendgate_core::{evaluate, ValidationContext};
//!
//! let registry = PolicyMetricsRegistry::new().unwrap();
//! let result = evaluate(&ValidationContext::default());
//! registry.policy().record_evaluation("checkout", &result, 0.0004);
//! assert!(registry.encode_text().unwrap().contains("spendgate_evaluations_total"));
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

use spendgate_core::{ResultLevel, ValidationResult};

use crate::error::{AgentError, Result};

const NAMESPACE: &str = "spendgate";
const DEFAULT_RULE_LABEL: &str = "default";

/// Evaluation metrics
pub struct PolicyMetrics {
    evaluations_total: CounterVec,
    rule_triggers_total: CounterVec,
    level_transitions_total: CounterVec,
    duration_seconds: HistogramVec,
}

impl PolicyMetrics {
    /// Create the metrics and register them with `registry`
    pub fn new(registry: &Registry) -> Result<Self> {
        let evaluations_total = CounterVec::new(
            Opts::new("evaluations_total", "Total number of policy evaluations")
                .namespace(NAMESPACE),
            &["profile", "level"],
        )?;

        let rule_triggers_total = CounterVec::new(
            Opts::new(
                "rule_triggers_total",
                "Number of evaluations decided by each rule",
            )
            .namespace(NAMESPACE),
            &["rule"],
        )?;

        let level_transitions_total = CounterVec::new(
            Opts::new(
                "level_transitions_total",
                "Number of result level changes between consecutive evaluations",
            )
            .namespace(NAMESPACE),
            &["from", "to"],
        )?;

        let duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "evaluation_duration_seconds",
                "Policy evaluation duration in seconds",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01]),
            &["profile"],
        )?;

        registry.register(Box::new(evaluations_total.clone()))?;
        registry.register(Box::new(rule_triggers_total.clone()))?;
        registry.register(Box::new(level_transitions_total.clone()))?;
        registry.register(Box::new(duration_seconds.clone()))?;

        Ok(Self {
            evaluations_total,
            rule_triggers_total,
            level_transitions_total,
            duration_seconds,
        })
    }

    /// Record a finished evaluation
    pub fn record_evaluation(&self, profile: &str, result: &ValidationResult, duration_secs: f64) {
        let level = result.level.to_string();
        self.evaluations_total
            .with_label_values(&[profile, level.as_str()])
            .inc();
        self.rule_triggers_total
            .with_label_values(&[result.triggered_by.as_deref().unwrap_or(DEFAULT_RULE_LABEL)])
            .inc();
        self.duration_seconds
            .with_label_values(&[profile])
            .observe(duration_secs);
    }

    /// Record a level transition
    pub fn record_transition(&self, from: Option<ResultLevel>, to: ResultLevel) {
        let from = from.map(|l| l.to_string()).unwrap_or_else(|| "none".to_string());
        let to = to.to_string();
        self.level_transitions_total
            .with_label_values(&[from.as_str(), to.as_str()])
            .inc();
    }

    /// Number of evaluations recorded for a profile and level
    pub fn evaluation_count(&self, profile: &str, level: ResultLevel) -> f64 {
        let level = level.to_string();
        self.evaluations_total
            .with_label_values(&[profile, level.as_str()])
            .get()
    }
}

/// Registry owning the policy metrics
pub struct PolicyMetricsRegistry {
    registry: Arc<Registry>,
    policy: Arc<PolicyMetrics>,
}

impl PolicyMetricsRegistry {
    /// Create a registry with all metrics registered
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        let policy = Arc::new(PolicyMetrics::new(&registry)?);
        Ok(Self { registry, policy })
    }

    /// Shared handle to the policy metrics
    pub fn policy(&self) -> Arc<PolicyMetrics> {
        Arc::clone(&self.policy)
    }

    /// Underlying prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Render all metrics in the text exposition format
    pub fn encode_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| AgentError::Telemetry(e.to_string()))
    }
}
