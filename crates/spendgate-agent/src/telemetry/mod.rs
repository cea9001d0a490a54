//! Telemetry for policy evaluations
//!
//! - `audit` - decision events for result-level transitions
//! - `metrics` - Prometheus counters and histograms
//!
//! The engine itself never logs or counts anything; every caller that wants
//! an audit trail goes through this module.

pub mod audit;
pub mod metrics;

pub use audit::{calculate_inputs_hash, DecisionEvent, TransitionTracker};
pub use metrics::{PolicyMetrics, PolicyMetricsRegistry};
