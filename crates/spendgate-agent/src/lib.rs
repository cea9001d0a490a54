//! SpendGate agent
//!
//! Everything around the pure policy engine in `spendgate-core`: loading
//! contexts and profiles from files, a debounced monitor for screens whose
//! inputs change, audit events for level transitions, Prometheus metrics and
//! the `spendgate` command-line tool.
//!
//! ## Architecture
//!
//! 1. **Loader** (`loader`): JSON, YAML and TOML contexts and profiles,
//!    validated before evaluation.
//!
//! 2. **Monitor** (`monitor`): tokio task that re-evaluates once the input has
//!    been quiet for the debounce window and publishes on watch channels.
//!
//! 3. **Telemetry** (`telemetry`): [`DecisionEvent`]s for level transitions
//!    and the Prometheus registry.
//!
//! 4. **CLI** (`cli`): `evaluate`, `profiles` and `transitions` commands with
//!    level-specific exit codes.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Evaluate a checkout context
//! spendgate evaluate --context checkout.json
//!
//! # Evaluate with the attestation profile, as JSON
//! spendgate evaluate --context form.yaml --profile attestation --format json
//!
//! # Replay a sequence of screen states
//! spendgate transitions --contexts session.yaml
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use spendgate_agent::{MonitorConfig, ValidationMonitor};
//! use spendgate_core::{PolicyEngine, ServiceStatus, ValidationContext};
//!
//! #[tokio::main]
//! async fn main() {
//!     let handle = ValidationMonitor::spawn(
//!         Arc::new(PolicyEngine::new()),
//!         MonitorConfig::from_env().unwrap_or_default(),
//!         ValidationContext::default(),
//!     );
//!
//!     let suspended = ValidationContext::builder()
//!         .service_status(ServiceStatus::Suspended)
//!         .build()
//!         .unwrap();
//!     handle.update(suspended).unwrap();
//!
//!     let mut results = handle.results();
//!     results.changed().await.unwrap();
//!     println!("{}", *results.borrow());
//!
//!     for event in handle.shutdown().await.unwrap() {
//!         println!("{}", event.summary());
//!     }
//! }
//! ```

pub mod cli;
pub mod error;
pub mod loader;
pub mod monitor;
pub mod telemetry;

pub use cli::{Commands, ExitCode, OutputFormat, ResultOutput, SpendGateCli};
pub use error::{AgentError, Result};
pub use loader::{load_context, load_contexts, load_profile};
pub use monitor::{MonitorConfig, MonitorConfigBuilder, MonitorHandle, ValidationMonitor};
pub use telemetry::{DecisionEvent, PolicyMetrics, PolicyMetricsRegistry, TransitionTracker};

/// Agent version (from Cargo.toml)
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the CLI application
///
/// This is the main entry point for the CLI binary.
///
/// # Example
///
/// ```rust,no_run
/// use clap::Parser;
/// use spendgate_agent::{run_cli, SpendGateCli};
///
/// let cli = SpendGateCli::parse();
/// let exit_code = run_cli(cli);
/// std::process::exit(exit_code.into());
/// ```
pub fn run_cli(cli: SpendGateCli) -> ExitCode {
    match cli::run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from_error(&e)
        }
    }
}
