//! SpendGate CLI
//!
//! # Usage
//!
//! ```bash
//! spendgate evaluate --context checkout.json --profile checkout
//! spendgate profiles --format yaml
//! spendgate transitions --contexts session.yaml --format json
//! ```
//!
//! # Exit Codes
//!
//! - 0: Ready
//! - 1: Blocked
//! - 2: Ready with warnings
//! - 3: Invalid input or arguments
//! - 4: File not found or inaccessible
//! - 5: Unknown or malformed profile
//! - 6: Approval required
//! - 10: Internal error

use clap::Parser;
use spendgate_agent::{run_cli, SpendGateCli};
use tracing::Level;

fn main() {
    let cli = SpendGateCli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let level = if cli.quiet { Level::ERROR } else { level };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = run_cli(cli);
    std::process::exit(exit_code.into());
}
