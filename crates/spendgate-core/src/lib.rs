//! SpendGate policy engine
//!
//! A pure, rule-ordered decision function for CorporatePay and EduPocket
//! spending screens. A [`ValidationContext`] (amount, funding, billing state,
//! caps, required fields, selection risk) goes in; a [`ValidationResult`]
//! comes out with one of four levels:
//!
//! - **Ok**: ready to proceed
//! - **Warn**: proceed, but double-check
//! - **ApprovalRequired**: submit for approval first
//! - **Block**: cannot proceed until the cause is fixed
//!
//! plus ordered reasons, next steps and, for approvals, a hint naming the
//! likely approval chain.
//!
//! ## Architecture
//!
//! 1. **Context** (`context`): immutable input built by the caller on every
//!    state change, with caller-side input validation.
//! 2. **Engine** (`engine`): ordered list of [`Rule`]s; the first rule that
//!    fires decides.
//! 3. **Profiles** (`profile`): declarative rule lists for the checkout
//!    sheet, attestation form and tag picker.
//!
//! The engine keeps no state between calls and performs no I/O. Scheduling,
//! logging and audit belong to the caller (see `spendgate-agent`).
//!
//! ## Example
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use spendgate_core::{Cap, PolicyEngine, ResultLevel, ValidationContext};
//!
//! let context = ValidationContext::builder()
//!     .amount(Decimal::from(20_000))
//!     .cap(Cap::soft("Daily", Decimal::from(250_000), Decimal::from(240_000)))
//!     .build()
//!     .unwrap();
//!
//! let result = PolicyEngine::new().evaluate(&context);
//! assert_eq!(result.level, ResultLevel::ApprovalRequired);
//! assert!(result.approval_hint.is_some());
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod profile;
pub mod result;

pub use context::{
    Cap, CapKind, FieldKey, FieldPolicy, FieldRequirement, FundingMode, FundingStatus,
    FundingStatuses, RiskLevel, ServiceStatus, ValidationContext, ValidationContextBuilder,
};
pub use engine::rules::{BoxedRule, Rule, RuleCategory, RuleInfo, RuleKind, DEFAULT_APPROVAL_CHAIN};
pub use engine::{Evaluation, PolicyEngine};
pub use error::PolicyError;
pub use profile::PolicyProfile;
pub use result::{ResultLevel, ValidationResult};

/// Evaluate a context with the checkout rule order
pub fn evaluate(context: &ValidationContext) -> ValidationResult {
    PolicyEngine::new().evaluate(context)
}
