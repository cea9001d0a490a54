//! Validation context: the immutable input of a single evaluation
//!
//! A context is rebuilt by the caller on every relevant state change (field
//! edit, toggle, amount change) and discarded once the engine has produced a
//! result. All history the rules need must be carried in here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{PolicyError, Result};

/// Account-level billing state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Billing is current
    #[default]
    Active,
    /// An invoice is overdue but the grace window is still open
    PastDue,
    /// Service suspended for billing non-compliance
    Suspended,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStatus::Active => write!(f, "active"),
            ServiceStatus::PastDue => write!(f, "past_due"),
            ServiceStatus::Suspended => write!(f, "suspended"),
        }
    }
}

/// Source of funds backing a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FundingMode {
    /// Wallet balance
    #[default]
    Wallet,
    /// Credit line
    Credit,
    /// Prepaid deposit
    Prepaid,
}

impl FundingMode {
    /// Human-readable name used in reasons and next steps
    pub fn label(&self) -> &'static str {
        match self {
            FundingMode::Wallet => "wallet",
            FundingMode::Credit => "credit line",
            FundingMode::Prepaid => "prepaid deposit",
        }
    }
}

impl fmt::Display for FundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FundingMode::Wallet => write!(f, "wallet"),
            FundingMode::Credit => write!(f, "credit"),
            FundingMode::Prepaid => write!(f, "prepaid"),
        }
    }
}

/// Health of a single funding source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FundingStatus {
    #[default]
    Active,
    Low,
    Depleted,
}

/// Funding status reported for every mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FundingStatuses {
    pub wallet: FundingStatus,
    pub credit: FundingStatus,
    pub prepaid: FundingStatus,
}

impl FundingStatuses {
    /// Status of the source backing `mode`
    pub fn status_for(&self, mode: FundingMode) -> FundingStatus {
        match mode {
            FundingMode::Wallet => self.wallet,
            FundingMode::Credit => self.credit,
            FundingMode::Prepaid => self.prepaid,
        }
    }

    /// Replace the status of a single mode
    pub fn with_status(mut self, mode: FundingMode, status: FundingStatus) -> Self {
        match mode {
            FundingMode::Wallet => self.wallet = status,
            FundingMode::Credit => self.credit = status,
            FundingMode::Prepaid => self.prepaid = status,
        }
        self
    }
}

/// Whether a cap breach blocks or escalates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapKind {
    /// Breach always blocks
    Hard,
    /// Breach escalates to the approval path
    Soft,
}

impl fmt::Display for CapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapKind::Hard => write!(f, "hard"),
            CapKind::Soft => write!(f, "soft"),
        }
    }
}

/// A spending cap with its current usage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cap {
    /// Display name, e.g. "Daily" or "Per-vendor"
    pub name: String,
    /// Hard or soft
    pub kind: CapKind,
    /// Limit for the period; zero or less disables the cap
    pub limit: Decimal,
    /// Amount already consumed in the period
    pub used: Decimal,
}

impl Cap {
    /// Create a new cap
    pub fn new(name: impl Into<String>, kind: CapKind, limit: Decimal, used: Decimal) -> Self {
        Self {
            name: name.into(),
            kind,
            limit,
            used,
        }
    }

    /// Create a hard cap
    pub fn hard(name: impl Into<String>, limit: Decimal, used: Decimal) -> Self {
        Self::new(name, CapKind::Hard, limit, used)
    }

    /// Create a soft cap
    pub fn soft(name: impl Into<String>, limit: Decimal, used: Decimal) -> Self {
        Self::new(name, CapKind::Soft, limit, used)
    }

    /// Whether this cap takes part in evaluation
    pub fn is_enabled(&self) -> bool {
        self.limit > Decimal::ZERO
    }

    /// Remaining balance, never negative
    pub fn remaining(&self) -> Decimal {
        (self.limit - self.used).max(Decimal::ZERO)
    }

    /// Whether `amount` exceeds what is left on this cap
    pub fn is_breached_by(&self, amount: Decimal) -> bool {
        self.is_enabled() && amount > self.remaining()
    }
}

/// Named requirement a screen may collect
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    CostCenter,
    Purpose,
    Notes,
    Attachments,
    ComplianceCheck,
    /// Screen-specific requirement identified by name
    Custom(String),
}

impl FieldKey {
    /// Human-readable label used in reasons
    pub fn label(&self) -> String {
        match self {
            FieldKey::CostCenter => "Cost center".to_string(),
            FieldKey::Purpose => "Purpose".to_string(),
            FieldKey::Notes => "Notes".to_string(),
            FieldKey::Attachments => "Attachments".to_string(),
            FieldKey::ComplianceCheck => "Compliance confirmation".to_string(),
            FieldKey::Custom(name) => name.clone(),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::CostCenter => write!(f, "cost_center"),
            FieldKey::Purpose => write!(f, "purpose"),
            FieldKey::Notes => write!(f, "notes"),
            FieldKey::Attachments => write!(f, "attachments"),
            FieldKey::ComplianceCheck => write!(f, "compliance_check"),
            FieldKey::Custom(name) => write!(f, "custom:{}", name),
        }
    }
}

/// Policy flag attached to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldPolicy {
    Required,
    #[default]
    Optional,
    NotUsed,
}

/// A field together with its policy flag and whether the user supplied it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRequirement {
    pub key: FieldKey,
    #[serde(default)]
    pub policy: FieldPolicy,
    #[serde(default)]
    pub provided: bool,
}

impl FieldRequirement {
    /// Create a new requirement
    pub fn new(key: FieldKey, policy: FieldPolicy, provided: bool) -> Self {
        Self {
            key,
            policy,
            provided,
        }
    }

    /// A required field
    pub fn required(key: FieldKey, provided: bool) -> Self {
        Self::new(key, FieldPolicy::Required, provided)
    }

    /// Whether this requirement blocks the transaction
    pub fn is_missing(&self) -> bool {
        self.policy == FieldPolicy::Required && !self.provided
    }
}

/// Sensitivity of the chosen category or purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Input of a single evaluation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationContext {
    /// Account-level billing state
    pub service_status: ServiceStatus,
    /// Selected funding source
    pub funding_mode: FundingMode,
    /// Status of every funding source
    pub funding_status: FundingStatuses,
    /// Days until the prepaid deposit is exhausted; absent means none left
    pub prepaid_runway_days: u32,
    /// Transaction amount, pre-normalized to one unit by the caller
    pub amount: Decimal,
    /// Amount above which approval is always required
    pub approval_threshold: Option<Decimal>,
    /// Caps, evaluated in order
    pub caps: Vec<Cap>,
    /// Field requirements, evaluated in order
    pub required_fields: Vec<FieldRequirement>,
    /// Sensitivity of the selected category/purpose
    pub selected_risk: Option<RiskLevel>,
    /// Character count of the notes, when the screen collects them
    pub notes_length: Option<u32>,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            service_status: ServiceStatus::Active,
            funding_mode: FundingMode::Wallet,
            funding_status: FundingStatuses::default(),
            prepaid_runway_days: 0,
            amount: Decimal::ZERO,
            approval_threshold: None,
            caps: Vec::new(),
            required_fields: Vec::new(),
            selected_risk: None,
            notes_length: None,
        }
    }
}

impl ValidationContext {
    /// Start building a context
    pub fn builder() -> ValidationContextBuilder {
        ValidationContextBuilder::default()
    }

    /// Status of the currently selected funding source
    pub fn selected_funding_status(&self) -> FundingStatus {
        self.funding_status.status_for(self.funding_mode)
    }

    /// Requirement for `key`, if the screen declares one
    pub fn requirement(&self, key: &FieldKey) -> Option<&FieldRequirement> {
        self.required_fields.iter().find(|f| &f.key == key)
    }

    /// Reject contexts the engine is not defined for
    ///
    /// The engine never calls this; callers run it when turning raw form state
    /// into a context.
    pub fn validate(&self) -> Result<()> {
        if self.amount < Decimal::ZERO {
            return Err(PolicyError::invalid_context(format!(
                "amount must not be negative (got {})",
                self.amount
            )));
        }

        if let Some(threshold) = self.approval_threshold {
            if threshold < Decimal::ZERO {
                return Err(PolicyError::invalid_context(format!(
                    "approval threshold must not be negative (got {})",
                    threshold
                )));
            }
        }

        for (index, cap) in self.caps.iter().enumerate() {
            if cap.name.trim().is_empty() {
                return Err(PolicyError::invalid_context(format!(
                    "cap #{} has no name",
                    index + 1
                )));
            }
            if cap.limit < Decimal::ZERO || cap.used < Decimal::ZERO {
                return Err(PolicyError::invalid_context(format!(
                    "cap '{}' has a negative limit or usage",
                    cap.name
                )));
            }
        }

        let mut seen = HashSet::new();
        for field in &self.required_fields {
            if !seen.insert(&field.key) {
                return Err(PolicyError::invalid_context(format!(
                    "field '{}' is declared more than once",
                    field.key
                )));
            }
        }

        Ok(())
    }
}

/// Fluent constructor for [`ValidationContext`]
#[derive(Debug, Clone, Default)]
pub struct ValidationContextBuilder {
    context: ValidationContext,
}

impl ValidationContextBuilder {
    pub fn service_status(mut self, status: ServiceStatus) -> Self {
        self.context.service_status = status;
        self
    }

    pub fn funding_mode(mut self, mode: FundingMode) -> Self {
        self.context.funding_mode = mode;
        self
    }

    pub fn funding_status(mut self, mode: FundingMode, status: FundingStatus) -> Self {
        self.context.funding_status = self.context.funding_status.with_status(mode, status);
        self
    }

    pub fn prepaid_runway_days(mut self, days: u32) -> Self {
        self.context.prepaid_runway_days = days;
        self
    }

    pub fn amount(mut self, amount: impl Into<Decimal>) -> Self {
        self.context.amount = amount.into();
        self
    }

    pub fn approval_threshold(mut self, threshold: impl Into<Decimal>) -> Self {
        self.context.approval_threshold = Some(threshold.into());
        self
    }

    pub fn cap(mut self, cap: Cap) -> Self {
        self.context.caps.push(cap);
        self
    }

    pub fn field(mut self, key: FieldKey, policy: FieldPolicy, provided: bool) -> Self {
        self.context
            .required_fields
            .push(FieldRequirement::new(key, policy, provided));
        self
    }

    pub fn selected_risk(mut self, risk: RiskLevel) -> Self {
        self.context.selected_risk = Some(risk);
        self
    }

    pub fn notes_length(mut self, chars: u32) -> Self {
        self.context.notes_length = Some(chars);
        self
    }

    /// Validate and return the context
    pub fn build(self) -> Result<ValidationContext> {
        self.context.validate()?;
        Ok(self.context)
    }

    /// Return the context without validation
    pub fn build_unchecked(self) -> ValidationContext {
        self.context
    }
}
