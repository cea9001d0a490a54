//! Screen profiles
//!
//! Each calling screen evaluates the same engine with its own subset of the
//! rules and its own escalation wording. A profile is that declaration; it
//! can come from the built-ins below or from a configuration file.
//!
//! Profiles choose which rules run, never their precedence: rules must be
//! listed in the default order and the suspension check is always present.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::engine::rules::{notes::DEFAULT_MIN_NOTES_CHARS, RuleKind, DEFAULT_APPROVAL_CHAIN};
use crate::error::{PolicyError, Result};

/// Name of the checkout sheet profile
pub const CHECKOUT: &str = "checkout";
/// Name of the attestation form profile
pub const ATTESTATION: &str = "attestation";
/// Name of the tag picker profile
pub const TAG_PICKER: &str = "tag-picker";

/// Declarative engine configuration for one screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyProfile {
    /// Profile name
    pub name: String,
    /// What the screen is for
    #[serde(default)]
    pub description: String,
    /// Rules to run, in the default precedence
    pub rules: Vec<RuleKind>,
    /// Escalation chain suggested when approval is required
    #[serde(default = "default_approval_chain")]
    pub approval_chain: String,
    /// Escalation chain for soft-cap breaches; falls back to `approval_chain`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_cap_chain: Option<String>,
    /// Minimum notes length for the short-notes rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_notes_chars: Option<u32>,
}

fn default_approval_chain() -> String {
    DEFAULT_APPROVAL_CHAIN.to_string()
}

impl PolicyProfile {
    /// Create a profile with the default approval chain
    pub fn new(name: impl Into<String>, rules: Vec<RuleKind>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            rules,
            approval_chain: default_approval_chain(),
            soft_cap_chain: None,
            min_notes_chars: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_approval_chain(mut self, chain: impl Into<String>) -> Self {
        self.approval_chain = chain.into();
        self
    }

    pub fn with_soft_cap_chain(mut self, chain: impl Into<String>) -> Self {
        self.soft_cap_chain = Some(chain.into());
        self
    }

    pub fn with_min_notes_chars(mut self, chars: u32) -> Self {
        self.min_notes_chars = Some(chars);
        self
    }

    /// Chain used for soft-cap approvals
    pub fn soft_cap_chain(&self) -> String {
        self.soft_cap_chain
            .clone()
            .unwrap_or_else(|| self.approval_chain.clone())
    }

    /// Corporate checkout sheet: every rule except notes quality
    pub fn checkout() -> Self {
        Self::new(
            CHECKOUT,
            vec![
                RuleKind::ServiceSuspended,
                RuleKind::FundingDepleted,
                RuleKind::RequiredFields,
                RuleKind::CapBreach,
                RuleKind::ApprovalThreshold,
                RuleKind::HighRiskSelection,
                RuleKind::PastDueGrace,
            ],
        )
        .with_description("Payment method selection and checkout")
    }

    /// Attestation form: declared purpose, notes and compliance confirmation
    pub fn attestation() -> Self {
        Self::new(
            ATTESTATION,
            vec![
                RuleKind::ServiceSuspended,
                RuleKind::RequiredFields,
                RuleKind::ApprovalThreshold,
                RuleKind::ShortNotes,
                RuleKind::PastDueGrace,
            ],
        )
        .with_description("Purpose attestation and compliance confirmation")
        .with_approval_chain("Manager, then Compliance")
        .with_min_notes_chars(DEFAULT_MIN_NOTES_CHARS)
    }

    /// Category tag picker: per-category caps and sensitivity
    pub fn tag_picker() -> Self {
        Self::new(
            TAG_PICKER,
            vec![
                RuleKind::ServiceSuspended,
                RuleKind::RequiredFields,
                RuleKind::CapBreach,
                RuleKind::HighRiskSelection,
            ],
        )
        .with_description("Spending category selection with per-category caps")
        .with_approval_chain("Parent or guardian")
    }

    /// All shipped profiles
    pub fn builtins() -> Vec<Self> {
        vec![Self::checkout(), Self::attestation(), Self::tag_picker()]
    }

    /// Look up a shipped profile by name
    pub fn builtin(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            CHECKOUT => Ok(Self::checkout()),
            ATTESTATION => Ok(Self::attestation()),
            TAG_PICKER | "tag_picker" | "tags" => Ok(Self::tag_picker()),
            _ => Err(PolicyError::UnknownProfile(name.to_string())),
        }
    }

    /// Check the profile can be turned into an engine
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PolicyError::invalid_profile("profile name must not be empty"));
        }

        if self.rules.is_empty() {
            return Err(PolicyError::invalid_profile(format!(
                "profile '{}' declares no rules",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for kind in &self.rules {
            if !seen.insert(kind) {
                return Err(PolicyError::invalid_profile(format!(
                    "profile '{}' lists rule '{}' more than once",
                    self.name, kind
                )));
            }
        }

        if !self.rules.contains(&RuleKind::ServiceSuspended) {
            return Err(PolicyError::invalid_profile(format!(
                "profile '{}' must include '{}'",
                self.name,
                RuleKind::ServiceSuspended
            )));
        }

        if !self.uses_default_order() {
            let expected: Vec<String> = self
                .ordered_rules()
                .iter()
                .map(|k| k.to_string())
                .collect();
            return Err(PolicyError::invalid_profile(format!(
                "profile '{}' lists rules out of precedence order; expected [{}]",
                self.name,
                expected.join(", ")
            )));
        }

        if self.rules.contains(&RuleKind::ShortNotes) {
            match self.min_notes_chars {
                None => {
                    return Err(PolicyError::invalid_profile(format!(
                        "profile '{}' uses '{}' without min_notes_chars",
                        self.name,
                        RuleKind::ShortNotes
                    )))
                }
                Some(0) => {
                    return Err(PolicyError::invalid_profile(
                        "min_notes_chars must be greater than zero",
                    ))
                }
                Some(_) => {}
            }
        }

        if self.approval_chain.trim().is_empty() {
            return Err(PolicyError::invalid_profile("approval_chain must not be empty"));
        }

        Ok(())
    }

    /// Whether the rules follow the default precedence
    pub fn uses_default_order(&self) -> bool {
        self.rules
            .windows(2)
            .all(|pair| pair[0].default_rank() < pair[1].default_rank())
    }

    /// The declared rules sorted into the default precedence
    pub fn ordered_rules(&self) -> Vec<RuleKind> {
        let mut rules = self.rules.clone();
        rules.sort_by_key(|kind| kind.default_rank());
        rules
    }
}
