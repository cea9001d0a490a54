//! Audit records for result-level transitions
//!
//! The engine is stateless, so remembering the previous level is the
//! caller's job. [`TransitionTracker`] holds that memory and turns each level
//! change into an immutable [`DecisionEvent`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use spendgate_core::{ResultLevel, ValidationContext, ValidationResult};

/// Audit record of a level transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionEvent {
    /// Unique identifier for this event
    pub event_id: Uuid,

    /// Profile the engine was built from
    pub profile: String,

    /// Level reached by this evaluation
    pub level: ResultLevel,

    /// Level of the previous evaluation; `None` for the first one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_level: Option<ResultLevel>,

    /// Rule that produced the outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_by: Option<String>,

    /// Result headline
    pub headline: String,

    /// First reason of the result
    pub reason: String,

    /// SHA-256 of the serialized context, for tracing without storing it
    pub inputs_hash: String,

    /// When the transition was observed
    pub timestamp: DateTime<Utc>,
}

impl DecisionEvent {
    /// Create an event for `result`
    pub fn new(
        profile: impl Into<String>,
        context: &ValidationContext,
        result: &ValidationResult,
        previous_level: Option<ResultLevel>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            profile: profile.into(),
            level: result.level,
            previous_level,
            triggered_by: result.triggered_by.clone(),
            headline: result.headline.clone(),
            reason: result.primary_reason().to_string(),
            inputs_hash: calculate_inputs_hash(context),
            timestamp: Utc::now(),
        }
    }

    /// One-line form for logs
    pub fn summary(&self) -> String {
        let from = self
            .previous_level
            .map(|l| l.to_string())
            .unwrap_or_else(|| "none".to_string());
        format!(
            "[{}] {} -> {} ({}): {}",
            self.profile,
            from,
            self.level,
            self.triggered_by.as_deref().unwrap_or("default"),
            self.reason
        )
    }

    /// Whether this transition moved to a stricter level
    pub fn is_escalation(&self) -> bool {
        match self.previous_level {
            Some(previous) => self.level > previous,
            None => self.level != ResultLevel::Ok,
        }
    }
}

/// Calculate SHA-256 hash of a context for traceability
pub fn calculate_inputs_hash(context: &ValidationContext) -> String {
    let mut hasher = Sha256::new();
    if let Ok(json) = serde_json::to_string(context) {
        hasher.update(json.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Remembers the last observed level for one screen
#[derive(Debug, Clone)]
pub struct TransitionTracker {
    profile: String,
    last_level: Option<ResultLevel>,
}

impl TransitionTracker {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            last_level: None,
        }
    }

    /// Last level observed, if any
    pub fn last_level(&self) -> Option<ResultLevel> {
        self.last_level
    }

    /// Record a result; returns an event when the level changed
    ///
    /// The first observation always produces an event.
    pub fn observe(
        &mut self,
        context: &ValidationContext,
        result: &ValidationResult,
    ) -> Option<DecisionEvent> {
        if self.last_level == Some(result.level) {
            return None;
        }

        let event = DecisionEvent::new(self.profile.clone(), context, result, self.last_level);
        self.last_level = Some(result.level);
        Some(event)
    }

    /// Forget the last level
    pub fn reset(&mut self) {
        self.last_level = None;
    }
}
