//! Notes quality rule used by the attestation form

use super::{Rule, RuleCategory};
use crate::context::ValidationContext;
use crate::result::ValidationResult;

pub const RULE_ID: &str = "short-notes";

/// Default minimum length for attestation notes
pub const DEFAULT_MIN_NOTES_CHARS: u32 = 20;

/// Warns when notes were written but are too short to be useful
///
/// Empty notes are left to the required-fields rule.
#[derive(Debug)]
pub struct ShortNotesRule {
    min_chars: u32,
}

impl Default for ShortNotesRule {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_NOTES_CHARS)
    }
}

impl ShortNotesRule {
    pub fn new(min_chars: u32) -> Self {
        Self { min_chars }
    }

    pub fn min_chars(&self) -> u32 {
        self.min_chars
    }
}

impl Rule for ShortNotesRule {
    fn id(&self) -> &str {
        RULE_ID
    }

    fn name(&self) -> &str {
        "Short notes"
    }

    fn description(&self) -> &str {
        "Warns when the notes are shorter than the configured minimum"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Quality
    }

    fn is_applicable(&self, context: &ValidationContext) -> bool {
        matches!(context.notes_length, Some(n) if n > 0)
    }

    fn evaluate(&self, context: &ValidationContext) -> Option<ValidationResult> {
        let length = context.notes_length.filter(|n| *n > 0)?;
        if length >= self.min_chars {
            return None;
        }

        Some(
            ValidationResult::warn(
                format!(
                    "Notes are short ({} characters, at least {} recommended)",
                    length, self.min_chars
                ),
                "Add more detail to the notes before continuing",
            )
            .triggered_by(RULE_ID),
        )
    }
}
