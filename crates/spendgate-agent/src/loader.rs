//! Loading contexts and profiles from disk
//!
//! Files are parsed by extension: `.json`, `.yaml`/`.yml` or `.toml`.

use serde::de::DeserializeOwned;
use std::path::Path;

use spendgate_core::{PolicyProfile, ValidationContext};

use crate::error::{AgentError, Result};

/// Parse a document based on its file extension
pub fn parse_document<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "json" => serde_json::from_str(content)
            .map_err(|e| AgentError::ParseError(format!("Invalid JSON: {}", e))),
        "yaml" | "yml" => serde_yaml::from_str(content)
            .map_err(|e| AgentError::ParseError(format!("Invalid YAML: {}", e))),
        "toml" => toml::from_str(content)
            .map_err(|e| AgentError::ParseError(format!("Invalid TOML: {}", e))),
        _ => Err(AgentError::InvalidInput(format!(
            "Unsupported file format: {}. Supported formats: json, yaml, yml, toml",
            extension
        ))),
    }
}

fn read_file(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        AgentError::FileError(format!(
            "Failed to read {} file '{}': {}",
            what,
            path.display(),
            e
        ))
    })
}

/// Load and validate a single context
pub fn load_context(path: &Path) -> Result<ValidationContext> {
    let content = read_file(path, "context")?;
    let context: ValidationContext = parse_document(path, &content)?;
    context.validate()?;

    tracing::debug!(
        path = %path.display(),
        amount = %context.amount,
        caps = context.caps.len(),
        fields = context.required_fields.len(),
        "Loaded validation context"
    );
    Ok(context)
}

/// Load and validate a sequence of contexts
///
/// Accepts a top-level array, or a `contexts` table for TOML files.
pub fn load_contexts(path: &Path) -> Result<Vec<ValidationContext>> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Sequence {
        List(Vec<ValidationContext>),
        Table { contexts: Vec<ValidationContext> },
    }

    let content = read_file(path, "context sequence")?;
    let contexts = match parse_document::<Sequence>(path, &content)? {
        Sequence::List(list) => list,
        Sequence::Table { contexts } => contexts,
    };

    if contexts.is_empty() {
        return Err(AgentError::invalid_input(format!(
            "'{}' contains no contexts",
            path.display()
        )));
    }

    for (index, context) in contexts.iter().enumerate() {
        context
            .validate()
            .map_err(|e| AgentError::InvalidInput(format!("context #{}: {}", index + 1, e)))?;
    }

    tracing::debug!(path = %path.display(), count = contexts.len(), "Loaded context sequence");
    Ok(contexts)
}

/// Resolve a profile by built-in name or file path
///
/// A value with a file extension is always read as a file.
pub fn load_profile(name_or_path: &str) -> Result<PolicyProfile> {
    let path = Path::new(name_or_path);
    let profile = if path.extension().is_some() {
        let content = read_file(path, "profile")?;
        parse_document::<PolicyProfile>(path, &content)?
    } else {
        PolicyProfile::builtin(name_or_path)?
    };

    profile.validate()?;
    tracing::debug!(profile = %profile.name, rules = profile.rules.len(), "Resolved profile");
    Ok(profile)
}
