//! Ruleset document parser
//!
//! Turns the JSON ruleset document into compiled [`RuleSet`]s. Every pattern
//! is compiled here, so a document that loads can never fail at rewrite time.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use httpse_core::types::{CookieRule, Rule, RuleSet};

use crate::options::LoadOptions;

/// Error type for ruleset loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Malformed ruleset document: {0}")]
    Malformed(#[from] MalformedReason),
}

/// Why a document was rejected.
#[derive(Debug, thiserror::Error)]
pub enum MalformedReason {
    #[error("invalid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("top-level value is not an array")]
    NotAnArray,
    #[error("ruleset #{index}: {source}")]
    Entry {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("ruleset #{index} ('{name}') has no targets")]
    NoTargets { index: usize, name: String },
    #[error("ruleset #{index} ('{name}') has an empty target")]
    EmptyTarget { index: usize, name: String },
    #[error("ruleset '{name}': invalid pattern '{pattern}': {source}")]
    Pattern {
        name: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

// =============================================================================
// Document Schema
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawRuleSet {
    name: String,
    target: Vec<String>,
    rule: Vec<RawRule>,
    securecookie: Option<Vec<RawCookieRule>>,
    exclusion: Option<Vec<String>>,
    default_off: Option<String>,
    platform: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    from: String,
    to: String,
}

#[derive(Debug, Deserialize)]
struct RawCookieRule {
    host: String,
    name: String,
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a ruleset document with default options.
pub fn parse_rulesets(json: &str) -> Result<Vec<RuleSet>, LoadError> {
    parse_rulesets_with(json, &LoadOptions::default())
}

/// Parse a ruleset document.
///
/// The document must be a JSON array of ruleset objects. The whole document
/// is rejected on the first structural or pattern error.
pub fn parse_rulesets_with(json: &str, options: &LoadOptions) -> Result<Vec<RuleSet>, LoadError> {
    let value: Value = serde_json::from_str(json).map_err(MalformedReason::Json)?;

    let entries = match value {
        Value::Array(entries) => entries,
        _ => return Err(MalformedReason::NotAnArray.into()),
    };

    let mut rulesets = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let raw: RawRuleSet = serde_json::from_value(entry)
            .map_err(|source| MalformedReason::Entry { index, source })?;
        rulesets.push(compile_ruleset(index, raw, options)?);
    }

    Ok(rulesets)
}

fn compile_ruleset(index: usize, raw: RawRuleSet, options: &LoadOptions) -> Result<RuleSet, MalformedReason> {
    if raw.target.is_empty() {
        return Err(MalformedReason::NoTargets { index, name: raw.name });
    }
    if raw.target.iter().any(|t| t.trim().is_empty()) {
        return Err(MalformedReason::EmptyTarget { index, name: raw.name });
    }

    let mut rules = Vec::with_capacity(raw.rule.len());
    for rule in &raw.rule {
        let compiled = Rule::new(&rule.from, &rule.to).map_err(|e| pattern_error(&raw.name, &rule.from, e))?;
        rules.push(compiled);
    }

    let mut exclusions = Vec::new();
    for pattern in raw.exclusion.iter().flatten() {
        let re = Regex::new(pattern).map_err(|e| pattern_error(&raw.name, pattern, e))?;
        exclusions.push(re);
    }

    let mut secure_cookie_rules = Vec::new();
    for cookie in raw.securecookie.iter().flatten() {
        // Compile separately so the error names the pattern that failed
        let host = Regex::new(&cookie.host).map_err(|e| pattern_error(&raw.name, &cookie.host, e))?;
        let name = Regex::new(&cookie.name).map_err(|e| pattern_error(&raw.name, &cookie.name, e))?;
        secure_cookie_rules.push(CookieRule { host, name });
    }

    let active = options.is_active(&raw.name, raw.default_off.is_some(), raw.platform.as_deref());
    if !active {
        log::debug!(
            "ruleset '{}' loaded inactive (default_off: {:?}, platform: {:?})",
            raw.name,
            raw.default_off,
            raw.platform
        );
    }

    Ok(RuleSet {
        name: raw.name,
        targets: raw.target,
        rules,
        exclusions,
        secure_cookie_rules,
        active,
    })
}

fn pattern_error(name: &str, pattern: &str, source: regex::Error) -> MalformedReason {
    MalformedReason::Pattern {
        name: name.to_string(),
        pattern: pattern.to_string(),
        source,
    }
}
