//! httpse Ruleset Loader
//!
//! This crate compiles the JSON ruleset document into the rulesets consumed
//! by the core rewrite engine.

pub mod options;
pub mod parser;
pub mod stats;

pub use options::LoadOptions;
pub use parser::{parse_rulesets, parse_rulesets_with, LoadError, MalformedReason};
pub use stats::LoadStats;

use httpse_core::HostIndex;

/// Parse a document and build its host index in one step.
pub fn load_index(json: &str, options: &LoadOptions) -> Result<(HostIndex, LoadStats), LoadError> {
    let rulesets = parse_rulesets_with(json, options)?;
    let index = HostIndex::build(rulesets);
    let stats = LoadStats::from_index(&index);

    log::debug!(
        "loaded {} rulesets ({} active), {} rules, {} hosts",
        stats.rulesets,
        stats.active_rulesets,
        stats.rules,
        stats.hosts
    );

    Ok((index, stats))
}
