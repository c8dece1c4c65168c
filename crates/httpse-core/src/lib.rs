//! httpse Core Library
//!
//! This crate provides the rewrite engine that upgrades outgoing HTTP request
//! URLs to their secure equivalents using curated per-site rulesets.
//!
//! # Architecture
//!
//! Rulesets are compiled once (patterns included) and handed to a
//! [`HostIndex`], which buckets them by target host. The rewrite path only
//! reads the index: extract the host, fetch candidate rulesets, apply the
//! first rule that matches.
//!
//! # Modules
//!
//! - `types`: RuleSet model, rewrite rules and the rewrite verdict
//! - `url`: Host extraction without allocations
//! - `index`: Host to ruleset index
//! - `rewriter`: Applies the index to a URL

pub mod index;
pub mod rewriter;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use index::HostIndex;
pub use rewriter::{rewrite, Rewriter};
pub use types::{CookieRule, RewriteAction, RewriteResult, Rule, RuleSet};
