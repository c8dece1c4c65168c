//! Rewrite Engine
//!
//! Every outgoing request URL goes through here. The index is only read, so
//! any number of rewrites may run against the same index at once.

use crate::index::HostIndex;
use crate::types::RewriteResult;
use crate::url::extract_host;

// =============================================================================
// Rewriter
// =============================================================================

/// Applies the rulesets of a [`HostIndex`] to URLs.
#[derive(Debug, Clone, Copy)]
pub struct Rewriter<'a> {
    index: &'a HostIndex,
}

impl<'a> Rewriter<'a> {
    /// Create a rewriter over the given index.
    pub fn new(index: &'a HostIndex) -> Self {
        Self { index }
    }

    /// Rewrite a URL with the first applicable rule.
    ///
    /// Candidate rulesets are tried in index order and, inside a ruleset,
    /// rules in declared order. The first rule that matches decides the
    /// result; nothing after it is tried. URLs without a host, hosts without
    /// rulesets and URLs no rule matches all give [`RewriteResult::NoOp`].
    pub fn rewrite(&self, url: &str) -> RewriteResult {
        let host = match extract_host(url) {
            Some(host) => host,
            None => return RewriteResult::NoOp,
        };

        for ruleset in self.index.candidates(host) {
            if !ruleset.active {
                continue;
            }

            if let Some(new_url) = ruleset.apply(url) {
                log::trace!("ruleset '{}' rewrote {} -> {}", ruleset.name, url, new_url);
                return RewriteResult::RewriteUrl(new_url);
            }
        }

        RewriteResult::NoOp
    }
}

/// Rewrite `url` against `index`.
pub fn rewrite(url: &str, index: &HostIndex) -> RewriteResult {
    Rewriter::new(index).rewrite(url)
}
