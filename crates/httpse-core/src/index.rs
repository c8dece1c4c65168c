//! Host Index
//!
//! Maps a lower-cased target host to the rulesets that declare it. Buckets
//! keep document order, which is the tie-break between rulesets sharing a
//! host. The index is immutable once built; a reload builds a new one.

use std::collections::HashMap;

use crate::types::RuleSet;
use crate::url::{is_well_formed_host, normalize_host, walk_parent_domains};

/// Rulesets bucketed by target host.
#[derive(Debug, Default)]
pub struct HostIndex {
    rulesets: Vec<RuleSet>,
    buckets: HashMap<String, Vec<usize>>,
    /// Set when any target carries a `*` label
    has_wildcards: bool,
}

impl HostIndex {
    /// Build an index from rulesets in document order.
    ///
    /// A ruleset with N targets lands in N buckets; a target repeated within
    /// one ruleset only counts once.
    pub fn build(rulesets: Vec<RuleSet>) -> Self {
        let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();
        let mut has_wildcards = false;

        for (id, ruleset) in rulesets.iter().enumerate() {
            for target in &ruleset.targets {
                let key = target.to_ascii_lowercase();
                has_wildcards |= key.contains('*');

                let bucket = buckets.entry(key).or_default();
                if !bucket.contains(&id) {
                    bucket.push(id);
                }
            }
        }

        log::debug!(
            "host index built: {} rulesets, {} hosts",
            rulesets.len(),
            buckets.len()
        );

        Self {
            rulesets,
            buckets,
            has_wildcards,
        }
    }

    /// Rulesets whose targets contain exactly `host` (ignoring case).
    pub fn lookup<'a>(&'a self, host: &str) -> impl Iterator<Item = &'a RuleSet> + 'a {
        let ids = self.bucket(&normalize_host(host));
        ids.iter().map(move |&id| &self.rulesets[id])
    }

    /// Every ruleset that may apply to `host`, in priority order.
    ///
    /// The exact bucket comes first, then the right-wildcard key
    /// (`www.example.*`), then left-wildcard keys from most to least specific
    /// (`*.b.example.com`, `*.example.com`, `*.com`). A ruleset reachable
    /// through several keys is returned once, at its first position.
    pub fn candidates(&self, host: &str) -> Vec<&RuleSet> {
        let host = normalize_host(host);
        if !is_well_formed_host(&host) {
            return Vec::new();
        }

        let mut ids: Vec<usize> = Vec::new();
        self.collect(&host, &mut ids);

        if self.has_wildcards {
            if let Some(dot) = host.rfind('.') {
                self.collect(&format!("{}.*", &host[..dot]), &mut ids);
            }
            for parent in walk_parent_domains(&host) {
                self.collect(&format!("*.{parent}"), &mut ids);
            }
        }

        ids.into_iter().map(|id| &self.rulesets[id]).collect()
    }

    fn bucket(&self, key: &str) -> &[usize] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    fn collect(&self, key: &str, ids: &mut Vec<usize>) {
        for &id in self.bucket(key) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }

    /// All rulesets, in document order.
    pub fn rulesets(&self) -> &[RuleSet] {
        &self.rulesets
    }

    /// Number of rulesets held.
    pub fn len(&self) -> usize {
        self.rulesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rulesets.is_empty()
    }

    /// Number of distinct host keys.
    pub fn host_count(&self) -> usize {
        self.buckets.len()
    }
}
