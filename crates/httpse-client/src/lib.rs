//! Reloadable client for the httpse rewrite engine
//!
//! [`HttpseClient`] owns the current host index. `load` builds a complete new
//! index off to the side and swaps it in with one pointer store, so
//! concurrent `rewrite` calls see either the old index or the new one, never
//! a half-built one. A rejected document leaves the current index in place.

pub mod config;

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use httpse_core::{HostIndex, Rewriter};
use httpse_loader::{load_index, LoadOptions};

pub use config::{ClientConfig, ConfigError};
pub use httpse_core::{RewriteAction, RewriteResult};
pub use httpse_loader::{LoadError, LoadStats, MalformedReason};

/// Index plus the stats of the load that produced it.
#[derive(Debug, Default)]
struct EngineState {
    index: HostIndex,
    /// `None` until the first successful load
    stats: Option<LoadStats>,
}

/// Stateful rewrite client.
///
/// Before the first successful [`load`](Self::load) every URL rewrites to
/// [`RewriteResult::NoOp`].
pub struct HttpseClient {
    state: ArcSwap<EngineState>,
    load_lock: Mutex<()>,
    options: LoadOptions,
}

impl Default for HttpseClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpseClient {
    /// Create an empty client with default options.
    pub fn new() -> Self {
        Self::with_options(LoadOptions::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_options(config.into())
    }

    pub fn with_options(options: LoadOptions) -> Self {
        Self {
            state: ArcSwap::from_pointee(EngineState::default()),
            load_lock: Mutex::new(()),
            options,
        }
    }

    /// Replace the loaded rules with the rulesets in `rules_json`.
    ///
    /// Loads are serialized. On error the previously loaded index stays in
    /// effect.
    pub fn load(&self, rules_json: &str) -> Result<LoadStats, LoadError> {
        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);

        match load_index(rules_json, &self.options) {
            Ok((index, stats)) => {
                self.state.store(Arc::new(EngineState {
                    index,
                    stats: Some(stats),
                }));
                log::info!(
                    "loaded {} rulesets covering {} hosts",
                    stats.rulesets,
                    stats.hosts
                );
                Ok(stats)
            }
            Err(e) => {
                log::warn!(
                    "rejected ruleset document, keeping {} loaded rulesets: {}",
                    self.state.load().index.len(),
                    e
                );
                Err(e)
            }
        }
    }

    /// Rewrite `url` against the current index.
    pub fn rewrite(&self, url: &str) -> RewriteResult {
        let state = self.state.load();
        let result = Rewriter::new(&state.index).rewrite(url);
        log::trace!("rewrite {} -> {:?}", url, result.action());
        result
    }

    /// Whether a document has been loaded successfully.
    pub fn is_loaded(&self) -> bool {
        self.state.load().stats.is_some()
    }

    /// Stats of the current index, if any document was loaded.
    pub fn stats(&self) -> Option<LoadStats> {
        self.state.load().stats
    }

    pub fn ruleset_count(&self) -> usize {
        self.state.load().index.len()
    }

    pub fn host_count(&self) -> usize {
        self.state.load().index.host_count()
    }
}
