use std::collections::HashMap;

/// Platform tag of rulesets that also upgrade passive mixed content.
pub const MIXED_CONTENT_PLATFORM: &str = "mixedcontent";

/// Knobs that decide which loaded rulesets are active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Activate rulesets whose platform includes `mixedcontent`.
    pub enable_mixed_rulesets: bool,
    /// Per-name override of the computed active flag.
    pub ruleset_active_states: HashMap<String, bool>,
}

impl LoadOptions {
    /// Decide whether a ruleset starts active.
    ///
    /// `default_off` and disabled mixed-content platforms turn a ruleset off;
    /// an explicit entry in `ruleset_active_states` overrides both.
    pub fn is_active(&self, name: &str, default_off: bool, platform: Option<&str>) -> bool {
        if let Some(&state) = self.ruleset_active_states.get(name) {
            return state;
        }

        if default_off {
            return false;
        }

        let mixed = platform
            .map(|p| p.split_whitespace().any(|tag| tag == MIXED_CONTENT_PLATFORM))
            .unwrap_or(false);

        !mixed || self.enable_mixed_rulesets
    }
}
