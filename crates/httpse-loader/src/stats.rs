use serde::Serialize;

use httpse_core::HostIndex;

/// Counts describing a loaded index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LoadStats {
    pub rulesets: usize,
    pub active_rulesets: usize,
    pub rules: usize,
    pub targets: usize,
    /// Distinct host keys in the index
    pub hosts: usize,
}

impl LoadStats {
    pub fn from_index(index: &HostIndex) -> Self {
        let rulesets = index.rulesets();
        Self {
            rulesets: rulesets.len(),
            active_rulesets: rulesets.iter().filter(|rs| rs.active).count(),
            rules: rulesets.iter().map(|rs| rs.rules.len()).sum(),
            targets: rulesets.iter().map(|rs| rs.targets.len()).sum(),
            hosts: index.host_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_rulesets;

    #[test]
    fn test_stats_from_index() {
        let json = r#"[
            {"name":"a","target":["a.org","www.a.org"],"rule":[{"from":"^http:","to":"https:"}]},
            {"name":"b","target":["a.org"],"default_off":"slow","rule":[{"from":"^http:","to":"https:"},{"from":"^http://b/","to":"https://b/"}]}
        ]"#;
        let index = HostIndex::build(parse_rulesets(json).unwrap());
        let stats = LoadStats::from_index(&index);

        assert_eq!(
            stats,
            LoadStats {
                rulesets: 2,
                active_rulesets: 1,
                rules: 3,
                targets: 3,
                hosts: 2,
            }
        );
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(LoadStats::from_index(&HostIndex::default()), LoadStats::default());
    }
}
