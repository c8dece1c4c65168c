//! Core type definitions for the rewrite engine
//!
//! A ruleset document compiles into these types once, at load time. Nothing
//! here is mutated after the host index is built.

use regex::{Captures, Regex};

// =============================================================================
// Rewrite Rules
// =============================================================================

/// `from` pattern of the trivial rule.
pub const TRIVIAL_FROM: &str = "^http:";
/// `to` template of the trivial rule.
pub const TRIVIAL_TO: &str = "https:";

/// A single `(from, to)` rewrite rule.
#[derive(Debug, Clone)]
pub enum Rule {
    /// `^http:` -> `https:`. Applied as a prefix swap, no regex involved.
    Trivial,
    /// Regex substitution of the first match.
    Pattern {
        from: Regex,
        /// Template in `regex` expansion syntax (see [`normalize_template`]).
        to: String,
    },
}

impl Rule {
    /// Compile a rule from its ruleset form.
    pub fn new(from: &str, to: &str) -> Result<Self, regex::Error> {
        if from == TRIVIAL_FROM && to == TRIVIAL_TO {
            return Ok(Self::Trivial);
        }

        Ok(Self::Pattern {
            from: Regex::new(from)?,
            to: normalize_template(to),
        })
    }

    #[inline]
    pub fn is_trivial(&self) -> bool {
        matches!(self, Self::Trivial)
    }

    /// Apply the rule to `url`, returning the rewritten URL on a match.
    ///
    /// Only the first occurrence of the pattern is replaced.
    pub fn apply(&self, url: &str) -> Option<String> {
        match self {
            Self::Trivial => {
                let rest = url.strip_prefix("http:")?;
                Some(format!("https:{rest}"))
            }
            Self::Pattern { from, to } => {
                let caps = from.captures(url)?;
                Some(substitute(url, &caps, to))
            }
        }
    }
}

fn substitute(url: &str, caps: &Captures<'_>, template: &str) -> String {
    // Group 0 is always present on a successful match.
    let (start, end) = caps.get(0).map_or((0, 0), |m| (m.start(), m.end()));

    let mut out = String::with_capacity(url.len() + template.len());
    out.push_str(&url[..start]);
    caps.expand(template, &mut out);
    out.push_str(&url[end..]);
    out
}

/// Convert a ruleset replacement template into `regex` expansion syntax.
///
/// Ruleset templates follow the browser convention: `$1` is a group
/// reference, `$&` is the whole match, `$$` is a literal dollar and any other
/// `$` is literal. `regex` would read `$1abc` as the named group `1abc`, so
/// numbered references are braced.
pub fn normalize_template(to: &str) -> String {
    let bytes = to.as_bytes();
    let mut out = String::with_capacity(to.len() + 4);
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }

        out.push_str(&to[last..i]);

        match bytes.get(i + 1) {
            Some(b'$') => {
                out.push_str("$$");
                i += 2;
            }
            Some(b'&') => {
                out.push_str("${0}");
                i += 2;
            }
            Some(b) if b.is_ascii_digit() => {
                let digits = bytes[i + 1..]
                    .iter()
                    .take_while(|b| b.is_ascii_digit())
                    .count();
                out.push_str("${");
                out.push_str(&to[i + 1..i + 1 + digits]);
                out.push('}');
                i += 1 + digits;
            }
            _ => {
                out.push_str("$$");
                i += 1;
            }
        }

        last = i;
    }

    out.push_str(&to[last..]);
    out
}

// =============================================================================
// Secure Cookie Rules
// =============================================================================

/// A `securecookie` entry. Kept with its ruleset; URL rewriting never reads it.
#[derive(Debug, Clone)]
pub struct CookieRule {
    pub host: Regex,
    pub name: Regex,
}

impl CookieRule {
    pub fn new(host: &str, name: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            host: Regex::new(host)?,
            name: Regex::new(name)?,
        })
    }
}

// =============================================================================
// RuleSet
// =============================================================================

/// A named site policy: the hosts it governs and how to rewrite their URLs.
#[derive(Debug, Clone)]
pub struct RuleSet {
    /// Diagnostic label. Not used for matching.
    pub name: String,
    /// Target hosts as authored. May contain one `*` label.
    pub targets: Vec<String>,
    /// Ordered rewrite rules; the first match wins.
    pub rules: Vec<Rule>,
    /// URLs matching any of these are left alone by this ruleset.
    pub exclusions: Vec<Regex>,
    pub secure_cookie_rules: Vec<CookieRule>,
    /// Inactive rulesets keep their index slots but never rewrite.
    pub active: bool,
}

impl RuleSet {
    /// Create an empty, active ruleset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            targets: Vec::new(),
            rules: Vec::new(),
            exclusions: Vec::new(),
            secure_cookie_rules: Vec::new(),
            active: true,
        }
    }

    /// Check whether `url` hits one of the exclusion patterns.
    pub fn is_excluded(&self, url: &str) -> bool {
        self.exclusions.iter().any(|re| re.is_match(url))
    }

    /// Apply the first matching rule to `url`.
    ///
    /// Returns `None` when the URL is excluded or no rule matches.
    pub fn apply(&self, url: &str) -> Option<String> {
        if self.is_excluded(url) {
            return None;
        }
        self.rules.iter().find_map(|rule| rule.apply(url))
    }
}

// =============================================================================
// Rewrite Result
// =============================================================================

/// Kind of verdict, for callers that only need the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RewriteAction {
    /// No rule produced a new URL
    NoOp = 0,
    /// The request should be redirected to `new_url`
    RewriteUrl = 1,
}

/// Outcome of rewriting one URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RewriteResult {
    #[default]
    NoOp,
    RewriteUrl(String),
}

impl RewriteResult {
    pub fn action(&self) -> RewriteAction {
        match self {
            Self::NoOp => RewriteAction::NoOp,
            Self::RewriteUrl(_) => RewriteAction::RewriteUrl,
        }
    }

    /// The rewritten URL, or `""` for a no-op.
    pub fn new_url(&self) -> &str {
        match self {
            Self::NoOp => "",
            Self::RewriteUrl(url) => url,
        }
    }

    pub fn into_new_url(self) -> Option<String> {
        match self {
            Self::NoOp => None,
            Self::RewriteUrl(url) => Some(url),
        }
    }

    #[inline]
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivial_rule_detected() {
        assert!(Rule::new("^http:", "https:").unwrap().is_trivial());
        assert!(!Rule::new("^http://", "https://").unwrap().is_trivial());
    }

    #[test]
    fn test_trivial_rule_apply() {
        let rule = Rule::Trivial;
        assert_eq!(rule.apply("http://01.org/"), Some("https://01.org/".to_string()));
        assert_eq!(rule.apply("https://01.org/"), None);
        assert_eq!(rule.apply("ftp://01.org/"), None);
    }

    #[test]
    fn test_pattern_rule_replaces_first_match_only() {
        let rule = Rule::new("a", "b").unwrap();
        assert_eq!(rule.apply("http://aaa.org/"), Some("http://baa.org/".to_string()));
    }

    #[test]
    fn test_pattern_rule_expands_groups() {
        let rule = Rule::new(
            r"^http://(www\.)?example\.com/(\w+)",
            "https://secure.example.com/$2x",
        )
        .unwrap();
        assert_eq!(
            rule.apply("http://www.example.com/path/more"),
            Some("https://secure.example.com/pathx/more".to_string())
        );
        assert_eq!(rule.apply("http://other.org/"), None);
    }

    #[test]
    fn test_normalize_template() {
        assert_eq!(normalize_template("https:"), "https:");
        assert_eq!(normalize_template("https://$1.example/$2abc"), "https://${1}.example/${2}abc");
        assert_eq!(normalize_template("$$1"), "$$1");
        assert_eq!(normalize_template("a$&b"), "a${0}b");
        assert_eq!(normalize_template("price$"), "price$$");
        assert_eq!(normalize_template("$name"), "$$name");
        assert_eq!(normalize_template("ünï$1cödé"), "ünï${1}cödé");
    }

    #[test]
    fn test_literal_dollar_survives_expansion() {
        let rule = Rule::new("^http://x/", "https://x/$cost/").unwrap();
        assert_eq!(rule.apply("http://x/a"), Some("https://x/$cost/a".to_string()));
    }

    #[test]
    fn test_ruleset_first_rule_wins() {
        let mut rs = RuleSet::new("0bin.net");
        rs.rules.push(Rule::new(r"^http://www\.0bin\.net/", "https://0bin.net/").unwrap());
        rs.rules.push(Rule::Trivial);

        assert_eq!(
            rs.apply("http://www.0bin.net/api/v1/bin").as_deref(),
            Some("https://0bin.net/api/v1/bin")
        );
        assert_eq!(rs.apply("http://0bin.net/").as_deref(), Some("https://0bin.net/"));
    }

    #[test]
    fn test_ruleset_exclusion() {
        let mut rs = RuleSet::new("example");
        rs.rules.push(Rule::Trivial);
        rs.exclusions.push(Regex::new(r"^http://example\.com/plain/").unwrap());

        assert!(rs.apply("http://example.com/plain/page").is_none());
        assert!(rs.apply("http://example.com/other").is_some());
    }

    #[test]
    fn test_ruleset_without_rules_never_rewrites() {
        let rs = RuleSet::new("empty");
        assert!(rs.apply("http://example.com/").is_none());
    }

    #[test]
    fn test_rewrite_result_accessors() {
        let noop = RewriteResult::NoOp;
        assert_eq!(noop.action(), RewriteAction::NoOp);
        assert_eq!(noop.new_url(), "");
        assert!(noop.is_noop());
        assert_eq!(noop.into_new_url(), None);

        let hit = RewriteResult::RewriteUrl("https://a.org/".to_string());
        assert_eq!(hit.action(), RewriteAction::RewriteUrl);
        assert_eq!(hit.new_url(), "https://a.org/");
        assert_eq!(hit.into_new_url().as_deref(), Some("https://a.org/"));
    }

    #[test]
    fn test_cookie_rule_compiles() {
        let rule = CookieRule::new(r"^0bin\.net", ".+").unwrap();
        assert!(rule.host.is_match("0bin.net"));
        assert!(CookieRule::new("(", ".+").is_err());
    }
}
