//! # Selection Policy
//!
//! Decides which keys have their values encrypted, and which values are never
//! worth encrypting.
//!
//! Patterns are anchored, case-sensitive globs where `*` matches any run of
//! characters, including none. `**` is just two stars and means the same as
//! `*`.

/// Patterns applied when neither `--only` nor configuration names any.
pub const DEFAULT_PATTERNS: &[&str] = &["**_KEY", "*_KEYS", "*_SECRET", "*_PASSWORD", "*_TOKEN"];

/// Values that are conventional defaults, never secrets.
const SAFE_LITERALS: &[&str] = &["null", "true", "false"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPolicy {
    patterns: Vec<String>,
    all: bool,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERNS.iter().map(|p| p.to_string()), false)
    }
}

impl SelectionPolicy {
    pub fn new<I, S>(patterns: I, all: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            all,
        }
    }

    /// Build a policy from a comma-separated pattern list such as
    /// `*_KEY, *_SECRET`. Blank entries are dropped.
    pub fn from_csv(csv: &str, all: bool) -> Self {
        Self::new(split_patterns(csv), all)
    }

    /// Policy that selects every key.
    pub fn all() -> Self {
        Self::new(Vec::<String>::new(), true)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether the value under `key` should be transformed.
    pub fn matches(&self, key: &str) -> bool {
        self.all || self.patterns.iter().any(|p| glob_match(p, key))
    }
}

/// Split a comma-separated pattern list, trimming each entry.
pub fn split_patterns(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Anchored glob match where `*` matches zero or more characters.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    // Position of the last star seen and the text index it was tried at.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((star, tried)) = backtrack {
            p = star + 1;
            t = tried + 1;
            backtrack = Some((star, tried + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// Blank values and the literals `null`, `true` and `false` stay readable.
pub fn is_safe_literal(value: &str) -> bool {
    value.trim().is_empty() || SAFE_LITERALS.contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_suffix() {
        assert!(glob_match("*_KEY", "APP_KEY"));
        assert!(glob_match("*_KEY", "_KEY"));
        assert!(!glob_match("*_KEY", "APP_KEYS"));
        assert!(!glob_match("*_KEY", "APP_KEY_ID"));
    }

    #[test]
    fn test_double_star_is_single_star() {
        for key in ["APP_KEY", "_KEY", "A_B_KEY", "APP_KEYS", "KEY"] {
            assert_eq!(glob_match("**_KEY", key), glob_match("*_KEY", key), "{key}");
        }
    }

    #[test]
    fn test_glob_is_anchored() {
        assert!(!glob_match("SECRET", "MY_SECRET"));
        assert!(glob_match("SECRET", "SECRET"));
        assert!(glob_match("DB_*", "DB_"));
        assert!(glob_match("*", ""));
        assert!(!glob_match("", "A"));
    }

    #[test]
    fn test_glob_inner_star_backtracks() {
        assert!(glob_match("A*B*C", "AxxBxxBxxC"));
        assert!(glob_match("*_*_TOKEN", "GITHUB_API_TOKEN"));
        assert!(!glob_match("A*B*C", "AxxBxx"));
    }

    #[test]
    fn test_glob_is_case_sensitive() {
        assert!(!glob_match("*_TOKEN", "api_token"));
    }

    #[test]
    fn test_default_policy() {
        let policy = SelectionPolicy::default();
        for key in ["APP_KEY", "AWS_KEYS", "CLIENT_SECRET", "DB_PASSWORD", "API_TOKEN"] {
            assert!(policy.matches(key), "{key}");
        }
        for key in ["APP_NAME", "APP_URL", "KEY", "TOKEN_TTL"] {
            assert!(!policy.matches(key), "{key}");
        }
    }

    #[test]
    fn test_empty_policy_matches_nothing() {
        let policy = SelectionPolicy::new(Vec::<String>::new(), false);
        assert!(!policy.matches("APP_KEY"));
    }

    #[test]
    fn test_all_overrides_patterns() {
        let policy = SelectionPolicy::new(["*_SECRET"], true);
        assert!(policy.matches("APP_NAME"));
        assert!(SelectionPolicy::all().matches(""));
    }

    #[test]
    fn test_from_csv_trims_and_drops_blanks() {
        let policy = SelectionPolicy::from_csv(" *_SECRET, ,DB_* ,", false);
        assert_eq!(policy.patterns(), ["*_SECRET", "DB_*"]);
    }

    #[test]
    fn test_safe_literals() {
        for value in ["", " ", "\t", "null", "true", "false"] {
            assert!(is_safe_literal(value), "{value:?}");
        }
        for value in ["NULL", "True", " null", "false ", "0", "1", "secret"] {
            assert!(!is_safe_literal(value), "{value:?}");
        }
    }
}
