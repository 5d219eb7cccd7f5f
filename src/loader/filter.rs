//! Property filters
//!
//! - no filter: every key is admitted
//! - `prefix.*`: keys starting with `prefix.` are admitted
//! - anything else: only that exact key is admitted
//!
//! An active filter also disables `import` lines in the filtered file.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PropertyFilter {
    #[default]
    All,
    Prefix(String),
    Exact(String),
}

impl PropertyFilter {
    /// Parses the filter argument of an `import` line.
    ///
    /// `None` and the empty string both mean "no filter".
    pub fn parse(spec: Option<&str>) -> Self {
        match spec {
            None | Some("") => PropertyFilter::All,
            Some(s) => match s.strip_suffix('*') {
                Some(prefix) => PropertyFilter::Prefix(prefix.to_string()),
                None => PropertyFilter::Exact(s.to_string()),
            },
        }
    }

    /// Whether `key` passes the filter.
    pub fn admits(&self, key: &str) -> bool {
        match self {
            PropertyFilter::All => true,
            PropertyFilter::Prefix(prefix) => key.starts_with(prefix.as_str()),
            PropertyFilter::Exact(exact) => key == exact,
        }
    }

    /// Whether any filtering is in effect.
    pub fn is_active(&self) -> bool {
        !matches!(self, PropertyFilter::All)
    }
}

impl fmt::Display for PropertyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyFilter::All => write!(f, "null"),
            PropertyFilter::Prefix(prefix) => write!(f, "{}*", prefix),
            PropertyFilter::Exact(exact) => write!(f, "{}", exact),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(PropertyFilter::parse(None), PropertyFilter::All);
        assert_eq!(PropertyFilter::parse(Some("")), PropertyFilter::All);
        assert_eq!(
            PropertyFilter::parse(Some("ro.foo.*")),
            PropertyFilter::Prefix("ro.foo.".into())
        );
        assert_eq!(
            PropertyFilter::parse(Some("ro.foo.bar")),
            PropertyFilter::Exact("ro.foo.bar".into())
        );
    }

    #[test]
    fn test_prefix_filter() {
        let filter = PropertyFilter::parse(Some("ro.foo.*"));
        assert!(filter.admits("ro.foo.bar"));
        assert!(filter.admits("ro.foo.bar.baz"));
        assert!(!filter.admits("ro.fo.bar"));
        assert!(!filter.admits("ro.foo"));
    }

    #[test]
    fn test_exact_filter() {
        let filter = PropertyFilter::parse(Some("ro.foo.bar"));
        assert!(filter.admits("ro.foo.bar"));
        assert!(!filter.admits("ro.foo.barx"));
        assert!(!filter.admits("ro.foo"));
    }

    #[test]
    fn test_star_alone_admits_everything_but_is_active() {
        let filter = PropertyFilter::parse(Some("*"));
        assert!(filter.admits("anything"));
        assert!(filter.is_active());
        assert!(!PropertyFilter::All.is_active());
    }

    #[test]
    fn test_display() {
        assert_eq!(PropertyFilter::All.to_string(), "null");
        assert_eq!(PropertyFilter::parse(Some("a.*")).to_string(), "a.*");
    }
}
