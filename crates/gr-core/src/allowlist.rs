//! Group allow-list
//!
//! The set of group names a request may target. Built once at startup and
//! never mutated afterwards.

/// Ordered list of permitted destination group names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    groups: Vec<String>,
}

impl AllowList {
    /// Create an allow-list from already separated names
    ///
    /// Names are trimmed and empty entries dropped.
    pub fn new<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let groups = groups
            .into_iter()
            .map(|g| g.as_ref().trim().to_string())
            .filter(|g| !g.is_empty())
            .collect();

        Self { groups }
    }

    /// Parse a comma-separated value such as `ALLOWED_GROUPS`
    pub fn parse(value: &str) -> Self {
        Self::new(value.split(','))
    }

    /// Exact, case-sensitive membership check
    pub fn contains(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comma_separated() {
        let list = AllowList::parse("Team A,Team B");
        assert_eq!(list.groups(), &["Team A".to_string(), "Team B".to_string()]);
    }

    #[test]
    fn test_parse_trims_and_skips_empty() {
        let list = AllowList::parse(" Team A , ,Team B,");
        assert_eq!(list.len(), 2);
        assert!(list.contains("Team A"));
        assert!(list.contains("Team B"));
    }

    #[test]
    fn test_parse_empty_value() {
        let list = AllowList::parse("");
        assert!(list.is_empty());
        assert!(!list.contains(""));
    }

    #[test]
    fn test_contains_is_case_sensitive() {
        let list = AllowList::parse("Team A");
        assert!(list.contains("Team A"));
        assert!(!list.contains("team a"));
        assert!(!list.contains("Team A "));
        assert!(!list.contains("Team"));
    }

    #[test]
    fn test_preserves_order() {
        let list = AllowList::new(["b", "a", "c"]);
        assert_eq!(list.groups(), &["b", "a", "c"]);
    }
}
