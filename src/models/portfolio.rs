use std::collections::HashMap;

/// One line of a portfolio-directory file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioEntry {
    pub group: String,
    /// Where the group's portfolio lives in the UI (usually a URL).
    pub target: String,
}

/// Group name to navigation target. The first registration of a group wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortfolioMap {
    targets: HashMap<String, String>,
}

impl PortfolioMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group unless it is already known. Returns whether the entry was kept.
    pub fn insert(&mut self, entry: PortfolioEntry) -> bool {
        if self.targets.contains_key(&entry.group) {
            return false;
        }
        self.targets.insert(entry.group, entry.target);
        true
    }

    pub fn target(&self, group: &str) -> Option<&str> {
        self.targets.get(group).map(String::as_str)
    }

    pub fn contains(&self, group: &str) -> bool {
        self.targets.contains_key(group)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(group: &str, target: &str) -> PortfolioEntry {
        PortfolioEntry {
            group: group.to_string(),
            target: target.to_string(),
        }
    }

    #[test]
    fn test_first_registration_wins() {
        let mut map = PortfolioMap::new();
        assert!(map.insert(entry("Tech", "https://finance.example/p/1")));
        assert!(!map.insert(entry("Tech", "https://finance.example/p/2")));
        assert_eq!(map.target("Tech"), Some("https://finance.example/p/1"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_unknown_group_has_no_target() {
        let map = PortfolioMap::new();
        assert!(map.target("Missing").is_none());
        assert!(!map.contains("Missing"));
        assert!(map.is_empty());
    }
}
