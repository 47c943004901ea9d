//! Persisted blocklist snapshot and list parsing

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store key holding the merged blocklist
pub const BLOCKLIST_KEY: &str = "blocklist:domains";

/// Merged blocklist as persisted in the key-value store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlocklistSnapshot {
    /// Sorted, de-duplicated domains
    pub domains: Vec<String>,
    pub count: usize,
    pub updated_at: DateTime<Utc>,
}

impl BlocklistSnapshot {
    pub fn new(domains: Vec<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            count: domains.len(),
            domains,
            updated_at,
        }
    }
}

/// Parses a plain-text domain list
///
/// One domain per line. Blank lines, `#` comments and entries without a dot
/// are dropped. Entries are trimmed and lower-cased.
pub fn parse_domain_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty() && !line.starts_with('#') && line.contains('.'))
        .collect()
}

/// Sorted union of several domain lists
pub fn merge_domain_lists<I>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    lists
        .into_iter()
        .flatten()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_domain_list() {
        let text = "# header\n\nMailinator.com\n  tempmail.io  \nlocalhost\n#comment.com\r\nyopmail.com\r\n";

        assert_eq!(
            parse_domain_list(text),
            vec!["mailinator.com", "tempmail.io", "yopmail.com"]
        );
    }

    #[test]
    fn test_merge_sorts_and_dedups() {
        let merged = merge_domain_lists(vec![
            vec!["b.com".to_string(), "a.com".to_string()],
            vec![],
            vec!["a.com".to_string(), "c.com".to_string()],
        ]);

        assert_eq!(merged, vec!["a.com", "b.com", "c.com"]);
    }

    #[test]
    fn test_snapshot_count_matches_domains() {
        let snapshot = BlocklistSnapshot::new(vec!["a.com".to_string()], Utc::now());
        assert_eq!(snapshot.count, 1);
    }
}
