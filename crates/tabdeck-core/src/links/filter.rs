use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::normalize::display_host;
use super::QuickLink;

/// Links matching every whitespace-separated term of `query`
///
/// A term matches when it appears (case-insensitively) in the name, the host,
/// or one of the tags. An empty query matches everything.
pub fn filter_links<'a>(links: &'a [QuickLink], query: &str) -> Vec<&'a QuickLink> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect();

    if terms.is_empty() {
        return links.iter().collect();
    }

    links
        .iter()
        .filter(|link| {
            let name = link.name.to_lowercase();
            let host = display_host(&link.url).unwrap_or_default().to_lowercase();
            terms.iter().all(|term| {
                name.contains(term.as_str())
                    || host.contains(term.as_str())
                    || link.tags.iter().any(|tag| tag.to_lowercase().contains(term.as_str()))
            })
        })
        .collect()
}

/// Stable hash of a filter query, used to detect layout-affecting changes
pub fn query_hash(query: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    query.trim().to_lowercase().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::IconSource;

    fn link(name: &str, url: &str, tags: &[&str]) -> QuickLink {
        QuickLink {
            id: name.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            icon: IconSource::Auto,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            order: 0,
            access_log: Vec::new(),
        }
    }

    #[test]
    fn test_empty_query_matches_all() {
        let links = vec![link("A", "https://a.com/", &[]), link("B", "https://b.com/", &[])];
        assert_eq!(filter_links(&links, "  ").len(), 2);
    }

    #[test]
    fn test_terms_must_all_match() {
        let links = vec![
            link("GitHub", "https://github.com/", &["dev"]),
            link("Docs", "https://docs.rs/", &["dev", "rust"]),
            link("News", "https://news.ycombinator.com/", &[]),
        ];
        let hits: Vec<&str> = filter_links(&links, "DEV rust")
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(hits, vec!["Docs"]);

        let hits: Vec<&str> = filter_links(&links, "ycomb")
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(hits, vec!["News"]);
    }

    #[test]
    fn test_query_hash_ignores_case_and_padding() {
        assert_eq!(query_hash(" Rust "), query_hash("rust"));
        assert_ne!(query_hash("rust"), query_hash("go"));
    }
}
