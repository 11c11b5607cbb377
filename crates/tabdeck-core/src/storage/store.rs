use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::links::{QuickLink, Settings, SettingsPatch};
use crate::Result;

/// Link id -> chosen favicon URL
pub type FaviconPreferences = BTreeMap<String, String>;

/// Persistent key/value capability used by the rest of tabdeck
///
/// Every write replaces the whole value for its key and returns the
/// normalized state that was stored.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn load_links(&self) -> Result<Vec<QuickLink>>;

    /// Re-number `order` to match the given sequence and persist
    async fn save_links(&self, links: Vec<QuickLink>) -> Result<Vec<QuickLink>>;

    async fn load_favicon_preferences(&self) -> Result<FaviconPreferences>;

    async fn save_favicon_preferences(
        &self,
        preferences: FaviconPreferences,
    ) -> Result<FaviconPreferences>;

    async fn load_settings(&self) -> Result<Settings>;

    /// Merge `patch` into the stored settings
    async fn save_settings(&self, patch: SettingsPatch) -> Result<Settings>;
}

/// Drop entries with a blank id or URL
pub fn normalize_preferences(preferences: FaviconPreferences) -> FaviconPreferences {
    preferences
        .into_iter()
        .filter(|(id, url)| !id.trim().is_empty() && !url.trim().is_empty())
        .map(|(id, url)| (id, url.trim().to_string()))
        .collect()
}

/// Number links 0..n in sequence order
pub fn renumber_links(links: Vec<QuickLink>) -> Vec<QuickLink> {
    links
        .into_iter()
        .enumerate()
        .map(|(i, mut link)| {
            link.order = i as u32;
            link
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_drops_blank_entries() {
        let mut prefs = FaviconPreferences::new();
        prefs.insert("a".into(), " https://a.com/favicon.ico ".into());
        prefs.insert("b".into(), "   ".into());
        prefs.insert(" ".into(), "https://c.com/favicon.ico".into());

        let normalized = normalize_preferences(prefs);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized["a"], "https://a.com/favicon.ico");
    }
}
