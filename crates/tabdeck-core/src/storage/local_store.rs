use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::retry::with_retry;
use super::store::{normalize_preferences, renumber_links, FaviconPreferences, Storage};
use super::Database;
use crate::links::{QuickLink, Settings, SettingsPatch};
use crate::Result;

const KEY_LINKS: &str = "links";
const KEY_FAVICON_PREFERENCES: &str = "favicon_preferences";
const KEY_SETTINGS: &str = "settings";

/// [`Storage`] backed by a JSON key/value table in the local database
#[derive(Clone)]
pub struct LocalStore {
    db: Database,
}

impl LocalStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let value = with_retry("kv_get", || {
            sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
                .bind(key)
                .fetch_optional(self.db.pool())
        })
        .await?;
        Ok(value)
    }

    async fn put_raw(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        with_retry("kv_put", || {
            sqlx::query(
                r#"
                INSERT INTO kv_store (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(key)
            .bind(value)
            .bind(now.as_str())
            .execute(self.db.pool())
        })
        .await?;
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_raw(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn put_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.put_raw(key, &raw).await
    }
}

#[async_trait]
impl Storage for LocalStore {
    async fn load_links(&self) -> Result<Vec<QuickLink>> {
        let mut links: Vec<QuickLink> = self.get_json(KEY_LINKS).await?.unwrap_or_default();
        links.sort_by_key(|l| l.order);
        Ok(links)
    }

    async fn save_links(&self, links: Vec<QuickLink>) -> Result<Vec<QuickLink>> {
        let links = renumber_links(links);
        self.put_json(KEY_LINKS, &links).await?;
        tracing::debug!(count = links.len(), "Saved links");
        Ok(links)
    }

    async fn load_favicon_preferences(&self) -> Result<FaviconPreferences> {
        // Tolerate hand-edited or older values that hold non-string entries
        let raw: Option<serde_json::Map<String, serde_json::Value>> =
            self.get_json(KEY_FAVICON_PREFERENCES).await?;
        let preferences = raw
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(id, value)| match value {
                serde_json::Value::String(url) => Some((id, url)),
                _ => None,
            })
            .collect();
        Ok(normalize_preferences(preferences))
    }

    async fn save_favicon_preferences(
        &self,
        preferences: FaviconPreferences,
    ) -> Result<FaviconPreferences> {
        let preferences = normalize_preferences(preferences);
        self.put_json(KEY_FAVICON_PREFERENCES, &preferences).await?;
        tracing::debug!(count = preferences.len(), "Saved favicon preferences");
        Ok(preferences)
    }

    async fn load_settings(&self) -> Result<Settings> {
        let settings: Settings = self.get_json(KEY_SETTINGS).await?.unwrap_or_default();
        Ok(settings.clamped())
    }

    async fn save_settings(&self, patch: SettingsPatch) -> Result<Settings> {
        let merged = self.load_settings().await?.merge(&patch);
        self.put_json(KEY_SETTINGS, &merged).await?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::IconSource;

    async fn store() -> LocalStore {
        LocalStore::new(Database::new_in_memory().await.unwrap())
    }

    fn link(id: &str, order: u32) -> QuickLink {
        QuickLink {
            id: id.to_string(),
            name: id.to_uppercase(),
            url: format!("https://{}.com/", id),
            icon: IconSource::Auto,
            tags: Vec::new(),
            order,
            access_log: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_empty_store_defaults() {
        let store = store().await;
        assert!(store.load_links().await.unwrap().is_empty());
        assert!(store.load_favicon_preferences().await.unwrap().is_empty());
        assert_eq!(store.load_settings().await.unwrap(), Settings::default());
    }

    #[tokio::test]
    async fn test_save_links_renumbers_in_sequence() {
        let store = store().await;
        let saved = store
            .save_links(vec![link("b", 7), link("a", 3), link("c", 3)])
            .await
            .unwrap();
        let ids: Vec<(&str, u32)> = saved.iter().map(|l| (l.id.as_str(), l.order)).collect();
        assert_eq!(ids, vec![("b", 0), ("a", 1), ("c", 2)]);

        let loaded = store.load_links().await.unwrap();
        assert_eq!(loaded, saved);
    }

    #[tokio::test]
    async fn test_preferences_are_normalized_on_save() {
        let store = store().await;
        let mut prefs = FaviconPreferences::new();
        prefs.insert("a".into(), "https://a.com/favicon.ico".into());
        prefs.insert("b".into(), String::new());

        let saved = store.save_favicon_preferences(prefs).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(store.load_favicon_preferences().await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_preferences_skip_non_string_values() {
        let store = store().await;
        store
            .put_raw(
                KEY_FAVICON_PREFERENCES,
                r#"{"a":"https://a.com/favicon.ico","b":null,"c":42}"#,
            )
            .await
            .unwrap();
        let prefs = store.load_favicon_preferences().await.unwrap();
        assert_eq!(prefs.keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_settings_merge_patch() {
        let store = store().await;
        store
            .save_settings(SettingsPatch {
                grid_rows: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        let merged = store
            .save_settings(SettingsPatch {
                clock_24h: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(merged.grid_rows, 2);
        assert!(!merged.clock_24h);
        assert_eq!(store.load_settings().await.unwrap(), merged);
    }
}
