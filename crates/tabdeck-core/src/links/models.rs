use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a link's tile image comes from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IconSource {
    /// Resolved through the favicon pipeline
    #[default]
    Auto,
    /// User-supplied image URL
    Custom { url: String },
    /// Always render the fallback glyph
    Disabled,
}

impl IconSource {
    /// Whether the favicon pipeline should resolve an icon for this link
    pub fn wants_resolution(&self) -> bool {
        matches!(self, IconSource::Auto)
    }
}

/// A quick-launch link shown in the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickLink {
    pub id: String,
    pub name: String,
    /// Normalized absolute URL
    pub url: String,
    #[serde(default)]
    pub icon: IconSource,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub order: u32,
    /// Recent launches, newest last
    #[serde(default)]
    pub access_log: Vec<DateTime<Utc>>,
}

/// Data required to create a new link
#[derive(Debug, Clone, Default)]
pub struct NewLink {
    pub name: Option<String>,
    pub url: String,
    pub tags: Vec<String>,
}

/// Changes applied to an existing link
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub icon: Option<IconSource>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Background {
    Solid { color: String },
    Image { url: String },
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid {
            color: "#282828".to_string(),
        }
    }
}

/// User-facing page settings, persisted by the storage collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_grid_rows")]
    pub grid_rows: u16,
    #[serde(default = "default_grid_columns")]
    pub grid_columns: u16,
    #[serde(default = "default_icon_size")]
    pub icon_size: u16,
    #[serde(default = "default_true")]
    pub clock_24h: bool,
    #[serde(default)]
    pub show_seconds: bool,
    #[serde(default)]
    pub open_in_new_tab: bool,
    #[serde(default)]
    pub background: Background,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_rows: default_grid_rows(),
            grid_columns: default_grid_columns(),
            icon_size: default_icon_size(),
            clock_24h: default_true(),
            show_seconds: false,
            open_in_new_tab: false,
            background: Background::default(),
        }
    }
}

pub const GRID_ROWS_RANGE: (u16, u16) = (1, 6);
pub const GRID_COLUMNS_RANGE: (u16, u16) = (1, 12);
pub const ICON_SIZE_RANGE: (u16, u16) = (16, 128);

impl Settings {
    /// Apply a merge-patch; absent fields keep their current value
    pub fn merge(&self, patch: &SettingsPatch) -> Settings {
        let mut merged = self.clone();
        if let Some(rows) = patch.grid_rows {
            merged.grid_rows = rows;
        }
        if let Some(columns) = patch.grid_columns {
            merged.grid_columns = columns;
        }
        if let Some(size) = patch.icon_size {
            merged.icon_size = size;
        }
        if let Some(clock_24h) = patch.clock_24h {
            merged.clock_24h = clock_24h;
        }
        if let Some(show_seconds) = patch.show_seconds {
            merged.show_seconds = show_seconds;
        }
        if let Some(open_in_new_tab) = patch.open_in_new_tab {
            merged.open_in_new_tab = open_in_new_tab;
        }
        if let Some(ref background) = patch.background {
            merged.background = background.clone();
        }
        merged.clamped()
    }

    /// Clamp grid dimensions into supported bounds
    pub fn clamped(mut self) -> Settings {
        self.grid_rows = self.grid_rows.clamp(GRID_ROWS_RANGE.0, GRID_ROWS_RANGE.1);
        self.grid_columns = self
            .grid_columns
            .clamp(GRID_COLUMNS_RANGE.0, GRID_COLUMNS_RANGE.1);
        self.icon_size = self.icon_size.clamp(ICON_SIZE_RANGE.0, ICON_SIZE_RANGE.1);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub grid_rows: Option<u16>,
    pub grid_columns: Option<u16>,
    pub icon_size: Option<u16>,
    pub clock_24h: Option<bool>,
    pub show_seconds: Option<bool>,
    pub open_in_new_tab: Option<bool>,
    pub background: Option<Background>,
}

fn default_grid_rows() -> u16 {
    3
}

fn default_grid_columns() -> u16 {
    6
}

fn default_icon_size() -> u16 {
    48
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_absent_fields() {
        let base = Settings {
            grid_rows: 2,
            show_seconds: true,
            ..Default::default()
        };
        let merged = base.merge(&SettingsPatch {
            grid_columns: Some(8),
            ..Default::default()
        });
        assert_eq!(merged.grid_rows, 2);
        assert_eq!(merged.grid_columns, 8);
        assert!(merged.show_seconds);
    }

    #[test]
    fn test_merge_clamps_grid() {
        let merged = Settings::default().merge(&SettingsPatch {
            grid_rows: Some(0),
            grid_columns: Some(40),
            icon_size: Some(4),
            ..Default::default()
        });
        assert_eq!(merged.grid_rows, 1);
        assert_eq!(merged.grid_columns, 12);
        assert_eq!(merged.icon_size, 16);
    }

    #[test]
    fn test_icon_source_defaults_to_auto() {
        let link: QuickLink =
            serde_json::from_str(r#"{"id":"a","name":"A","url":"https://a.com/"}"#).unwrap();
        assert_eq!(link.icon, IconSource::Auto);
        assert!(link.icon.wants_resolution());
        assert!(!IconSource::Disabled.wants_resolution());
        assert!(!IconSource::Custom { url: "https://x/i.png".into() }.wants_resolution());
    }
}
