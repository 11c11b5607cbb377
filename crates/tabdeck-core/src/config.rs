use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub favicon: FaviconConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Tuning for the paged link scroller
///
/// Distances are in pixels of the scroll surface. The terminal surface maps
/// cells onto pixels using `ui.cell_px`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Fraction of the remaining distance covered per frame during wheel motion
    #[serde(default = "default_wheel_ease")]
    pub wheel_ease: f64,
    /// Fraction of the remaining distance covered per frame during page jumps
    #[serde(default = "default_page_ease")]
    pub page_ease: f64,
    /// Remaining distance below which an animation is considered settled
    #[serde(default = "default_settle_epsilon")]
    pub settle_epsilon_px: f64,
    /// Wheel inactivity after which the scroller re-snaps to a page
    #[serde(default = "default_wheel_idle_ms")]
    pub wheel_idle_ms: u64,
    /// Share of each normalized wheel delta applied to the target
    #[serde(default = "default_wheel_gain")]
    pub wheel_gain: f64,
    /// Lower bound of the magnet radius
    #[serde(default = "default_magnet_min")]
    pub magnet_min_px: f64,
    /// Magnet radius as a share of the column step
    #[serde(default = "default_magnet_column_ratio")]
    pub magnet_column_ratio: f64,
    /// Multiplier on the magnet radius for the directional snap point
    #[serde(default = "default_directional_magnet_factor")]
    pub directional_magnet_factor: f64,
    /// Pixels per wheel line
    #[serde(default = "default_line_delta")]
    pub line_delta_px: f64,
    /// Normalized deltas below this magnitude are ignored
    #[serde(default = "default_noise_threshold")]
    pub noise_threshold: f64,
    /// Animation frame rate
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            wheel_ease: default_wheel_ease(),
            page_ease: default_page_ease(),
            settle_epsilon_px: default_settle_epsilon(),
            wheel_idle_ms: default_wheel_idle_ms(),
            wheel_gain: default_wheel_gain(),
            magnet_min_px: default_magnet_min(),
            magnet_column_ratio: default_magnet_column_ratio(),
            directional_magnet_factor: default_directional_magnet_factor(),
            line_delta_px: default_line_delta(),
            noise_threshold: default_noise_threshold(),
            animation_fps: default_animation_fps(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaviconConfig {
    /// Resolve favicons automatically
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Per-candidate probe timeout in milliseconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,
    /// Largest icon body accepted by the probe
    #[serde(default = "default_max_icon_bytes")]
    pub max_icon_bytes: usize,
    /// Minimum side for icons served by low-resolution providers at render time
    #[serde(default = "default_render_quality_floor")]
    pub render_quality_floor_px: u32,
}

impl Default for FaviconConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            probe_timeout_ms: default_probe_timeout(),
            max_icon_bytes: default_max_icon_bytes(),
            render_quality_floor_px: default_render_quality_floor(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Virtual pixels per terminal cell
    #[serde(default = "default_cell_px")]
    pub cell_px: f64,
    /// Tile width in cells
    #[serde(default = "default_tile_width")]
    pub tile_width: u16,
    /// Gap between columns in cells
    #[serde(default = "default_tile_gap")]
    pub tile_gap: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            cell_px: default_cell_px(),
            tile_width: default_tile_width(),
            tile_gap: default_tile_gap(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tabdeck")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_wheel_ease() -> f64 {
    0.26
}

fn default_page_ease() -> f64 {
    0.22
}

fn default_settle_epsilon() -> f64 {
    0.4
}

fn default_wheel_idle_ms() -> u64 {
    85
}

fn default_wheel_gain() -> f64 {
    0.16
}

fn default_magnet_min() -> f64 {
    28.0
}

fn default_magnet_column_ratio() -> f64 {
    0.22
}

fn default_directional_magnet_factor() -> f64 {
    1.5
}

fn default_line_delta() -> f64 {
    16.0
}

fn default_noise_threshold() -> f64 {
    0.5
}

fn default_animation_fps() -> u32 {
    60
}

fn default_probe_timeout() -> u64 {
    2400
}

fn default_max_icon_bytes() -> usize {
    1024 * 1024
}

fn default_render_quality_floor() -> u32 {
    20
}

fn default_tick_rate() -> u64 {
    100
}

fn default_cell_px() -> f64 {
    8.0
}

fn default_tile_width() -> u16 {
    18
}

fn default_tile_gap() -> u16 {
    2
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/tabdeck/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("tabdeck")
            .join("config.toml")
    }

    /// Get the database file path
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join("tabdeck.db")
    }

    /// Get the log file path used while the TUI owns the terminal
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("tabdeck.log")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.scroll, ScrollConfig::default());
        assert_eq!(config.scroll.wheel_idle_ms, 85);
        assert_eq!(config.favicon.probe_timeout_ms, 2400);
        assert!(config.favicon.enabled);
    }

    #[test]
    fn test_partial_section_override() {
        let config = AppConfig::from_toml(
            r#"
            [scroll]
            wheel_ease = 0.5

            [ui]
            tile_width = 24
            "#,
        )
        .unwrap();
        assert!((config.scroll.wheel_ease - 0.5).abs() < f64::EPSILON);
        assert!((config.scroll.page_ease - 0.22).abs() < f64::EPSILON);
        assert_eq!(config.ui.tile_width, 24);
        assert_eq!(config.ui.tile_gap, 2);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml("[scroll\nwheel_ease = ").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_tilde_expansion() {
        let path = PathBuf::from("/tmp/tabdeck");
        assert_eq!(expand_tilde(&path), path);
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde(std::path::Path::new("~/x")), home.join("x"));
        }
    }
}
