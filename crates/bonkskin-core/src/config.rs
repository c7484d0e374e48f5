//! Editor configuration.

use crate::history::DEFAULT_MAX_HISTORY;
use crate::shapes::SerializableColor;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Local storage key the autosave bridge writes to.
pub const DEFAULT_AUTOSAVE_KEY: &str = "bonkverseSkinEditor";

/// Tunables for an editor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Stage size in logical pixels.
    pub stage_size: Size,
    /// Maximum number of undo snapshots.
    pub history_limit: usize,
    /// Key used for the autosaved snapshot.
    pub autosave_key: String,
    /// Supersampling factor for PNG export.
    pub export_pixel_ratio: f64,
    /// Smallest width/height a shape may be resized to.
    pub min_transform_size: f64,
    /// Fill used for new shapes until the user picks a colour.
    pub default_fill: SerializableColor,
    /// Fill of the background disc.
    pub background_fill: SerializableColor,
    /// Gap between the background disc and the stage edge.
    pub background_inset: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            stage_size: Size::new(500.0, 500.0),
            history_limit: DEFAULT_MAX_HISTORY,
            autosave_key: DEFAULT_AUTOSAVE_KEY.to_string(),
            export_pixel_ratio: 3.0,
            min_transform_size: 10.0,
            default_fill: SerializableColor::rgb(0x00, 0xc3, 0xff),
            background_fill: SerializableColor::rgb(0x22, 0x22, 0x22),
            background_inset: 5.0,
        }
    }
}

impl EditorConfig {
    pub fn with_stage_size(mut self, width: f64, height: f64) -> Self {
        self.stage_size = Size::new(width, height);
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_autosave_key(mut self, key: impl Into<String>) -> Self {
        self.autosave_key = key.into();
        self
    }

    pub fn with_export_pixel_ratio(mut self, ratio: f64) -> Self {
        self.export_pixel_ratio = ratio;
        self
    }

    pub fn with_default_fill(mut self, color: SerializableColor) -> Self {
        self.default_fill = color;
        self
    }

    /// Parse a (possibly partial) config; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.stage_size, Size::new(500.0, 500.0));
        assert_eq!(config.history_limit, 30);
        assert_eq!(config.autosave_key, "bonkverseSkinEditor");
        assert_eq!(config.default_fill.to_hex(), "#00c3ff");
        assert_eq!(config.background_fill.to_hex(), "#222222");
    }

    #[test]
    fn test_partial_json() {
        let config = EditorConfig::from_json(r#"{"history_limit": 5}"#).unwrap();
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.export_pixel_ratio, 3.0);
    }

    #[test]
    fn test_builders_round_trip() {
        let config = EditorConfig::default()
            .with_stage_size(300.0, 200.0)
            .with_autosave_key("other")
            .with_export_pixel_ratio(2.0);
        let json = config.to_json().unwrap();
        assert_eq!(EditorConfig::from_json(&json).unwrap(), config);
    }
}
