//! User settings, persisted as one flat JSON record

use serde::{Deserialize, Serialize};

use super::error::Result;
use super::storage::{KeyValueStore, SETTINGS_KEY};

/// Smallest and largest editor font size in points
pub const FONT_SIZE_RANGE: (u32, u32) = (10, 32);
/// Smallest and largest line height multiplier
pub const LINE_HEIGHT_RANGE: (f32, f32) = (1.0, 2.5);

/// Colour theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Sepia,
}

impl Theme {
    /// The theme after this one in the light, dark, sepia cycle
    pub fn next(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Sepia,
            Theme::Sepia => Theme::Light,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Sepia => "sepia",
        }
    }
}

/// Application settings.
///
/// Keys missing from the persisted record keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    pub typewriter_sounds: bool,
    pub auto_save: bool,
    /// Hide everything but the editor
    pub focus_mode: bool,
    pub typewriter_mode: bool,
    pub font_size: u32,
    pub line_height: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            typewriter_sounds: false,
            auto_save: true,
            focus_mode: false,
            typewriter_mode: false,
            font_size: 16,
            line_height: 1.5,
        }
    }
}

impl Settings {
    /// Load settings, merging any persisted record over the defaults
    pub fn load(storage: &dyn KeyValueStore) -> Self {
        match storage.get(SETTINGS_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::error!("Error loading settings: {}", e);
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::error!("Error reading settings: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings to storage
    pub fn save(&self, storage: &mut dyn KeyValueStore) -> Result<()> {
        let json = serde_json::to_string(self)?;
        storage.set(SETTINGS_KEY, &json)
    }

    pub fn cycle_theme(&mut self) -> Theme {
        self.theme = self.theme.next();
        self.theme
    }

    pub fn toggle_typewriter_sounds(&mut self) -> bool {
        self.typewriter_sounds = !self.typewriter_sounds;
        self.typewriter_sounds
    }

    pub fn toggle_focus_mode(&mut self) -> bool {
        self.focus_mode = !self.focus_mode;
        self.focus_mode
    }

    pub fn toggle_typewriter_mode(&mut self) -> bool {
        self.typewriter_mode = !self.typewriter_mode;
        self.typewriter_mode
    }

    pub fn set_auto_save(&mut self, enabled: bool) {
        self.auto_save = enabled;
    }

    pub fn set_font_size(&mut self, size: u32) {
        self.font_size = size.clamp(FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1);
    }

    pub fn set_line_height(&mut self, height: f32) {
        self.line_height = height.clamp(LINE_HEIGHT_RANGE.0, LINE_HEIGHT_RANGE.1);
    }
}
