//! Theme colors loaded from `~/.config/aether-launcher/colors.json`.
//!
//! Colors are written as `#rrggbb` strings (ratatui color names work too).
//! Missing keys fall back to the Material Design 3 dark palette, and a
//! missing file is seeded with it so the user has something to edit.

use std::path::Path;
use std::str::FromStr;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::load_or_seed;

/// Color names as they appear in colors.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Colors {
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_surface")]
    pub surface: String,
    #[serde(default = "default_on_surface")]
    pub on_surface: String,
    /// Inactive rows and help text
    #[serde(default = "default_subtext")]
    pub subtext: String,
    #[serde(default = "default_outline")]
    pub outline: String,
    #[serde(default = "default_primary")]
    pub primary: String,
    /// Fill of the moving highlight bar
    #[serde(default = "default_highlight")]
    pub highlight: String,
    #[serde(default = "default_success")]
    pub success: String,
}

fn default_background() -> String {
    "#141313".to_string()
}

fn default_surface() -> String {
    "#201f20".to_string()
}

fn default_on_surface() -> String {
    "#e6e1e1".to_string()
}

fn default_subtext() -> String {
    "#cbc5ca".to_string()
}

fn default_outline() -> String {
    "#948f94".to_string()
}

fn default_primary() -> String {
    "#cbc4cb".to_string()
}

fn default_highlight() -> String {
    "#3a363d".to_string()
}

fn default_success() -> String {
    "#b5ccba".to_string()
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            background: default_background(),
            surface: default_surface(),
            on_surface: default_on_surface(),
            subtext: default_subtext(),
            outline: default_outline(),
            primary: default_primary(),
            highlight: default_highlight(),
            success: default_success(),
        }
    }
}

impl Colors {
    /// Load from `path`, seeding it with the defaults if it does not exist.
    pub fn load_from(path: &Path) -> Self {
        load_or_seed(path)
    }

    /// Resolve every entry to a terminal color. Unparseable entries keep the
    /// default for that slot.
    pub fn palette(&self) -> Palette {
        let fallback = Self::default();
        let pick = |name: &str, value: &str, default: &str| {
            Color::from_str(value).unwrap_or_else(|_| {
                warn!("Invalid color {value:?} for {name}, using {default}");
                Color::from_str(default).unwrap_or(Color::Reset)
            })
        };
        Palette {
            bg: pick("background", &self.background, &fallback.background),
            surface: pick("surface", &self.surface, &fallback.surface),
            on_surface: pick("onSurface", &self.on_surface, &fallback.on_surface),
            subtext: pick("subtext", &self.subtext, &fallback.subtext),
            outline: pick("outline", &self.outline, &fallback.outline),
            primary: pick("primary", &self.primary, &fallback.primary),
            highlight: pick("highlight", &self.highlight, &fallback.highlight),
            success: pick("success", &self.success, &fallback.success),
        }
    }
}

/// Resolved colors used by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub surface: Color,
    pub on_surface: Color,
    pub subtext: Color,
    pub outline: Color,
    pub primary: Color,
    pub highlight: Color,
    pub success: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Colors::default().palette()
    }
}
