//! Theme support for map markers and the hover info box.
//!
//! This module provides color palettes for the marker layer (deal-status
//! colors, cluster and badge accents, selection/hover outlines) and a
//! centralized theme manager. Built-in themes: Light and Dark.
//!
//! # Examples
//!
//! ```
//! use pinmap::theme::ThemeManager;
//!
//! let manager = ThemeManager::new();
//! let dark = manager.get_theme("Dark").unwrap();
//! println!("in-deal marker color: {:?}", dark.palette.in_deal);
//! ```

use egui::Color32;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Complete marker-layer color palette for a theme
#[derive(Debug, Clone)]
pub struct MarkerPalette {
    // Deal-status marker fills
    pub pre_deal: Color32,
    pub in_deal: Color32,
    pub done: Color32,

    // Aggregate glyphs
    pub cluster: Color32,
    pub stack_badge: Color32,

    // Interaction outlines (selection is a fill treatment, hover an outline)
    pub selected_outline: Color32,
    pub hover_outline: Color32,

    // Hover info box
    pub info_background: Color32,
    pub info_text: Color32,

    // Marker label text
    pub label_text: Color32,
}

/// A complete theme definition with metadata and marker palette
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub description: String,
    pub palette: MarkerPalette,
}

/// Fallback theme used when a requested theme name is unknown.
static FALLBACK_THEME: Lazy<Theme> = Lazy::new(dark_theme);

/// Centralized theme manager providing access to all available themes
pub struct ThemeManager {
    themes: HashMap<String, Theme>,
    current_theme_name: String,
}

impl ThemeManager {
    /// Creates a new ThemeManager initialized with all built-in themes
    pub fn new() -> Self {
        let mut themes = HashMap::new();

        themes.insert("Light".to_string(), light_theme());
        themes.insert("Dark".to_string(), dark_theme());

        Self {
            themes,
            current_theme_name: "Dark".to_string(),
        }
    }

    /// Retrieves a theme by name
    pub fn get_theme(&self, name: &str) -> Option<&Theme> {
        self.themes.get(name)
    }

    /// Returns a sorted list of all available theme names
    pub fn list_themes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.themes.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Gets the currently selected theme
    pub fn current_theme(&self) -> &Theme {
        self.themes
            .get(&self.current_theme_name)
            .unwrap_or(&FALLBACK_THEME)
    }

    /// Returns the currently selected theme's marker palette
    pub fn current_palette(&self) -> &MarkerPalette {
        &self.current_theme().palette
    }

    /// Sets the current theme by name
    pub fn set_current_theme(&mut self, name: &str) -> Result<(), String> {
        if self.themes.contains_key(name) {
            self.current_theme_name = name.to_string();
            Ok(())
        } else {
            Err(format!("Theme '{}' not found", name))
        }
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}

fn light_theme() -> Theme {
    Theme {
        name: "Light".to_string(),
        description: "Bright markers for light basemaps".to_string(),
        palette: MarkerPalette {
            pre_deal: Color32::from_rgb(37, 99, 235),
            in_deal: Color32::from_rgb(217, 119, 6),
            done: Color32::from_rgb(107, 114, 128),
            cluster: Color32::from_rgb(79, 70, 229),
            stack_badge: Color32::from_rgb(220, 38, 38),
            selected_outline: Color32::from_rgb(17, 24, 39),
            hover_outline: Color32::from_rgb(59, 130, 246),
            info_background: Color32::from_rgb(255, 255, 255),
            info_text: Color32::from_rgb(17, 24, 39),
            label_text: Color32::from_rgb(255, 255, 255),
        },
    }
}

fn dark_theme() -> Theme {
    Theme {
        name: "Dark".to_string(),
        description: "Muted markers for dark basemaps".to_string(),
        palette: MarkerPalette {
            pre_deal: Color32::from_rgb(96, 165, 250),
            in_deal: Color32::from_rgb(251, 146, 60),
            done: Color32::from_rgb(156, 163, 175),
            cluster: Color32::from_rgb(129, 140, 248),
            stack_badge: Color32::from_rgb(248, 113, 113),
            selected_outline: Color32::from_rgb(250, 250, 250),
            hover_outline: Color32::from_rgb(147, 197, 253),
            info_background: Color32::from_rgb(31, 41, 55),
            info_text: Color32::from_rgb(243, 244, 246),
            label_text: Color32::from_rgb(17, 24, 39),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_themes_present() {
        let manager = ThemeManager::new();
        assert_eq!(manager.list_themes(), vec!["Dark", "Light"]);
        assert_eq!(manager.current_theme().name, "Dark");
    }

    #[test]
    fn test_set_current_theme() {
        let mut manager = ThemeManager::new();
        assert!(manager.set_current_theme("Light").is_ok());
        assert_eq!(manager.current_theme().name, "Light");
        assert!(manager.set_current_theme("Solarized").is_err());
        assert_eq!(manager.current_theme().name, "Light");
    }
}
