//! User preferences persisted alongside events.

use crate::constants::{DARK_STYLES, DEFAULT_ACCENT_COLOR, DEFAULT_STYLE, KNOWN_STYLES};
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Light or dark palette, derived from the style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

/// Display preferences for the front end.
///
/// # Examples
///
/// ```
/// use btodo::store::{Settings, Theme};
///
/// let settings = Settings::new("Graphite Dark (QSS)", "#112233").unwrap();
/// assert_eq!(settings.theme(), Theme::Dark);
///
/// assert!(Settings::new("Neon", "#112233").is_err());
/// assert!(Settings::new("Default Light", "blue").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    style_name: String,
    accent_color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            style_name: DEFAULT_STYLE.to_string(),
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
        }
    }
}

impl Settings {
    /// Validates and builds a settings record.
    ///
    /// The accent color is normalized to upper case.
    pub fn new(style_name: &str, accent_color: &str) -> Result<Self, ValidationError> {
        if !is_known_style(style_name) {
            return Err(ValidationError::UnknownStyle(style_name.to_string()));
        }
        if !is_hex_color(accent_color) {
            return Err(ValidationError::InvalidAccentColor(accent_color.to_string()));
        }
        Ok(Settings {
            style_name: style_name.to_string(),
            accent_color: accent_color.to_ascii_uppercase(),
        })
    }

    pub fn style_name(&self) -> &str {
        &self.style_name
    }

    pub fn accent_color(&self) -> &str {
        &self.accent_color
    }

    pub fn theme(&self) -> Theme {
        if DARK_STYLES.contains(&self.style_name.as_str()) {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

pub(crate) fn is_known_style(style_name: &str) -> bool {
    KNOWN_STYLES.contains(&style_name)
}

pub(crate) fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}
