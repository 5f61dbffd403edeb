//! Display settings.

use crate::errors::AppResult;
use crate::store::{EventStore, Settings};
use std::io::Write;

pub fn show_settings(store: &EventStore, out: &mut dyn Write) -> AppResult<()> {
    let settings = store.settings();
    writeln!(out, "style:  {}", settings.style_name())?;
    writeln!(out, "accent: {}", settings.accent_color())?;
    writeln!(out, "theme:  {}", settings.theme())?;
    Ok(())
}

/// Changes style and/or accent color; an omitted value keeps the current one.
pub fn update_settings(
    store: &mut EventStore,
    style: Option<&str>,
    accent: Option<&str>,
) -> AppResult<Settings> {
    let current = store.settings().clone();
    let style = style.unwrap_or(current.style_name());
    let accent = accent.unwrap_or(current.accent_color());
    store.update_settings(style, accent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Secret;
    use tempfile::tempdir;

    #[test]
    fn test_partial_update_keeps_other_value() {
        let dir = tempdir().unwrap();
        let mut store =
            EventStore::open(dir.path().join("store.enc"), &Secret::new("abc").unwrap()).unwrap();

        let updated = update_settings(&mut store, Some("Default Dark"), None).unwrap();
        assert_eq!(updated.style_name(), "Default Dark");
        assert_eq!(updated.accent_color(), "#2A82DA");

        let updated = update_settings(&mut store, None, Some("#112233")).unwrap();
        assert_eq!(updated.style_name(), "Default Dark");
        assert_eq!(updated.accent_color(), "#112233");

        let mut out = Vec::new();
        show_settings(&store, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("style:  Default Dark"));
        assert!(text.contains("theme:  dark"));
    }

    #[test]
    fn test_invalid_accent_leaves_settings() {
        let dir = tempdir().unwrap();
        let mut store =
            EventStore::open(dir.path().join("store.enc"), &Secret::new("abc").unwrap()).unwrap();
        assert!(update_settings(&mut store, None, Some("blue")).is_err());
        assert_eq!(store.settings(), &Settings::default());
    }
}
