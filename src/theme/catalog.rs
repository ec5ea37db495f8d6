//! Theme catalog and the active theme
//!
//! The catalog is a plain value owned by the application state; nothing here
//! is global. Activating a theme publishes its colors as style variables and
//! writes it to durable local storage.

use super::{builtin_themes, default_theme, Theme, ThemeField};
use crate::backend::LocalStorage;
use crate::error::{AppResult, StorageError, StorageResult, ThemeError, ThemeResult};
use std::collections::BTreeMap;

/// Built-in themes followed by custom ones, names unique
#[derive(Debug, Clone)]
pub struct ThemeCatalog {
    themes: Vec<Theme>,
    builtin_count: usize,
}

impl Default for ThemeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeCatalog {
    pub fn new() -> Self {
        let themes = builtin_themes();
        let builtin_count = themes.len();
        Self {
            themes,
            builtin_count,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.themes[..self.builtin_count]
            .iter()
            .any(|t| t.name == name)
    }

    /// Append a custom theme; names must be unique
    pub fn add_custom(&mut self, theme: Theme) -> ThemeResult<()> {
        if self.contains(&theme.name) {
            return Err(ThemeError::DuplicateName { name: theme.name });
        }
        self.themes.push(theme);
        Ok(())
    }

    /// Merge custom themes fetched from the remote store. Built-ins are never
    /// replaced; a custom theme with a known name is replaced by the remote one.
    pub fn merge_remote(&mut self, remote: Vec<Theme>) -> usize {
        let mut merged = 0;
        for theme in remote {
            if self.is_builtin(&theme.name) {
                log::warn!("Ignoring remote theme shadowing built-in {:?}", theme.name);
                continue;
            }
            match self.themes.iter_mut().find(|t| t.name == theme.name) {
                Some(existing) => *existing = theme,
                None => self.themes.push(theme),
            }
            merged += 1;
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = &Theme> {
        self.themes.iter()
    }

    pub fn custom(&self) -> &[Theme] {
        &self.themes[self.builtin_count..]
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

/// Global style-variable namespace (`--theme-primary: hsl(...)`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleVariables {
    values: BTreeMap<String, String>,
}

impl StyleVariables {
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as a `:root { ... }` block
    pub fn to_css(&self) -> String {
        let mut css = String::from(":root {\n");
        for (name, value) in &self.values {
            css.push_str(&format!("  {}: {};\n", name, value));
        }
        css.push('}');
        css
    }
}

/// Owns the catalog, the active theme and its published variables
#[derive(Debug, Clone)]
pub struct ThemeManager {
    catalog: ThemeCatalog,
    active: Theme,
    variables: StyleVariables,
    storage_key: String,
}

impl ThemeManager {
    /// Start from durable storage: a stored theme is applied immediately
    /// (and admitted to the catalog if unknown); anything unreadable falls
    /// back to the default theme.
    pub fn load(storage: &dyn LocalStorage, storage_key: &str) -> Self {
        let mut catalog = ThemeCatalog::new();

        let stored = match storage.get(storage_key) {
            Ok(Some(json)) => match serde_json::from_str::<Theme>(&json) {
                Ok(theme) => Some(theme),
                Err(e) => {
                    log::warn!("Ignoring unreadable stored theme: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::warn!("Could not read stored theme: {}", e);
                None
            }
        };

        let active = match stored {
            Some(theme) if catalog.is_builtin(&theme.name) => {
                catalog.get(&theme.name).cloned().unwrap_or(theme)
            }
            Some(theme) => {
                log::debug!("Admitting stored theme {:?} to catalog", theme.name);
                if let Err(e) = catalog.add_custom(theme.clone()) {
                    log::warn!("Could not admit stored theme: {}", e);
                }
                theme
            }
            None => default_theme(),
        };

        let mut manager = Self {
            catalog,
            active,
            variables: StyleVariables::default(),
            storage_key: storage_key.to_string(),
        };
        manager.publish();
        manager
    }

    /// Activate a catalog theme by name. A storage failure is reported after
    /// the theme has been applied.
    pub fn select(&mut self, name: &str, storage: &dyn LocalStorage) -> AppResult<()> {
        let theme = self
            .catalog
            .get(name)
            .cloned()
            .ok_or_else(|| ThemeError::UnknownTheme {
                name: name.to_string(),
            })?;
        self.activate(theme, storage)?;
        Ok(())
    }

    /// Publish the theme's colors and persist it. Variables are updated even
    /// when the storage write fails.
    fn activate(&mut self, theme: Theme, storage: &dyn LocalStorage) -> StorageResult<()> {
        log::info!("Activating theme {:?}", theme.name);
        self.active = theme;
        self.publish();
        self.persist(storage)
    }

    fn publish(&mut self) {
        for field in ThemeField::ALL {
            self.variables
                .set(field.css_variable(), self.active.color(field).css());
        }
    }

    /// Write the active theme to durable storage
    pub fn persist(&self, storage: &dyn LocalStorage) -> StorageResult<()> {
        let json = serde_json::to_string(&self.active)
            .map_err(|e| StorageError::ParseError(e.to_string()))?;
        storage.set(&self.storage_key, &json)
    }

    /// Merge remote custom themes without touching the active theme
    pub fn merge_custom(&mut self, themes: Vec<Theme>) -> usize {
        let merged = self.catalog.merge_remote(themes);
        log::debug!("Merged {} custom theme(s)", merged);
        merged
    }

    /// Record a custom theme the remote store accepted
    pub fn add_custom(&mut self, theme: Theme) -> ThemeResult<()> {
        self.catalog.add_custom(theme)
    }

    pub fn active(&self) -> &Theme {
        &self.active
    }

    pub fn catalog(&self) -> &ThemeCatalog {
        &self.catalog
    }

    pub fn variables(&self) -> &StyleVariables {
        &self.variables
    }
}
