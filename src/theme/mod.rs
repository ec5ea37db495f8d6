//! Theme records, the theme catalog and propagation of the active theme
//!
//! - `color`: HSL triples in `"H S% L%"` notation
//! - `builtin`: the fixed set of themes available at startup
//! - `catalog`: built-in plus custom themes, and the active-theme manager

mod builtin;
mod catalog;
mod color;

pub use builtin::*;
pub use catalog::*;
pub use color::*;

use crate::error::{ThemeError, ThemeResult};
use serde::{Deserialize, Serialize};

/// A named set of colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Remote-assigned identifier (custom themes only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Unique display label
    pub name: String,

    pub primary: HslColor,
    pub secondary: HslColor,
    pub background: HslColor,
    pub text: HslColor,
    pub accent: HslColor,
}

impl Theme {
    /// Color for a field
    pub fn color(&self, field: ThemeField) -> HslColor {
        match field {
            ThemeField::Primary => self.primary,
            ThemeField::Secondary => self.secondary,
            ThemeField::Background => self.background,
            ThemeField::Text => self.text,
            ThemeField::Accent => self.accent,
        }
    }
}

/// The color fields of a theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeField {
    Primary,
    Secondary,
    Background,
    Text,
    Accent,
}

impl ThemeField {
    pub const ALL: [ThemeField; 5] = [
        ThemeField::Primary,
        ThemeField::Secondary,
        ThemeField::Background,
        ThemeField::Text,
        ThemeField::Accent,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ThemeField::Primary => "primary",
            ThemeField::Secondary => "secondary",
            ThemeField::Background => "background",
            ThemeField::Text => "text",
            ThemeField::Accent => "accent",
        }
    }

    /// Style variable the field is published under
    pub fn css_variable(&self) -> String {
        format!("--theme-{}", self.name())
    }
}

/// Custom theme form input, validated before any remote call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeDraft {
    pub name: String,
    pub primary: String,
    pub secondary: String,
    pub background: String,
    pub text: String,
    pub accent: String,
}

impl ThemeDraft {
    fn field(&self, field: ThemeField) -> &str {
        match field {
            ThemeField::Primary => &self.primary,
            ThemeField::Secondary => &self.secondary,
            ThemeField::Background => &self.background,
            ThemeField::Text => &self.text,
            ThemeField::Accent => &self.accent,
        }
    }

    /// Check every field is filled in and parses, producing a theme
    pub fn validate(&self) -> ThemeResult<Theme> {
        if self.name.trim().is_empty() {
            return Err(ThemeError::EmptyField { field: "name" });
        }
        for field in ThemeField::ALL {
            if self.field(field).trim().is_empty() {
                return Err(ThemeError::EmptyField {
                    field: field.name(),
                });
            }
        }

        let parse = |field: ThemeField| -> ThemeResult<HslColor> {
            let value = self.field(field);
            value.parse().map_err(|_| ThemeError::InvalidColor {
                field: field.name(),
                value: value.to_string(),
            })
        };

        Ok(Theme {
            id: None,
            name: self.name.trim().to_string(),
            primary: parse(ThemeField::Primary)?,
            secondary: parse(ThemeField::Secondary)?,
            background: parse(ThemeField::Background)?,
            text: parse(ThemeField::Text)?,
            accent: parse(ThemeField::Accent)?,
        })
    }
}
