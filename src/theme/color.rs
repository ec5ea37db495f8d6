//! HSL color triples in the `"H S% L%"` notation used by theme records

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use std::sync::OnceLock;

/// A hue/saturation/lightness triple. Hue in degrees, the others in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HslColor {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl HslColor {
    pub const fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    /// CSS value for a style variable, e.g. `hsl(215 70% 40%)`
    pub fn css(&self) -> String {
        format!("hsl({})", self)
    }
}

impl std::fmt::Display for HslColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}% {}%", self.hue, self.saturation, self.lightness)
    }
}

/// Why a color string was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(pub String);

impl std::fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "not an HSL triple: {:?}", self.0)
    }
}

impl std::error::Error for ParseColorError {}

fn hsl_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^\s*(\d+(?:\.\d+)?)(?:deg)?[\s,]+(\d+(?:\.\d+)?)%[\s,]+(\d+(?:\.\d+)?)%\s*$",
        )
        .expect("HSL pattern is valid")
    })
}

impl FromStr for HslColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let caps = hsl_pattern().captures(s).ok_or_else(err)?;

        let component = |i: usize| -> Result<f32, ParseColorError> {
            caps.get(i)
                .and_then(|m| m.as_str().parse::<f32>().ok())
                .ok_or_else(err)
        };

        let color = HslColor::new(component(1)?, component(2)?, component(3)?);
        if color.hue > 360.0 || color.saturation > 100.0 || color.lightness > 100.0 {
            return Err(err());
        }
        Ok(color)
    }
}

impl Serialize for HslColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HslColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
