//! Built-in themes shipped with the application

use super::{HslColor, Theme};

const fn hsl(hue: f32, saturation: f32, lightness: f32) -> HslColor {
    HslColor::new(hue, saturation, lightness)
}

/// Name and colors in field order: primary, secondary, background, text, accent
#[rustfmt::skip]
const BUILTIN: [(&str, [HslColor; 5]); 20] = [
    ("Modern Light", [hsl(215.0, 70.0, 40.0), hsl(220.0, 20.0, 85.0), hsl(0.0, 0.0, 100.0), hsl(215.0, 50.0, 23.0), hsl(215.0, 70.0, 40.0)]),
    ("Dark Mode", [hsl(230.0, 60.0, 60.0), hsl(230.0, 15.0, 25.0), hsl(230.0, 25.0, 10.0), hsl(230.0, 15.0, 95.0), hsl(230.0, 60.0, 60.0)]),
    ("Sepia", [hsl(35.0, 40.0, 40.0), hsl(35.0, 20.0, 80.0), hsl(35.0, 30.0, 95.0), hsl(35.0, 40.0, 20.0), hsl(35.0, 40.0, 40.0)]),
    ("Ocean Blue", [hsl(195.0, 60.0, 50.0), hsl(195.0, 30.0, 85.0), hsl(195.0, 30.0, 97.0), hsl(195.0, 60.0, 25.0), hsl(195.0, 60.0, 50.0)]),
    ("Forest Green", [hsl(150.0, 40.0, 40.0), hsl(150.0, 30.0, 85.0), hsl(150.0, 30.0, 97.0), hsl(150.0, 40.0, 20.0), hsl(150.0, 40.0, 40.0)]),
    ("Royal Purple", [hsl(270.0, 50.0, 60.0), hsl(270.0, 30.0, 85.0), hsl(270.0, 30.0, 97.0), hsl(270.0, 40.0, 25.0), hsl(270.0, 50.0, 60.0)]),
    ("Mint", [hsl(160.0, 50.0, 45.0), hsl(160.0, 30.0, 85.0), hsl(160.0, 30.0, 97.0), hsl(160.0, 50.0, 25.0), hsl(160.0, 50.0, 45.0)]),
    ("Cherry Blossom", [hsl(350.0, 60.0, 65.0), hsl(350.0, 30.0, 85.0), hsl(350.0, 30.0, 97.0), hsl(350.0, 50.0, 25.0), hsl(350.0, 60.0, 65.0)]),
    ("Mocha", [hsl(30.0, 40.0, 35.0), hsl(30.0, 30.0, 75.0), hsl(30.0, 20.0, 97.0), hsl(30.0, 40.0, 20.0), hsl(30.0, 40.0, 35.0)]),
    ("Arctic", [hsl(200.0, 50.0, 60.0), hsl(200.0, 30.0, 85.0), hsl(200.0, 30.0, 97.0), hsl(200.0, 50.0, 30.0), hsl(200.0, 50.0, 60.0)]),
    ("Sunset", [hsl(25.0, 80.0, 50.0), hsl(25.0, 30.0, 85.0), hsl(35.0, 100.0, 97.0), hsl(25.0, 80.0, 25.0), hsl(15.0, 80.0, 50.0)]),
    ("Cyber", [hsl(285.0, 80.0, 60.0), hsl(285.0, 30.0, 25.0), hsl(285.0, 20.0, 10.0), hsl(285.0, 15.0, 95.0), hsl(315.0, 80.0, 60.0)]),
    ("Desert", [hsl(35.0, 60.0, 45.0), hsl(35.0, 30.0, 75.0), hsl(35.0, 30.0, 95.0), hsl(35.0, 60.0, 25.0), hsl(15.0, 60.0, 45.0)]),
    ("Glacier", [hsl(180.0, 60.0, 50.0), hsl(180.0, 30.0, 85.0), hsl(180.0, 30.0, 97.0), hsl(180.0, 60.0, 25.0), hsl(200.0, 60.0, 50.0)]),
    ("Autumn", [hsl(25.0, 70.0, 45.0), hsl(25.0, 30.0, 75.0), hsl(25.0, 30.0, 95.0), hsl(25.0, 70.0, 25.0), hsl(15.0, 70.0, 45.0)]),
    ("Neon Night", [hsl(320.0, 80.0, 60.0), hsl(320.0, 30.0, 25.0), hsl(320.0, 20.0, 10.0), hsl(320.0, 15.0, 95.0), hsl(280.0, 80.0, 60.0)]),
    ("Olive Garden", [hsl(110.0, 40.0, 45.0), hsl(110.0, 30.0, 75.0), hsl(110.0, 30.0, 95.0), hsl(110.0, 40.0, 25.0), hsl(90.0, 40.0, 45.0)]),
    ("Berry", [hsl(330.0, 70.0, 50.0), hsl(330.0, 30.0, 85.0), hsl(330.0, 30.0, 97.0), hsl(330.0, 70.0, 25.0), hsl(350.0, 70.0, 50.0)]),
    ("Deep Ocean", [hsl(210.0, 70.0, 50.0), hsl(210.0, 30.0, 25.0), hsl(210.0, 20.0, 10.0), hsl(210.0, 15.0, 95.0), hsl(190.0, 70.0, 50.0)]),
    ("Spring", [hsl(140.0, 60.0, 45.0), hsl(140.0, 30.0, 85.0), hsl(140.0, 30.0, 97.0), hsl(140.0, 60.0, 25.0), hsl(120.0, 60.0, 45.0)]),
];

/// All built-in themes; the first one is the default
pub fn builtin_themes() -> Vec<Theme> {
    BUILTIN
        .iter()
        .map(|(name, [primary, secondary, background, text, accent])| Theme {
            id: None,
            name: (*name).to_string(),
            primary: *primary,
            secondary: *secondary,
            background: *background,
            text: *text,
            accent: *accent,
        })
        .collect()
}

/// The theme used when nothing usable is stored
pub fn default_theme() -> Theme {
    let (name, [primary, secondary, background, text, accent]) = BUILTIN[0];
    Theme {
        id: None,
        name: name.to_string(),
        primary,
        secondary,
        background,
        text,
        accent,
    }
}
