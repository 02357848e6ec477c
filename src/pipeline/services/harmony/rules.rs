//! Harmony rule tables. Confidences are fixed per rule family; the neutral
//! rule is the strongest so it always wins when it applies.

use crate::pipeline::types::{ColorFamily, Season};

pub const NEUTRAL_CONFIDENCE: f32 = 0.9;
pub const COMPLEMENTARY_CONFIDENCE: f32 = 0.85;
pub const ANALOGOUS_CONFIDENCE: f32 = 0.8;
pub const TRIADIC_CONFIDENCE: f32 = 0.75;
pub const SEASONAL_CONFIDENCE: f32 = 0.7;
pub const MONOCHROMATIC_CONFIDENCE: f32 = 0.65;
pub const NO_HARMONY_CONFIDENCE: f32 = 0.1;

/// Hue-angle fallbacks score a little below their table counterparts.
pub const HUE_COMPLEMENTARY_CONFIDENCE: f32 = 0.78;
pub const HUE_ANALOGOUS_CONFIDENCE: f32 = 0.72;
pub const HUE_TRIADIC_CONFIDENCE: f32 = 0.7;

/// Curated contemporary pairings, order-insensitive.
pub const MODERN_COMBINATIONS: &[(&str, &str, f32)] = &[
    ("rust", "teal", 0.87),
    ("coral", "teal", 0.87),
    ("blush", "burgundy", 0.86),
    ("lavender", "mint", 0.86),
    ("coral", "turquoise", 0.86),
    ("emerald", "pink", 0.85),
    ("mustard", "plum", 0.85),
    ("olive", "blush", 0.85),
    ("forest green", "gold", 0.85),
    ("sky blue", "peach", 0.84),
    ("magenta", "orange", 0.84),
    ("mauve", "olive", 0.83),
];

pub const COMPLEMENTARY_FAMILIES: &[(ColorFamily, ColorFamily)] = &[
    (ColorFamily::Red, ColorFamily::Green),
    (ColorFamily::Orange, ColorFamily::Blue),
    (ColorFamily::Yellow, ColorFamily::Purple),
];

/// Families in color-wheel order; neighbours are analogous.
pub const COLOR_WHEEL: &[ColorFamily] = &[
    ColorFamily::Red,
    ColorFamily::Orange,
    ColorFamily::Yellow,
    ColorFamily::Green,
    ColorFamily::Blue,
    ColorFamily::Purple,
    ColorFamily::Pink,
];

pub const TRIADS: &[[ColorFamily; 3]] = &[
    [ColorFamily::Red, ColorFamily::Yellow, ColorFamily::Blue],
    [ColorFamily::Orange, ColorFamily::Green, ColorFamily::Purple],
];

pub fn season_palette(season: Season) -> &'static [&'static str] {
    season.palette()
}

pub fn modern_combination(a: &str, b: &str) -> Option<f32> {
    MODERN_COMBINATIONS
        .iter()
        .find(|(x, y, _)| (*x == a && *y == b) || (*x == b && *y == a))
        .map(|(_, _, confidence)| *confidence)
}

pub fn are_complementary(a: ColorFamily, b: ColorFamily) -> bool {
    COMPLEMENTARY_FAMILIES
        .iter()
        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

pub fn are_analogous(a: ColorFamily, b: ColorFamily) -> bool {
    let position = |f| COLOR_WHEEL.iter().position(|&w| w == f);
    match (position(a), position(b)) {
        (Some(i), Some(j)) if i != j => {
            let n = COLOR_WHEEL.len();
            (i + 1) % n == j || (j + 1) % n == i
        }
        _ => false,
    }
}

pub fn in_same_triad(a: ColorFamily, b: ColorFamily) -> bool {
    a != b && TRIADS.iter().any(|t| t.contains(&a) && t.contains(&b))
}

/// Angular distance between two hues, 0..=180.
pub fn hue_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}
