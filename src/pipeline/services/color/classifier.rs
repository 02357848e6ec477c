//! Rule-based color naming. The cascade is ordered: achromatic bands first,
//! then warm neutrals, then one band per hue sextant. First match wins.

use super::conversion::{parse_hex, rgb_to_hsl};
use crate::pipeline::types::{
    ClassifiedColor, ColorFamily, Intensity, RgbColor, SaturationLevel, Temperature,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedColor {
    pub name: &'static str,
    pub rgb: RgbColor,
    pub family: ColorFamily,
}

const fn named(name: &'static str, r: u8, g: u8, b: u8, family: ColorFamily) -> NamedColor {
    NamedColor {
        name,
        rgb: RgbColor::new(r, g, b),
        family,
    }
}

/// Every name the classifier can emit, with a representative swatch.
pub const NAMED_COLORS: &[NamedColor] = &[
    named("black", 0, 0, 0, ColorFamily::Neutral),
    named("white", 255, 255, 255, ColorFamily::Neutral),
    named("charcoal", 54, 54, 54, ColorFamily::Neutral),
    named("gray", 128, 128, 128, ColorFamily::Neutral),
    named("light gray", 200, 200, 200, ColorFamily::Neutral),
    named("cream", 250, 240, 215, ColorFamily::Neutral),
    named("beige", 225, 210, 185, ColorFamily::Neutral),
    named("taupe", 150, 130, 110, ColorFamily::Neutral),
    named("brown", 110, 70, 40, ColorFamily::Brown),
    named("burgundy", 128, 0, 30, ColorFamily::Red),
    named("red", 220, 20, 60, ColorFamily::Red),
    named("blush", 250, 200, 210, ColorFamily::Pink),
    named("pink", 240, 128, 160, ColorFamily::Pink),
    named("magenta", 220, 30, 180, ColorFamily::Pink),
    named("coral", 255, 127, 80, ColorFamily::Orange),
    named("rust", 183, 65, 14, ColorFamily::Orange),
    named("peach", 255, 218, 185, ColorFamily::Orange),
    named("orange", 255, 165, 0, ColorFamily::Orange),
    named("mustard", 200, 165, 40, ColorFamily::Yellow),
    named("gold", 255, 215, 0, ColorFamily::Yellow),
    named("yellow", 255, 235, 59, ColorFamily::Yellow),
    named("olive", 128, 128, 0, ColorFamily::Green),
    named("forest green", 34, 90, 34, ColorFamily::Green),
    named("green", 40, 160, 60, ColorFamily::Green),
    named("emerald", 20, 160, 100, ColorFamily::Green),
    named("mint", 170, 240, 200, ColorFamily::Green),
    named("teal", 0, 128, 128, ColorFamily::Blue),
    named("turquoise", 64, 224, 208, ColorFamily::Blue),
    named("light blue", 173, 216, 230, ColorFamily::Blue),
    named("sky blue", 135, 206, 235, ColorFamily::Blue),
    named("navy", 0, 0, 128, ColorFamily::Blue),
    named("denim", 80, 110, 150, ColorFamily::Blue),
    named("blue", 30, 80, 220, ColorFamily::Blue),
    named("lavender", 200, 180, 240, ColorFamily::Purple),
    named("purple", 120, 50, 180, ColorFamily::Purple),
    named("plum", 90, 30, 90, ColorFamily::Purple),
    named("mauve", 170, 100, 140, ColorFamily::Purple),
];

const ALIASES: &[(&str, &str)] = &[
    ("grey", "gray"),
    ("light grey", "light gray"),
    ("dark gray", "charcoal"),
    ("dark grey", "charcoal"),
    ("maroon", "burgundy"),
    ("wine", "burgundy"),
    ("ivory", "cream"),
    ("off-white", "cream"),
    ("khaki", "beige"),
    ("tan", "beige"),
    ("camel", "taupe"),
    ("chocolate", "brown"),
    ("violet", "purple"),
    ("lilac", "lavender"),
    ("fuchsia", "magenta"),
    ("salmon", "coral"),
    ("aqua", "turquoise"),
    ("cyan", "turquoise"),
    ("sage", "mint"),
    ("khaki green", "olive"),
    ("dark blue", "navy"),
    ("jean", "denim"),
];

/// Fashion neutrals: black, whites, grays, earth neutrals, plus navy and denim.
pub fn is_neutral_name(name: &str) -> bool {
    match named_color(name) {
        Some(c) => c.family == ColorFamily::Neutral || matches!(c.name, "navy" | "denim"),
        None => name.trim().eq_ignore_ascii_case("neutral"),
    }
}

/// Looks up a color by name or alias, case-insensitively.
pub fn named_color(name: &str) -> Option<&'static NamedColor> {
    let key = name.trim().to_ascii_lowercase().replace(['_', '-'], " ");
    let key = ALIASES
        .iter()
        .find(|(alias, _)| alias.replace('-', " ") == key)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(key);
    NAMED_COLORS.iter().find(|c| c.name == key)
}

/// Resolves a free-form color string: known name, `#RRGGBB`, or a compound
/// name whose last word is known ("dusty rose pink" -> pink).
pub fn resolve_color(value: &str) -> Option<NamedColor> {
    if let Some(c) = named_color(value) {
        return Some(*c);
    }
    if value.trim().starts_with('#') {
        let rgb = parse_hex(value)?;
        let classified = classify_color(rgb);
        return Some(NamedColor {
            name: classified.name,
            rgb,
            family: classified.family,
        });
    }
    value
        .split_whitespace()
        .rev()
        .find_map(named_color)
        .copied()
}

pub fn classify_color(color: RgbColor) -> ClassifiedColor {
    let hsl = rgb_to_hsl(color);
    let name = color_name(hsl.h, hsl.s, hsl.l);
    let family = named_color(name)
        .map(|c| c.family)
        .unwrap_or(ColorFamily::Neutral);

    let temperature = if family == ColorFamily::Neutral || hsl.s < 0.15 {
        Temperature::Neutral
    } else if hsl.h < 75.0 || hsl.h >= 330.0 {
        Temperature::Warm
    } else {
        Temperature::Cool
    };

    let intensity = if hsl.l < 0.35 {
        Intensity::Dark
    } else if hsl.l > 0.65 {
        Intensity::Light
    } else {
        Intensity::Medium
    };

    let saturation = if hsl.s < 0.3 {
        SaturationLevel::Low
    } else if hsl.s < 0.6 {
        SaturationLevel::Medium
    } else {
        SaturationLevel::High
    };

    ClassifiedColor {
        name,
        family,
        temperature,
        intensity,
        saturation,
    }
}

fn color_name(h: f32, s: f32, l: f32) -> &'static str {
    if l < 0.1 {
        return "black";
    }
    if l > 0.93 {
        return "white";
    }
    if s < 0.12 {
        return achromatic(l);
    }
    if (20.0..65.0).contains(&h)
        && ((l > 0.85 && s < 0.85) || (l > 0.7 && s < 0.5) || s < 0.3)
    {
        return if l > 0.85 {
            "cream"
        } else if l > 0.6 {
            "beige"
        } else if l > 0.3 {
            "taupe"
        } else {
            "brown"
        };
    }
    if s < 0.25 {
        return if (190.0..260.0).contains(&h) {
            if l < 0.3 {
                "navy"
            } else {
                "denim"
            }
        } else {
            achromatic(l)
        };
    }

    if !(15.0..345.0).contains(&h) {
        if l < 0.3 {
            "burgundy"
        } else if l > 0.8 {
            "blush"
        } else if l > 0.65 {
            "pink"
        } else {
            "red"
        }
    } else if h < 45.0 {
        if l < 0.3 {
            "brown"
        } else if l < 0.45 {
            if h < 25.0 {
                "rust"
            } else {
                "brown"
            }
        } else if l > 0.78 {
            "peach"
        } else if h < 25.0 && l > 0.55 {
            "coral"
        } else {
            "orange"
        }
    } else if h < 70.0 {
        if l < 0.3 {
            "olive"
        } else if l < 0.5 && s < 0.75 {
            "mustard"
        } else if h < 52.0 && l < 0.6 {
            "gold"
        } else if l > 0.8 {
            "cream"
        } else {
            "yellow"
        }
    } else if h < 165.0 {
        if h < 95.0 && s < 0.5 && l < 0.5 {
            "olive"
        } else if l < 0.25 {
            "forest green"
        } else if l > 0.75 {
            "mint"
        } else if h >= 140.0 && s > 0.5 {
            "emerald"
        } else {
            "green"
        }
    } else if h < 195.0 {
        if l < 0.35 {
            "teal"
        } else if l > 0.75 {
            "light blue"
        } else {
            "turquoise"
        }
    } else if h < 255.0 {
        if l < 0.3 {
            "navy"
        } else if l > 0.75 {
            "light blue"
        } else if h < 215.0 && l > 0.55 {
            "sky blue"
        } else if s < 0.45 {
            "denim"
        } else {
            "blue"
        }
    } else if h < 290.0 {
        if l < 0.3 {
            "plum"
        } else if l > 0.72 {
            "lavender"
        } else {
            "purple"
        }
    } else if l < 0.3 {
        "plum"
    } else if l > 0.75 {
        "blush"
    } else if l > 0.6 {
        "pink"
    } else if s > 0.6 {
        "magenta"
    } else {
        "mauve"
    }
}

fn achromatic(l: f32) -> &'static str {
    if l < 0.3 {
        "charcoal"
    } else if l < 0.65 {
        "gray"
    } else if l < 0.85 {
        "light gray"
    } else {
        "white"
    }
}

/// Permissive skin predicate: warm hue, R >= G >= B within a small slack,
/// moderate saturation and mid lightness.
pub fn is_skin_tone(color: RgbColor) -> bool {
    let hsl = rgb_to_hsl(color);
    let warm_hue = hsl.h <= 50.0 || hsl.h >= 340.0;
    let ordered = color.r as i16 + 10 >= color.g as i16 && color.g as i16 + 10 >= color.b as i16;
    warm_hue
        && ordered
        && color.r > 60
        && (0.1..=0.75).contains(&hsl.s)
        && (0.2..=0.88).contains(&hsl.l)
}
