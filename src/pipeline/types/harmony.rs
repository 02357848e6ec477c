use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Fixed month mapping, `month` is 1-based.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }

    /// Curated wardrobe colors for the season.
    pub fn palette(&self) -> &'static [&'static str] {
        match self {
            Season::Spring => &[
                "coral", "peach", "mint", "yellow", "light blue", "lavender", "pink", "turquoise",
            ],
            Season::Summer => &[
                "sky blue", "blush", "lavender", "mint", "turquoise", "coral", "light blue",
                "yellow",
            ],
            Season::Autumn => &[
                "mustard", "olive", "burgundy", "rust", "brown", "forest green", "teal", "gold",
            ],
            Season::Winter => &[
                "navy", "burgundy", "emerald", "charcoal", "black", "white", "plum", "red",
                "magenta",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarmonyType {
    Neutral,
    Modern,
    Complementary,
    Analogous,
    Triadic,
    Seasonal,
    Monochromatic,
    None,
}

impl HarmonyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HarmonyType::Neutral => "neutral",
            HarmonyType::Modern => "modern",
            HarmonyType::Complementary => "complementary",
            HarmonyType::Analogous => "analogous",
            HarmonyType::Triadic => "triadic",
            HarmonyType::Seasonal => "seasonal",
            HarmonyType::Monochromatic => "monochromatic",
            HarmonyType::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorHarmonyResult {
    pub is_harmonious: bool,
    pub harmony_type: HarmonyType,
    pub confidence: f32,
    pub reasoning: String,
}
