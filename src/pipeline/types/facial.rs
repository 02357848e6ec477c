use serde::{Deserialize, Serialize};

use super::harmony::Season;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinTone {
    Fair,
    Light,
    Medium,
    Olive,
    Tan,
    Deep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Undertone {
    Warm,
    Cool,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HairColor {
    Black,
    DarkBrown,
    Brown,
    LightBrown,
    Blonde,
    Red,
    Auburn,
    Gray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeColor {
    Brown,
    Hazel,
    Green,
    Blue,
    Gray,
    Amber,
}

/// Which sampling strategy produced a facial analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Landmarks,
    Heuristic,
    Fallback,
}

/// Per-feature result. `confidence` always lies in `[0.1, 0.95]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureColorResult<C> {
    /// `#RRGGBB`
    pub color: String,
    pub category: C,
    pub confidence: f32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinToneResult {
    #[serde(flatten)]
    pub feature: FeatureColorResult<SkinTone>,
    pub undertone: Undertone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacialAnalysis {
    pub skin_tone: SkinToneResult,
    pub hair_color: FeatureColorResult<HairColor>,
    pub eye_color: FeatureColorResult<EyeColor>,
    pub overall_confidence: f32,
    pub detected_features: bool,
    pub method: DetectionMethod,
    pub color_season: Season,
    /// Recommended wardrobe colors for `color_season`.
    pub recommended_colors: Vec<&'static str>,
}
