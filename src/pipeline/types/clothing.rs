use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClothingCategory {
    Tops,
    Bottoms,
    Dresses,
    Outerwear,
    Shoes,
    Accessories,
    Other,
}

impl ClothingCategory {
    /// The six wearable categories, in tie-break order.
    pub const WEARABLE: [ClothingCategory; 6] = [
        ClothingCategory::Tops,
        ClothingCategory::Bottoms,
        ClothingCategory::Dresses,
        ClothingCategory::Outerwear,
        ClothingCategory::Shoes,
        ClothingCategory::Accessories,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClothingCategory::Tops => "tops",
            ClothingCategory::Bottoms => "bottoms",
            ClothingCategory::Dresses => "dresses",
            ClothingCategory::Outerwear => "outerwear",
            ClothingCategory::Shoes => "shoes",
            ClothingCategory::Accessories => "accessories",
            ClothingCategory::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tops" | "top" => Some(ClothingCategory::Tops),
            "bottoms" | "bottom" => Some(ClothingCategory::Bottoms),
            "dresses" | "dress" => Some(ClothingCategory::Dresses),
            "outerwear" => Some(ClothingCategory::Outerwear),
            "shoes" | "shoe" | "footwear" => Some(ClothingCategory::Shoes),
            "accessories" | "accessory" => Some(ClothingCategory::Accessories),
            "other" => Some(ClothingCategory::Other),
            _ => None,
        }
    }
}

impl fmt::Display for ClothingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a category vote came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    Filename,
    ExternalVision,
    ImageProperties,
    ContextHint,
}

/// One signal's opinion about the category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryVote {
    pub source: SignalSource,
    pub category: ClothingCategory,
    pub confidence: f32,
    pub reasoning: String,
}

impl CategoryVote {
    pub fn new(
        source: SignalSource,
        category: ClothingCategory,
        confidence: f32,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            source,
            category,
            confidence,
            reasoning: reasoning.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClothingAnalysisResult {
    pub is_clothing: bool,
    pub category: ClothingCategory,
    pub style: String,
    pub colors: Vec<String>,
    pub occasions: Vec<String>,
    pub seasons: Vec<String>,
    pub tags: Vec<String>,
    pub confidence: f32,
    pub reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materials: Option<Vec<String>>,
}
