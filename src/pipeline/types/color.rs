use serde::{Deserialize, Serialize};

/// 8-bit sRGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn channels(&self) -> [f32; 3] {
        [self.r as f32, self.g as f32, self.b as f32]
    }

    /// Mean of the three channels, 0..=255.
    pub fn brightness(&self) -> f32 {
        (self.r as f32 + self.g as f32 + self.b as f32) / 3.0
    }

    pub fn distance(&self, other: &RgbColor) -> f32 {
        let dr = self.r as f32 - other.r as f32;
        let dg = self.g as f32 - other.g as f32;
        let db = self.b as f32 - other.b as f32;
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

impl From<[u8; 3]> for RgbColor {
    fn from(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

impl From<image::Rgb<u8>> for RgbColor {
    fn from(p: image::Rgb<u8>) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

/// A single sampled pixel, optionally weighted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSample {
    pub color: RgbColor,
    pub weight: f32,
}

impl ColorSample {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self {
            color: RgbColor::new(r, g, b),
            weight: 1.0,
        }
    }

    pub fn weighted(color: RgbColor, weight: f32) -> Self {
        Self { color, weight }
    }
}

impl From<RgbColor> for ColorSample {
    fn from(color: RgbColor) -> Self {
        Self { color, weight: 1.0 }
    }
}

/// Centroid and mass of one k-means cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorCluster {
    pub color: RgbColor,
    pub count: usize,
    pub weighted_count: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    /// Degrees in [0, 360).
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Lab {
    pub fn distance(&self, other: &Lab) -> f32 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        (dl * dl + da * da + db * db).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFamily {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Brown,
    Neutral,
}

impl ColorFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorFamily::Red => "red",
            ColorFamily::Orange => "orange",
            ColorFamily::Yellow => "yellow",
            ColorFamily::Green => "green",
            ColorFamily::Blue => "blue",
            ColorFamily::Purple => "purple",
            ColorFamily::Pink => "pink",
            ColorFamily::Brown => "brown",
            ColorFamily::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Temperature {
    Warm,
    Cool,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Light,
    Medium,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaturationLevel {
    Low,
    Medium,
    High,
}

/// Semantic label for a color plus its coarse attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedColor {
    pub name: &'static str,
    pub family: ColorFamily,
    pub temperature: Temperature,
    pub intensity: Intensity,
    pub saturation: SaturationLevel,
}
