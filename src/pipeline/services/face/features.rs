//! Per-feature pixel filters, categorisation and confidence.
//!
//! The hair and eye rules deliberately over-detect blonde hair and blue eyes
//! through wide, overlapping bands. Product has not confirmed whether that
//! bias is wanted; keep it until they do.

use crate::pipeline::services::color::{
    dominant_color, is_skin_tone, rgb_to_hex, rgb_to_hsl, rgb_to_lab, KMeansConfig,
};
use crate::pipeline::types::{
    ColorSample, EyeColor, FeatureColorResult, HairColor, Hsl, RgbColor, SkinTone,
    SkinToneResult, Undertone,
};
use rand::Rng;
use serde::Deserialize;

pub const MIN_CONFIDENCE: f32 = 0.1;
pub const MAX_CONFIDENCE: f32 = 0.95;

/// Confidence curve for one feature: `min(cap, base + valid / divisor)`,
/// or `floor` when fewer than `min_pixels` survive the filter.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FeatureThresholds {
    pub min_pixels: usize,
    pub base: f32,
    pub divisor: f32,
    pub cap: f32,
    pub floor: f32,
}

impl FeatureThresholds {
    pub const SKIN: FeatureThresholds = FeatureThresholds {
        min_pixels: 50,
        base: 0.3,
        divisor: 500.0,
        cap: 0.95,
        floor: 0.2,
    };

    pub const HAIR: FeatureThresholds = FeatureThresholds {
        min_pixels: 30,
        base: 0.25,
        divisor: 400.0,
        cap: 0.9,
        floor: 0.15,
    };

    pub const EYE: FeatureThresholds = FeatureThresholds {
        min_pixels: 8,
        base: 0.2,
        divisor: 100.0,
        cap: 0.85,
        floor: 0.1,
    };

    pub fn confidence(&self, valid_pixels: usize) -> f32 {
        let raw = if valid_pixels < self.min_pixels {
            self.floor
        } else {
            (self.base + valid_pixels as f32 / self.divisor).min(self.cap)
        };
        raw.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.divisor <= 0.0 {
            return Err("Feature confidence divisor must be positive".to_string());
        }
        if self.floor > self.cap {
            return Err("Feature confidence floor must not exceed its cap".to_string());
        }
        Ok(())
    }
}

/// Which pixels count toward a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Skin,
    Hair,
    Eye,
}

impl Feature {
    pub fn accepts(&self, color: RgbColor) -> bool {
        match self {
            Feature::Skin => is_skin_tone(color),
            Feature::Hair => is_hair_candidate(color),
            Feature::Eye => is_eye_candidate(color),
        }
    }
}

fn looks_blonde(hsl: &Hsl) -> bool {
    (25.0..=65.0).contains(&hsl.h) && hsl.l > 0.4 && hsl.s > 0.1
}

fn looks_blue(color: RgbColor, hsl: &Hsl) -> bool {
    ((180.0..=270.0).contains(&hsl.h) && hsl.s > 0.05) || color.b as i16 - color.r as i16 > 5
}

/// Non-skin pixels, except anything in the blonde band which is kept even
/// when it also passes the skin test. Near-white background is dropped.
pub fn is_hair_candidate(color: RgbColor) -> bool {
    let hsl = rgb_to_hsl(color);
    if hsl.l > 0.92 {
        return false;
    }
    looks_blonde(&hsl) || !is_skin_tone(color)
}

/// Non-skin pixels between pupil black and sclera white; anything blue-ish
/// is always kept.
pub fn is_eye_candidate(color: RgbColor) -> bool {
    let hsl = rgb_to_hsl(color);
    if looks_blue(color, &hsl) && hsl.l < 0.9 {
        return true;
    }
    (0.08..=0.85).contains(&hsl.l) && !is_skin_tone(color)
}

/// Filtered pixel count and dominant color of one feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureMeasurement {
    /// `None` when fewer than `min_pixels` passed the filter.
    pub color: Option<RgbColor>,
    pub valid_pixels: usize,
    pub confidence: f32,
}

pub fn measure<R: Rng + ?Sized>(
    feature: Feature,
    samples: &[ColorSample],
    thresholds: &FeatureThresholds,
    clustering: &KMeansConfig,
    rng: &mut R,
) -> FeatureMeasurement {
    let valid: Vec<ColorSample> = samples
        .iter()
        .filter(|s| feature.accepts(s.color))
        .copied()
        .collect();

    let color = if valid.len() < thresholds.min_pixels {
        None
    } else {
        dominant_color(&valid, clustering, rng).map(|c| c.color)
    };

    FeatureMeasurement {
        color,
        valid_pixels: valid.len(),
        confidence: thresholds.confidence(valid.len()),
    }
}

pub fn classify_skin(color: RgbColor) -> (SkinTone, Undertone) {
    let lab = rgb_to_lab(color);

    let tone = if lab.l > 80.0 {
        SkinTone::Fair
    } else if lab.l > 70.0 {
        SkinTone::Light
    } else if lab.l > 60.0 {
        if lab.b > 18.0 && lab.a < 8.0 {
            SkinTone::Olive
        } else {
            SkinTone::Medium
        }
    } else if lab.l > 48.0 {
        SkinTone::Tan
    } else {
        SkinTone::Deep
    };

    // Yellow (b*) pulls warm, pink (a*) with low b* pulls cool.
    let warm = lab.b / 30.0;
    let cool = -lab.b / 30.0 + lab.a / 20.0;
    let undertone = if warm > 0.3 && warm > cool {
        Undertone::Warm
    } else if cool > 0.3 && cool > warm {
        Undertone::Cool
    } else {
        Undertone::Neutral
    };

    (tone, undertone)
}

pub fn classify_hair(color: RgbColor) -> HairColor {
    let hsl = rgb_to_hsl(color);
    if hsl.s < 0.12 && hsl.l > 0.55 {
        HairColor::Gray
    } else if hsl.l < 0.15 {
        HairColor::Black
    } else if looks_blonde(&hsl) || ((20.0..70.0).contains(&hsl.h) && hsl.l > 0.55) {
        HairColor::Blonde
    } else if (hsl.h < 20.0 || hsl.h >= 340.0) && hsl.s > 0.35 {
        if hsl.l > 0.35 {
            HairColor::Red
        } else {
            HairColor::Auburn
        }
    } else if hsl.l < 0.25 {
        HairColor::DarkBrown
    } else if hsl.l < 0.38 {
        HairColor::Brown
    } else {
        HairColor::LightBrown
    }
}

pub fn classify_eye(color: RgbColor) -> EyeColor {
    let hsl = rgb_to_hsl(color);
    if looks_blue(color, &hsl) {
        EyeColor::Blue
    } else if hsl.s < 0.12 {
        EyeColor::Gray
    } else if (80.0..170.0).contains(&hsl.h) {
        EyeColor::Green
    } else if (50.0..80.0).contains(&hsl.h) {
        EyeColor::Hazel
    } else if (30.0..50.0).contains(&hsl.h) && hsl.s > 0.5 && hsl.l > 0.35 {
        EyeColor::Amber
    } else {
        EyeColor::Brown
    }
}

fn label(value: &impl serde::Serialize) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(|s| s.replace('_', " ")))
        .unwrap_or_default()
}

pub const DEFAULT_SKIN: RgbColor = RgbColor::new(198, 150, 120);
pub const DEFAULT_HAIR: RgbColor = RgbColor::new(101, 67, 33);
pub const DEFAULT_EYE: RgbColor = RgbColor::new(99, 78, 54);

pub fn skin_result(measurement: &FeatureMeasurement, scale: f32) -> SkinToneResult {
    let (color, (category, undertone)) = match measurement.color {
        Some(c) => (c, classify_skin(c)),
        None => (DEFAULT_SKIN, (SkinTone::Medium, Undertone::Neutral)),
    };
    SkinToneResult {
        feature: FeatureColorResult {
            color: rgb_to_hex(color),
            category,
            confidence: scaled(measurement.confidence, scale),
            description: format!("{} skin with {} undertones", label(&category), label(&undertone)),
        },
        undertone,
    }
}

pub fn hair_result(measurement: &FeatureMeasurement, scale: f32) -> FeatureColorResult<HairColor> {
    let (color, category) = match measurement.color {
        Some(c) => (c, classify_hair(c)),
        None => (DEFAULT_HAIR, HairColor::Brown),
    };
    FeatureColorResult {
        color: rgb_to_hex(color),
        category,
        confidence: scaled(measurement.confidence, scale),
        description: format!("{} hair", label(&category)),
    }
}

pub fn eye_result(measurement: &FeatureMeasurement, scale: f32) -> FeatureColorResult<EyeColor> {
    let (color, category) = match measurement.color {
        Some(c) => (c, classify_eye(c)),
        None => (DEFAULT_EYE, EyeColor::Brown),
    };
    FeatureColorResult {
        color: rgb_to_hex(color),
        category,
        confidence: scaled(measurement.confidence, scale),
        description: format!("{} eyes", label(&category)),
    }
}

fn scaled(confidence: f32, scale: f32) -> f32 {
    (confidence * scale).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_confidence_curve() {
        let t = FeatureThresholds::SKIN;
        assert_eq!(t.confidence(10), 0.2);
        assert!((t.confidence(100) - 0.5).abs() < 1e-6);
        assert_eq!(t.confidence(10_000), 0.95);

        let e = FeatureThresholds::EYE;
        assert_eq!(e.confidence(0), 0.1);
        assert_eq!(e.confidence(1000), 0.85);
    }

    #[test]
    fn test_skin_classification() {
        assert_eq!(classify_skin(RgbColor::new(200, 160, 130)).0, SkinTone::Medium);
        assert_eq!(classify_skin(RgbColor::new(200, 160, 130)).1, Undertone::Warm);
        assert_eq!(classify_skin(RgbColor::new(250, 225, 210)).0, SkinTone::Fair);
        assert_eq!(classify_skin(RgbColor::new(80, 50, 35)).0, SkinTone::Deep);
    }

    #[test]
    fn test_hair_classification() {
        assert_eq!(classify_hair(RgbColor::new(20, 15, 12)), HairColor::Black);
        assert_eq!(classify_hair(RgbColor::new(60, 40, 25)), HairColor::DarkBrown);
        assert_eq!(classify_hair(RgbColor::new(220, 190, 120)), HairColor::Blonde);
        assert_eq!(classify_hair(RgbColor::new(180, 180, 180)), HairColor::Gray);
        assert_eq!(classify_hair(RgbColor::new(190, 70, 40)), HairColor::Red);
    }

    #[test]
    fn test_blonde_band_is_wide() {
        // Muted sandy tones land in blonde rather than light brown.
        assert_eq!(classify_hair(RgbColor::new(150, 125, 95)), HairColor::Blonde);
        assert!(is_hair_candidate(RgbColor::new(220, 190, 120)));
    }

    #[test]
    fn test_eye_classification_prefers_blue() {
        assert_eq!(classify_eye(RgbColor::new(60, 110, 200)), EyeColor::Blue);
        // Gray with a faint blue lean still reads as blue.
        assert_eq!(classify_eye(RgbColor::new(120, 125, 130)), EyeColor::Blue);
        assert_eq!(classify_eye(RgbColor::new(128, 128, 128)), EyeColor::Gray);
        assert_eq!(classify_eye(RgbColor::new(50, 140, 45)), EyeColor::Green);
        assert_eq!(classify_eye(RgbColor::new(90, 55, 30)), EyeColor::Brown);
    }

    #[test]
    fn test_measure_insufficient_pixels() {
        let samples = vec![ColorSample::new(200, 160, 130); 10];
        let mut rng = StdRng::seed_from_u64(0);
        let m = measure(
            Feature::Skin,
            &samples,
            &FeatureThresholds::SKIN,
            &KMeansConfig::default(),
            &mut rng,
        );
        assert_eq!(m.color, None);
        assert_eq!(m.valid_pixels, 10);
        assert_eq!(m.confidence, 0.2);

        let result = skin_result(&m, 1.0);
        assert_eq!(result.feature.category, SkinTone::Medium);
        assert_eq!(result.feature.color, "#C69678");
    }

    #[test]
    fn test_measure_filters_and_clusters() {
        let mut samples = vec![ColorSample::new(200, 160, 130); 120];
        samples.extend(vec![ColorSample::new(30, 80, 220); 40]);
        let mut rng = StdRng::seed_from_u64(0);
        let m = measure(
            Feature::Skin,
            &samples,
            &FeatureThresholds::SKIN,
            &KMeansConfig::default(),
            &mut rng,
        );
        assert_eq!(m.valid_pixels, 120);
        assert_eq!(m.color, Some(RgbColor::new(200, 160, 130)));

        let result = skin_result(&m, 0.5);
        assert!((result.feature.confidence - 0.27).abs() < 1e-6);
        assert_eq!(result.feature.description, "medium skin with warm undertones");
    }
}
