use crate::pipeline::services::color::{hsl_to_rgb, rgb_to_hsl};
use crate::pipeline::services::image::{ImageRegion, PixelSampler, SampleRegion};
use crate::pipeline::types::{ColorSample, RgbColor};
use image::RgbaImage;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightingThresholds {
    pub low_light: f32,
    pub overexposed: f32,
    pub low_contrast: f32,
    pub desaturated: f32,
    /// |warm - cool| / total above which a color cast is corrected.
    pub color_cast: f32,
}

impl Default for LightingThresholds {
    fn default() -> Self {
        Self {
            low_light: 80.0,
            overexposed: 200.0,
            low_contrast: 50.0,
            desaturated: 0.3,
            color_cast: 0.3,
        }
    }
}

impl LightingThresholds {
    pub fn validate(&self) -> Result<(), String> {
        if self.low_light >= self.overexposed {
            return Err("Low-light threshold must be below the overexposure threshold".to_string());
        }
        if !(0.0..=1.0).contains(&self.desaturated) || !(0.0..=1.0).contains(&self.color_cast) {
            return Err("Saturation and color cast thresholds must be within 0-1".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightingCondition {
    LowLight,
    Overexposed,
    LowContrast,
    Desaturated,
    WarmCast,
    CoolCast,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightingAnalysis {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    /// (warm - cool) / sampled, in [-1, 1].
    pub warm_bias: f32,
    pub conditions: Vec<LightingCondition>,
}

impl LightingAnalysis {
    pub fn has(&self, condition: LightingCondition) -> bool {
        self.conditions.contains(&condition)
    }
}

/// Multiplicative correction applied to every sampled pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingCorrection {
    pub brightness: f32,
    pub contrast: f32,
    pub red_gain: f32,
    pub blue_gain: f32,
    pub saturation: f32,
}

impl LightingCorrection {
    pub const IDENTITY: LightingCorrection = LightingCorrection {
        brightness: 1.0,
        contrast: 1.0,
        red_gain: 1.0,
        blue_gain: 1.0,
        saturation: 1.0,
    };

    pub fn for_analysis(analysis: &LightingAnalysis) -> Self {
        let mut correction = Self::IDENTITY;
        let avg = analysis.brightness.max(1.0);

        if analysis.has(LightingCondition::LowLight) {
            correction.brightness = (128.0 / avg).clamp(1.0, 2.0);
        } else if analysis.has(LightingCondition::Overexposed) {
            correction.brightness = (128.0 / avg).clamp(0.6, 1.0);
        }
        if analysis.has(LightingCondition::LowContrast) {
            correction.contrast = 1.3;
        }
        if analysis.has(LightingCondition::WarmCast) {
            correction.red_gain = 0.92;
            correction.blue_gain = 1.08;
        } else if analysis.has(LightingCondition::CoolCast) {
            correction.red_gain = 1.08;
            correction.blue_gain = 0.92;
        }
        if analysis.has(LightingCondition::Desaturated) {
            correction.saturation = 1.25;
        }
        correction
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn apply(&self, color: RgbColor) -> RgbColor {
        if self.is_identity() {
            return color;
        }
        let adjust = |v: u8, gain: f32| {
            let v = v as f32 * self.brightness * gain;
            ((v - 128.0) * self.contrast + 128.0).clamp(0.0, 255.0).round() as u8
        };
        let balanced = RgbColor::new(
            adjust(color.r, self.red_gain),
            adjust(color.g, 1.0),
            adjust(color.b, self.blue_gain),
        );
        if self.saturation == 1.0 {
            return balanced;
        }
        let mut hsl = rgb_to_hsl(balanced);
        hsl.s = (hsl.s * self.saturation).min(1.0);
        hsl_to_rgb(hsl)
    }

    pub fn apply_all(&self, samples: &mut [ColorSample]) {
        if self.is_identity() {
            return;
        }
        for sample in samples {
            sample.color = self.apply(sample.color);
        }
    }
}

/// Measures the four quadrants and the centre of the image.
pub fn analyze_lighting(
    image: &RgbaImage,
    sampler: &PixelSampler,
    thresholds: &LightingThresholds,
) -> LightingAnalysis {
    let (w, h) = image.dimensions();
    let regions = [
        (0.0, 0.0, 0.5, 0.5),
        (0.5, 0.0, 1.0, 0.5),
        (0.0, 0.5, 0.5, 1.0),
        (0.5, 0.5, 1.0, 1.0),
        (0.25, 0.25, 0.75, 0.75),
    ];

    let mut brightness_sum = 0.0;
    let mut saturation_sum = 0.0;
    let mut contrast_sum = 0.0;
    let mut measured_regions = 0;
    let (mut warm, mut cool, mut total) = (0usize, 0usize, 0usize);

    for (x0, y0, x1, y1) in regions {
        let region = SampleRegion::Rect(ImageRegion::from_fractions(w, h, x0, y0, x1, y1));
        let samples = sampler.sample(image, &region);
        if samples.is_empty() {
            continue;
        }

        let (mut lo, mut hi) = (f32::MAX, f32::MIN);
        for s in &samples {
            let b = s.color.brightness();
            lo = lo.min(b);
            hi = hi.max(b);
            brightness_sum += b;
            saturation_sum += rgb_to_hsl(s.color).s;
            if s.color.r as i16 > s.color.b as i16 + 15 {
                warm += 1;
            } else if s.color.b as i16 > s.color.r as i16 + 15 {
                cool += 1;
            }
        }
        total += samples.len();
        contrast_sum += hi - lo;
        measured_regions += 1;
    }

    if total == 0 {
        return LightingAnalysis {
            brightness: 0.0,
            contrast: 0.0,
            saturation: 0.0,
            warm_bias: 0.0,
            conditions: Vec::new(),
        };
    }

    let n = total as f32;
    let brightness = brightness_sum / n;
    let saturation = saturation_sum / n;
    let contrast = contrast_sum / measured_regions as f32;
    let warm_bias = (warm as f32 - cool as f32) / n;

    let mut conditions = Vec::new();
    if brightness < thresholds.low_light {
        conditions.push(LightingCondition::LowLight);
    } else if brightness > thresholds.overexposed {
        conditions.push(LightingCondition::Overexposed);
    }
    if contrast < thresholds.low_contrast {
        conditions.push(LightingCondition::LowContrast);
    }
    if saturation < thresholds.desaturated {
        conditions.push(LightingCondition::Desaturated);
    }
    if warm_bias > thresholds.color_cast {
        conditions.push(LightingCondition::WarmCast);
    } else if warm_bias < -thresholds.color_cast {
        conditions.push(LightingCondition::CoolCast);
    }

    debug!(
        "Lighting: brightness {:.1}, contrast {:.1}, saturation {:.2}, bias {:.2}, {:?}",
        brightness, contrast, saturation, warm_bias, conditions
    );

    LightingAnalysis {
        brightness,
        contrast,
        saturation,
        warm_bias,
        conditions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    #[test]
    fn test_dark_flat_image() {
        let image = RgbaImage::from_pixel(40, 40, Rgba([40, 40, 40, 255]));
        let analysis = analyze_lighting(
            &image,
            &PixelSampler::default(),
            &LightingThresholds::default(),
        );
        assert!(analysis.has(LightingCondition::LowLight));
        assert!(analysis.has(LightingCondition::LowContrast));
        assert!(analysis.has(LightingCondition::Desaturated));

        let correction = LightingCorrection::for_analysis(&analysis);
        assert!(correction.brightness > 1.0);
        let corrected = correction.apply(RgbColor::new(40, 40, 40));
        assert!(corrected.brightness() > 40.0);
    }

    #[test]
    fn test_well_lit_image_is_untouched() {
        let image: RgbaImage = ImageBuffer::from_fn(40, 40, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([250, 80, 80, 255])
            } else {
                Rgba([20, 30, 160, 255])
            }
        });
        let analysis = analyze_lighting(
            &image,
            &PixelSampler::default(),
            &LightingThresholds::default(),
        );
        assert!(analysis.conditions.is_empty(), "{:?}", analysis.conditions);

        let correction = LightingCorrection::for_analysis(&analysis);
        assert!(correction.is_identity());
        let color = RgbColor::new(12, 34, 56);
        assert_eq!(correction.apply(color), color);
    }

    #[test]
    fn test_warm_cast_is_balanced() {
        let correction = LightingCorrection {
            red_gain: 0.92,
            blue_gain: 1.08,
            ..LightingCorrection::IDENTITY
        };
        let corrected = correction.apply(RgbColor::new(200, 150, 100));
        assert!(corrected.r < 200);
        assert!(corrected.b > 100);
    }
}
