use super::features::{
    eye_result, hair_result, measure, skin_result, Feature, FeatureMeasurement,
    FeatureThresholds, MAX_CONFIDENCE, MIN_CONFIDENCE,
};
use super::landmarks::{LandmarkDetector, LandmarkService};
use super::lighting::{analyze_lighting, LightingCorrection, LightingThresholds};
use super::regions::{heuristic_regions, landmark_regions, FeatureRegions};
use crate::error::{AnalysisError, Result};
use crate::pipeline::services::color::KMeansConfig;
use crate::pipeline::services::image::{
    ImageLoader, ImageSource, LoadedImage, PixelSampler, SampleRegion,
};
use crate::pipeline::services::orchestration::{
    call_with_timeout, AnalysisStrategy, ChainOutcome, FallbackChain,
};
use crate::pipeline::types::{
    ColorSample, DetectionMethod, EyeColor, FacialAnalysis, HairColor, Season, SkinTone,
    SkinToneResult, Undertone,
};
use async_trait::async_trait;
use image::RgbaImage;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    pub skin: FeatureThresholds,
    pub hair: FeatureThresholds,
    pub eye: FeatureThresholds,
    /// Multiplier on heuristic-path confidences; below 1 so landmark
    /// results always rank higher for the same photo.
    pub heuristic_confidence_scale: f32,
    pub landmark_timeout_ms: u64,
    pub lighting: LightingThresholds,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            skin: FeatureThresholds::SKIN,
            hair: FeatureThresholds::HAIR,
            eye: FeatureThresholds::EYE,
            heuristic_confidence_scale: 0.75,
            landmark_timeout_ms: 5_000,
            lighting: LightingThresholds::default(),
        }
    }
}

impl FaceConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.skin.validate()?;
        self.hair.validate()?;
        self.eye.validate()?;
        self.lighting.validate()?;
        if !(self.heuristic_confidence_scale > 0.0 && self.heuristic_confidence_scale < 1.0) {
            return Err("Heuristic confidence scale must be between 0 and 1".to_string());
        }
        if self.landmark_timeout_ms == 0 {
            return Err("Landmark timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Sampling and clustering shared by every face strategy.
struct FeatureContext {
    config: FaceConfig,
    sampler: PixelSampler,
    clustering: KMeansConfig,
}

impl FeatureContext {
    fn sample(&self, image: &RgbaImage, regions: &[SampleRegion]) -> Vec<ColorSample> {
        regions
            .iter()
            .flat_map(|region| self.sampler.sample(image, region))
            .collect()
    }

    fn measure_all(
        &self,
        image: &RgbaImage,
        regions: &FeatureRegions,
        correction: LightingCorrection,
    ) -> [FeatureMeasurement; 3] {
        let mut rng = self.clustering.rng();
        let mut run = |feature, regions: &[SampleRegion], thresholds| {
            let mut samples = self.sample(image, regions);
            correction.apply_all(&mut samples);
            measure(feature, &samples, thresholds, &self.clustering, &mut rng)
        };
        [
            run(Feature::Skin, &regions.skin, &self.config.skin),
            run(Feature::Hair, &regions.hair, &self.config.hair),
            run(Feature::Eye, &regions.eyes, &self.config.eye),
        ]
    }
}

/// Personal color season from undertone, depth and hair contrast.
pub fn color_season(skin: &SkinToneResult, hair: HairColor, eye: EyeColor) -> Season {
    let light_skin = matches!(skin.feature.category, SkinTone::Fair | SkinTone::Light);
    let dark_hair = matches!(hair, HairColor::Black | HairColor::DarkBrown);
    let light_hair = matches!(
        hair,
        HairColor::Blonde | HairColor::LightBrown | HairColor::Red
    );

    match skin.undertone {
        Undertone::Warm => {
            if light_skin && (light_hair || matches!(eye, EyeColor::Blue | EyeColor::Green)) {
                Season::Spring
            } else {
                Season::Autumn
            }
        }
        Undertone::Cool => {
            if dark_hair {
                Season::Winter
            } else {
                Season::Summer
            }
        }
        Undertone::Neutral => match hair {
            HairColor::Black | HairColor::DarkBrown => Season::Winter,
            HairColor::Red | HairColor::Auburn => Season::Autumn,
            HairColor::Blonde | HairColor::LightBrown | HairColor::Gray => Season::Summer,
            HairColor::Brown if light_skin => Season::Summer,
            HairColor::Brown => Season::Autumn,
        },
    }
}

fn assemble(
    measurements: &[FeatureMeasurement; 3],
    scale: f32,
    method: DetectionMethod,
    detected_features: bool,
) -> FacialAnalysis {
    let [skin, hair, eye] = measurements;
    let skin_tone = skin_result(skin, scale);
    let hair_color = hair_result(hair, scale);
    let eye_color = eye_result(eye, scale);

    let overall = (skin_tone.feature.confidence + hair_color.confidence + eye_color.confidence)
        / 3.0;
    let color_season = color_season(&skin_tone, hair_color.category, eye_color.category);

    FacialAnalysis {
        skin_tone,
        hair_color,
        eye_color,
        overall_confidence: overall.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE),
        detected_features,
        method,
        color_season,
        recommended_colors: color_season.palette().to_vec(),
    }
}

/// The fixed record returned when every strategy has failed.
pub fn default_analysis(config: &FaceConfig) -> FacialAnalysis {
    let floor = |t: &FeatureThresholds| FeatureMeasurement {
        color: None,
        valid_pixels: 0,
        confidence: t.confidence(0),
    };
    let measurements = [floor(&config.skin), floor(&config.hair), floor(&config.eye)];
    assemble(&measurements, 1.0, DetectionMethod::Fallback, false)
}

struct LandmarkStrategy {
    ctx: Arc<FeatureContext>,
    detector: Arc<dyn LandmarkDetector>,
}

#[async_trait]
impl AnalysisStrategy<Arc<RgbaImage>, FacialAnalysis> for LandmarkStrategy {
    fn name(&self) -> &'static str {
        "landmarks"
    }

    async fn attempt(&self, image: &Arc<RgbaImage>) -> Result<FacialAnalysis> {
        let budget = Duration::from_millis(self.ctx.config.landmark_timeout_ms);
        let service = LandmarkService::new(Arc::clone(&self.detector));
        let landmarks =
            call_with_timeout(service, Arc::clone(image), "landmark detection", budget).await?;

        let regions = landmark_regions(&landmarks);
        let measurements = self
            .ctx
            .measure_all(image, &regions, LightingCorrection::IDENTITY);

        let skin = &measurements[0];
        if skin.color.is_none() {
            return Err(AnalysisError::InsufficientSamples {
                found: skin.valid_pixels,
                required: self.ctx.config.skin.min_pixels,
            });
        }
        Ok(assemble(&measurements, 1.0, DetectionMethod::Landmarks, true))
    }
}

struct HeuristicStrategy {
    ctx: Arc<FeatureContext>,
}

#[async_trait]
impl AnalysisStrategy<Arc<RgbaImage>, FacialAnalysis> for HeuristicStrategy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn attempt(&self, image: &Arc<RgbaImage>) -> Result<FacialAnalysis> {
        let (w, h) = image.dimensions();
        let lighting = analyze_lighting(image, &self.ctx.sampler, &self.ctx.config.lighting);
        let correction = LightingCorrection::for_analysis(&lighting);

        let measurements = self
            .ctx
            .measure_all(image, &heuristic_regions(w, h), correction);

        if measurements.iter().all(|m| m.color.is_none()) {
            return Err(AnalysisError::InsufficientSamples {
                found: measurements.iter().map(|m| m.valid_pixels).sum(),
                required: self.ctx.config.eye.min_pixels,
            });
        }
        Ok(assemble(
            &measurements,
            self.ctx.config.heuristic_confidence_scale,
            DetectionMethod::Heuristic,
            true,
        ))
    }
}

/// Skin, hair and eye color detection. Landmark sampling is tried first
/// when a detector is configured, then fixed image regions, then a
/// fixed default record.
pub struct FacialFeatureAnalyzer {
    loader: ImageLoader,
    config: FaceConfig,
    chain: FallbackChain<Arc<RgbaImage>, FacialAnalysis>,
}

impl FacialFeatureAnalyzer {
    pub fn new(
        config: FaceConfig,
        sampler: PixelSampler,
        clustering: KMeansConfig,
        loader: ImageLoader,
        detector: Option<Arc<dyn LandmarkDetector>>,
    ) -> Self {
        let ctx = Arc::new(FeatureContext {
            config: config.clone(),
            sampler,
            clustering,
        });

        let mut chain = FallbackChain::new();
        if let Some(detector) = detector {
            chain = chain.then(Box::new(LandmarkStrategy {
                ctx: Arc::clone(&ctx),
                detector,
            }));
        }
        let chain = chain.then(Box::new(HeuristicStrategy { ctx }));

        Self {
            loader,
            config,
            chain,
        }
    }

    pub fn strategies(&self) -> Vec<&'static str> {
        self.chain.names()
    }

    /// Loads `source` and analyzes it. Only load failures are returned as
    /// errors.
    pub async fn analyze(&self, source: ImageSource) -> Result<FacialAnalysis> {
        let image = self.loader.load(source).await?;
        Ok(self.analyze_loaded(&image).await.output)
    }

    pub async fn analyze_loaded(&self, image: &LoadedImage) -> ChainOutcome<FacialAnalysis> {
        let outcome = self
            .chain
            .run_or_else(&image.pixels, || default_analysis(&self.config))
            .await;

        for attempt in outcome.attempts.iter().filter(|a| a.error.is_some()) {
            debug!(
                "Face strategy '{}' gave way: {}",
                attempt.strategy,
                attempt.error.as_deref().unwrap_or_default()
            );
        }
        info!(
            "Facial analysis via {:?}: {:?} skin, {:?} hair, {:?} eyes ({:.2})",
            outcome.output.method,
            outcome.output.skin_tone.feature.category,
            outcome.output.hair_color.category,
            outcome.output.eye_color.category,
            outcome.output.overall_confidence
        );
        outcome
    }
}
