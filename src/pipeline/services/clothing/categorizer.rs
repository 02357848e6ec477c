use super::filename::{context_hint_vote, file_stem, filename_vote, tokenize};
use super::palette::{filter_background, PaletteExtractor, PaletteInput};
use super::shape::{properties_vote, shape_scores, ShapeProfile};
use super::texture::{self, detect_patterns, guess_materials, texture_scores, TextureFeatures};
use super::vision::{VisionCapability, VisionRequest, VisionService, VisionVerdict};
use crate::error::Result;
use crate::pipeline::services::color::KMeansConfig;
use crate::pipeline::services::image::{ImageLoader, ImageSource, LoadedImage, PixelSampler};
use crate::pipeline::services::orchestration::call_with_timeout;
use crate::pipeline::types::{
    CategoryVote, ClothingAnalysisResult, ClothingCategory, SignalSource,
};
use indexmap::IndexMap;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClothingConfig {
    pub filename_weight: f32,
    pub vision_weight: f32,
    pub properties_weight: f32,
    pub context_weight: f32,
    pub min_confidence: f32,
    pub max_confidence: f32,
    pub vision_timeout_ms: u64,
    /// Adds Sobel texture points, pattern and material guesses.
    pub deep_analysis: bool,
    pub palette_size: usize,
    /// Vision confidence needed to accept a "not clothing" verdict.
    pub non_clothing_threshold: f32,
}

impl Default for ClothingConfig {
    fn default() -> Self {
        Self {
            filename_weight: 0.4,
            vision_weight: 0.35,
            properties_weight: 0.15,
            context_weight: 0.1,
            min_confidence: 0.3,
            max_confidence: 0.95,
            vision_timeout_ms: 10_000,
            deep_analysis: true,
            palette_size: 5,
            non_clothing_threshold: 0.7,
        }
    }
}

impl ClothingConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        let weights = [
            self.filename_weight,
            self.vision_weight,
            self.properties_weight,
            self.context_weight,
        ];
        if weights.iter().any(|w| *w < 0.0) || weights.iter().sum::<f32>() <= 0.0 {
            return Err("Signal weights must be non-negative and not all zero".to_string());
        }
        if !(0.0..=1.0).contains(&self.min_confidence)
            || !(0.0..=1.0).contains(&self.max_confidence)
            || self.min_confidence > self.max_confidence
        {
            return Err("Confidence clamp must satisfy 0 <= min <= max <= 1".to_string());
        }
        if self.vision_timeout_ms == 0 {
            return Err("Vision timeout must be greater than 0".to_string());
        }
        if self.palette_size == 0 {
            return Err("Palette size must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.non_clothing_threshold) {
            return Err("Non-clothing threshold must be between 0 and 1".to_string());
        }
        Ok(())
    }

    pub fn weight(&self, source: SignalSource) -> f32 {
        match source {
            SignalSource::Filename => self.filename_weight,
            SignalSource::ExternalVision => self.vision_weight,
            SignalSource::ImageProperties => self.properties_weight,
            SignalSource::ContextHint => self.context_weight,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClothingRequest {
    pub image: ImageSource,
    pub filename: Option<String>,
    pub context_hint: Option<String>,
}

impl ClothingRequest {
    pub fn new(image: ImageSource) -> Self {
        Self {
            image,
            filename: None,
            context_hint: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_context_hint(mut self, hint: impl Into<String>) -> Self {
        self.context_hint = Some(hint.into());
        self
    }
}

/// A result plus the evidence behind it.
#[derive(Debug, Clone)]
pub struct ClothingOutcome {
    pub result: ClothingAnalysisResult,
    pub votes: Vec<CategoryVote>,
    /// No signal voted, or the palette fell back to its default.
    pub used_fallback: bool,
    pub vision_error: Option<String>,
}

/// Weighted category totals. Ties go to the earlier category.
pub fn aggregate_votes(
    votes: &[CategoryVote],
    config: &ClothingConfig,
) -> IndexMap<ClothingCategory, f32> {
    let mut totals: IndexMap<ClothingCategory, f32> =
        ClothingCategory::WEARABLE.iter().map(|c| (*c, 0.0)).collect();
    for vote in votes {
        let weighted = config.weight(vote.source) * vote.confidence;
        *totals.entry(vote.category).or_insert(0.0) += weighted;
    }
    totals
}

/// Winning category and its confidence.
///
/// The weighted totals from [`aggregate_votes`] only pick the winner. The
/// confidence is the mean confidence of the votes for the winner, multiplied
/// by `0.8 + 0.2 * agreement` where `agreement` is the share of the voting
/// signal weight that backs the winner, then clamped to the configured range.
/// A lone vote keeps its own confidence.
pub fn decide(
    votes: &[CategoryVote],
    config: &ClothingConfig,
) -> Option<(ClothingCategory, f32)> {
    if votes.is_empty() {
        return None;
    }
    let totals = aggregate_votes(votes, config);
    let (winner, _) = totals
        .iter()
        .fold(None, |best: Option<(ClothingCategory, f32)>, (&c, &s)| match best {
            Some((_, top)) if top >= s => best,
            _ => Some((c, s)),
        })?;

    let supporting: Vec<&CategoryVote> = votes.iter().filter(|v| v.category == winner).collect();
    let mean = supporting.iter().map(|v| v.confidence).sum::<f32>() / supporting.len() as f32;
    let agreeing: f32 = supporting.iter().map(|v| config.weight(v.source)).sum();
    let available: f32 = votes.iter().map(|v| config.weight(v.source)).sum();
    let agreement = if available > 0.0 {
        agreeing / available
    } else {
        0.0
    };

    let confidence =
        (mean * (0.8 + 0.2 * agreement)).clamp(config.min_confidence, config.max_confidence);
    Some((winner, confidence))
}

fn derive_style(category: ClothingCategory, words: &[String]) -> &'static str {
    let has = |keys: &[&str]| words.iter().any(|w| keys.contains(&w.as_str()));
    if has(&["formal", "suit", "tuxedo", "blazer", "oxford"]) {
        "formal"
    } else if has(&["sport", "sports", "athletic", "running", "gym", "yoga", "training"]) {
        "sporty"
    } else {
        match category {
            ClothingCategory::Dresses => "elegant",
            ClothingCategory::Outerwear | ClothingCategory::Accessories => "classic",
            _ => "casual",
        }
    }
}

fn occasions_for(style: &str) -> Vec<String> {
    let occasions: &[&str] = match style {
        "formal" => &["work", "formal events"],
        "sporty" => &["gym", "outdoor"],
        "elegant" => &["evening", "special occasions"],
        "classic" => &["work", "everyday"],
        _ => &["everyday", "weekend"],
    };
    occasions.iter().map(|s| s.to_string()).collect()
}

const COLD_WEATHER_COLORS: &[&str] = &[
    "black", "charcoal", "navy", "burgundy", "brown", "forest green", "plum", "rust", "olive",
];
const WARM_WEATHER_COLORS: &[&str] = &[
    "white", "yellow", "coral", "mint", "light blue", "sky blue", "peach", "pink", "blush",
    "turquoise",
];

fn seasons_for(category: ClothingCategory, colors: &[String]) -> Vec<String> {
    let cold = category == ClothingCategory::Outerwear
        || colors.iter().any(|c| COLD_WEATHER_COLORS.contains(&c.as_str()));
    let warm = colors.iter().any(|c| WARM_WEATHER_COLORS.contains(&c.as_str()));

    let seasons: &[&str] = match (warm, cold) {
        (true, false) => &["spring", "summer"],
        (false, true) => &["fall", "winter"],
        _ => &["spring", "summer", "fall", "winter"],
    };
    seasons.iter().map(|s| s.to_string()).collect()
}

fn push_unique(tags: &mut Vec<String>, tag: &str) {
    let tag = tag.trim().to_lowercase();
    if !tag.is_empty() && !tags.contains(&tag) {
        tags.push(tag);
    }
}

/// Everything the result is assembled from.
struct Evidence<'a> {
    category: ClothingCategory,
    is_clothing: bool,
    confidence: f32,
    reasoning: String,
    colors: Vec<String>,
    words: Vec<String>,
    verdict: Option<&'a VisionVerdict>,
    texture: Option<TextureFeatures>,
}

fn assemble(evidence: Evidence<'_>) -> ClothingAnalysisResult {
    let style = evidence
        .verdict
        .and_then(|v| v.style.clone())
        .unwrap_or_else(|| derive_style(evidence.category, &evidence.words).to_string());
    let patterns = evidence.texture.as_ref().map(detect_patterns);
    let materials = evidence
        .texture
        .as_ref()
        .map(|t| guess_materials(evidence.category, &evidence.colors, t));

    let mut tags = Vec::new();
    if evidence.is_clothing {
        push_unique(&mut tags, evidence.category.as_str());
        push_unique(&mut tags, &style);
    }
    for color in &evidence.colors {
        push_unique(&mut tags, color);
    }
    for pattern in patterns.iter().flatten() {
        push_unique(&mut tags, pattern);
    }
    let extra_tags = evidence.verdict.map(|v| v.tags.as_slice()).unwrap_or_default();
    for tag in extra_tags {
        push_unique(&mut tags, tag);
    }

    ClothingAnalysisResult {
        is_clothing: evidence.is_clothing,
        category: evidence.category,
        occasions: if evidence.is_clothing {
            occasions_for(&style)
        } else {
            Vec::new()
        },
        seasons: seasons_for(evidence.category, &evidence.colors),
        style,
        colors: evidence.colors,
        tags,
        confidence: evidence.confidence,
        reasoning: evidence.reasoning,
        patterns,
        materials,
    }
}

/// Combines filename, vision, image-property and context-hint votes into
/// one category with a palette and styling metadata.
pub struct ClothingCategorizer {
    config: ClothingConfig,
    loader: ImageLoader,
    palette: PaletteExtractor,
    vision: Option<Arc<dyn VisionService>>,
}

impl ClothingCategorizer {
    pub fn new(
        config: ClothingConfig,
        sampler: PixelSampler,
        clustering: KMeansConfig,
        loader: ImageLoader,
    ) -> Self {
        let palette = PaletteExtractor::new(sampler, clustering, config.palette_size);
        Self {
            config,
            loader,
            palette,
            vision: None,
        }
    }

    pub fn with_vision_service(mut self, service: Arc<dyn VisionService>) -> Self {
        self.vision = Some(service);
        self
    }

    pub fn config(&self) -> &ClothingConfig {
        &self.config
    }

    /// Loads the image and categorizes it. Only load failures are errors.
    pub async fn categorize(&self, request: ClothingRequest) -> Result<ClothingAnalysisResult> {
        Ok(self.categorize_with_evidence(request).await?.result)
    }

    pub async fn categorize_with_evidence(
        &self,
        request: ClothingRequest,
    ) -> Result<ClothingOutcome> {
        let image = self.loader.load(request.image).await?;
        Ok(self
            .categorize_loaded(
                &image,
                request.filename.as_deref(),
                request.context_hint.as_deref(),
            )
            .await)
    }

    async fn consult_vision(
        &self,
        image: &LoadedImage,
        filename: Option<&str>,
    ) -> Option<std::result::Result<VisionVerdict, String>> {
        let service = self.vision.as_ref()?;
        let request = VisionRequest {
            image: Arc::clone(&image.pixels),
            filename: filename.map(str::to_string),
        };
        let budget = Duration::from_millis(self.config.vision_timeout_ms);
        let result = call_with_timeout(
            VisionCapability::new(Arc::clone(service)),
            request,
            "vision analysis",
            budget,
        )
        .await;
        Some(result.map_err(|e| {
            warn!("Vision service unavailable, using heuristics: {}", e);
            e.to_string()
        }))
    }

    pub async fn categorize_loaded(
        &self,
        image: &LoadedImage,
        filename: Option<&str>,
        context_hint: Option<&str>,
    ) -> ClothingOutcome {
        let mut votes = Vec::new();
        let mut vision_error = None;
        let mut verdict = None;

        if let Some(vote) = filename.and_then(filename_vote) {
            votes.push(vote);
        }

        match self.consult_vision(image, filename).await {
            Some(Ok(v)) => verdict = Some(v),
            Some(Err(e)) => vision_error = Some(e),
            None => {}
        }

        let texture = self
            .config
            .deep_analysis
            .then(|| texture::extract(&image.pixels));

        let profile = ShapeProfile::of(image);
        let mut scores = shape_scores(&profile);
        if let Some(features) = &texture {
            for (category, points) in texture_scores(features) {
                *scores.entry(category).or_insert(0) += points;
            }
        }
        let shape_reason = format!(
            "aspect {:.2} ({:?}, {:?})",
            profile.aspect_ratio, profile.aspect, profile.size
        );
        if let Some(vote) = properties_vote(&scores, &shape_reason) {
            votes.push(vote);
        }

        if let Some(vote) = context_hint.and_then(context_hint_vote) {
            votes.push(vote);
        }

        let mut words = filename.map(|f| tokenize(file_stem(f))).unwrap_or_default();
        words.extend(context_hint.map(tokenize).unwrap_or_default());

        let (colors, palette_fallback) = match verdict.as_ref().filter(|v| !v.colors.is_empty()) {
            Some(v) => (filter_background(&v.colors), false),
            None => {
                let outcome = self
                    .palette
                    .extract(&PaletteInput {
                        image: Arc::clone(&image.pixels),
                        filename: filename.map(str::to_string),
                    })
                    .await;
                let fallback = outcome.used_default();
                (outcome.output, fallback)
            }
        };

        // A confident "not clothing" verdict overrides the heuristics.
        if let Some(v) = verdict
            .as_ref()
            .filter(|v| !v.is_clothing && v.confidence >= self.config.non_clothing_threshold)
        {
            info!("Vision reports a non-clothing image ({:.2})", v.confidence);
            let result = assemble(Evidence {
                category: ClothingCategory::Other,
                is_clothing: false,
                confidence: v
                    .confidence
                    .clamp(self.config.min_confidence, self.config.max_confidence),
                reasoning: v.reasoning.clone(),
                colors,
                words,
                verdict: Some(v),
                texture,
            });
            return ClothingOutcome {
                result,
                votes,
                used_fallback: palette_fallback,
                vision_error,
            };
        }

        if let Some(vote) = verdict.as_ref().and_then(VisionVerdict::vote) {
            votes.push(vote);
        }

        for vote in &votes {
            debug!(
                "{:?} votes {} ({:.2}): {}",
                vote.source, vote.category, vote.confidence, vote.reasoning
            );
        }

        let (category, confidence, reasoning, no_votes) = match decide(&votes, &self.config) {
            Some((category, confidence)) => {
                let reasoning = votes
                    .iter()
                    .filter(|v| v.category == category)
                    .map(|v| v.reasoning.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                (category, confidence, reasoning, false)
            }
            None => (
                ClothingCategory::Tops,
                self.config.min_confidence,
                "no signal was conclusive, defaulting to tops".to_string(),
                true,
            ),
        };

        let result = assemble(Evidence {
            category,
            is_clothing: true,
            confidence,
            reasoning,
            colors,
            words,
            verdict: verdict.as_ref(),
            texture,
        });
        info!(
            "Categorized as {} ({:.2}) from {} vote(s)",
            result.category,
            result.confidence,
            votes.len()
        );

        ClothingOutcome {
            result,
            votes,
            used_fallback: no_votes || palette_fallback,
            vision_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::pipeline::services::image::ImageConfig;
    use async_trait::async_trait;
    use image::{DynamicImage, Rgba, RgbaImage};
    use serde_json::json;

    fn categorizer() -> ClothingCategorizer {
        ClothingCategorizer::new(
            ClothingConfig::default(),
            PixelSampler::default(),
            KMeansConfig {
                seed: Some(11),
                ..KMeansConfig::default()
            },
            ImageLoader::new(ImageConfig::default()),
        )
    }

    fn flat(w: u32, h: u32, color: [u8; 4]) -> ImageSource {
        ImageSource::Decoded(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            w,
            h,
            Rgba(color),
        )))
    }

    enum Reply {
        Value(serde_json::Value),
        Fail,
        Hang,
    }

    struct FakeVision(Reply);

    #[async_trait]
    impl VisionService for FakeVision {
        async fn analyze(
            &self,
            _image: &RgbaImage,
            _filename: Option<&str>,
        ) -> Result<serde_json::Value> {
            match &self.0 {
                Reply::Value(v) => Ok(v.clone()),
                Reply::Fail => Err(AnalysisError::CapabilityUnavailable("HTTP 503".into())),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(json!(null))
                }
            }
        }
    }

    fn vote(source: SignalSource, category: ClothingCategory, confidence: f32) -> CategoryVote {
        CategoryVote::new(source, category, confidence, "test")
    }

    #[test]
    fn test_decide_weights_sources() {
        let config = ClothingConfig::default();
        let votes = vec![
            vote(SignalSource::Filename, ClothingCategory::Bottoms, 0.9),
            vote(SignalSource::ImageProperties, ClothingCategory::Tops, 0.8),
        ];
        let (category, confidence) = decide(&votes, &config).unwrap();
        assert_eq!(category, ClothingCategory::Bottoms);
        assert!(confidence > 0.8 && confidence <= 0.95);
        assert!(decide(&[], &config).is_none());
    }

    #[test]
    fn test_decide_scales_mean_by_agreeing_weight() {
        let config = ClothingConfig::default();
        let votes = vec![
            vote(SignalSource::Filename, ClothingCategory::Bottoms, 0.9),
            vote(SignalSource::ExternalVision, ClothingCategory::Bottoms, 0.7),
            vote(SignalSource::ImageProperties, ClothingCategory::Tops, 0.8),
        ];
        let (category, confidence) = decide(&votes, &config).unwrap();
        assert_eq!(category, ClothingCategory::Bottoms);
        // mean 0.8, agreement 0.75 / 0.9
        let expected = 0.8 * (0.8 + 0.2 * (0.75 / 0.9));
        assert!((confidence - expected).abs() < 1e-4, "{confidence}");

        let unanimous = vec![
            vote(SignalSource::Filename, ClothingCategory::Bottoms, 0.9),
            vote(SignalSource::ExternalVision, ClothingCategory::Bottoms, 0.7),
        ];
        let (_, confidence) = decide(&unanimous, &config).unwrap();
        assert!((confidence - 0.8).abs() < 1e-4, "{confidence}");
    }

    #[test]
    fn test_decide_clamps_low_confidence() {
        let config = ClothingConfig::default();
        let votes = vec![vote(SignalSource::ContextHint, ClothingCategory::Shoes, 0.1)];
        assert_eq!(decide(&votes, &config), Some((ClothingCategory::Shoes, 0.3)));
    }

    #[tokio::test]
    async fn test_filename_wins_for_jeans() {
        let request = ClothingRequest::new(flat(300, 300, [40, 60, 110, 255]))
            .with_filename("blue_denim_jeans.jpg");
        let result = categorizer().categorize(request).await.unwrap();
        assert_eq!(result.category, ClothingCategory::Bottoms);
        assert!(result.confidence >= 0.7);
        assert!(result.is_clothing);
    }

    #[tokio::test]
    async fn test_wide_camera_shot_is_shoes() {
        let request =
            ClothingRequest::new(flat(400, 150, [90, 50, 30, 255])).with_filename("img_0231.jpg");
        let outcome = categorizer().categorize_with_evidence(request).await.unwrap();
        assert_eq!(outcome.result.category, ClothingCategory::Shoes);
        assert_eq!(outcome.votes.len(), 1);
        assert_eq!(outcome.votes[0].source, SignalSource::ImageProperties);
        assert_eq!(outcome.result.patterns, Some(vec!["solid".to_string()]));
    }

    #[tokio::test]
    async fn test_failing_vision_falls_back() {
        for reply in [Reply::Fail, Reply::Value(json!({"garbage": true}))] {
            let categorizer = categorizer().with_vision_service(Arc::new(FakeVision(reply)));
            let request = ClothingRequest::new(flat(400, 150, [90, 50, 30, 255]));
            let outcome = categorizer.categorize_with_evidence(request).await.unwrap();
            assert!(outcome.vision_error.is_some());
            assert_eq!(outcome.result.category, ClothingCategory::Shoes);
        }
    }

    #[tokio::test]
    async fn test_slow_vision_times_out() {
        let config = ClothingConfig {
            vision_timeout_ms: 50,
            ..ClothingConfig::default()
        };
        let categorizer = ClothingCategorizer::new(
            config,
            PixelSampler::default(),
            KMeansConfig::default(),
            ImageLoader::new(ImageConfig::default()),
        )
        .with_vision_service(Arc::new(FakeVision(Reply::Hang)));
        let request = ClothingRequest::new(flat(400, 150, [90, 50, 30, 255]));
        let outcome = categorizer.categorize_with_evidence(request).await.unwrap();
        assert!(outcome.vision_error.unwrap().contains("timed out"));
        assert_eq!(outcome.result.category, ClothingCategory::Shoes);
    }

    #[tokio::test]
    async fn test_vision_vote_and_colors() {
        let reply = json!({
            "isClothing": true,
            "category": "outerwear",
            "confidence": 0.9,
            "colors": ["white", "burgundy"],
            "style": "classic",
            "tags": ["wool"]
        });
        let categorizer =
            categorizer().with_vision_service(Arc::new(FakeVision(Reply::Value(reply))));
        let request = ClothingRequest::new(flat(300, 320, [128, 0, 30, 255]))
            .with_filename("winter_coat.jpg");
        let result = categorizer.categorize(request).await.unwrap();
        assert_eq!(result.category, ClothingCategory::Outerwear);
        assert_eq!(result.colors, vec!["burgundy".to_string()]);
        assert_eq!(result.style, "classic");
        assert_eq!(result.seasons, vec!["fall".to_string(), "winter".to_string()]);
        assert!(result.tags.contains(&"wool".to_string()));
    }

    #[tokio::test]
    async fn test_confident_non_clothing_is_other() {
        let reply = json!({"isClothing": false, "category": "other", "confidence": 0.92});
        let categorizer =
            categorizer().with_vision_service(Arc::new(FakeVision(Reply::Value(reply))));
        let result = categorizer
            .categorize(ClothingRequest::new(flat(300, 300, [20, 120, 40, 255])))
            .await
            .unwrap();
        assert!(!result.is_clothing);
        assert_eq!(result.category, ClothingCategory::Other);
        assert!(!result.colors.is_empty());
    }

    #[tokio::test]
    async fn test_transparent_image_gets_neutral_palette() {
        let config = ClothingConfig {
            deep_analysis: false,
            ..ClothingConfig::default()
        };
        let categorizer = ClothingCategorizer::new(
            config,
            PixelSampler::default(),
            KMeansConfig::default(),
            ImageLoader::new(ImageConfig::default()),
        );
        let outcome = categorizer
            .categorize_with_evidence(ClothingRequest::new(flat(300, 300, [0, 0, 0, 0])))
            .await
            .unwrap();
        assert_eq!(outcome.result.colors, vec!["neutral".to_string()]);
        assert!(outcome.used_fallback);
        assert!(outcome.result.patterns.is_none());
        assert!(outcome.result.materials.is_none());
    }

    #[tokio::test]
    async fn test_result_serializes_with_camel_case_keys() {
        let request = ClothingRequest::new(flat(300, 300, [40, 60, 110, 255]))
            .with_filename("blue_denim_jeans.jpg");
        let result = categorizer().categorize(request).await.unwrap();
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["isClothing"], true);
        assert_eq!(value["category"], json!(result.category));
        assert!(value.get("is_clothing").is_none());
        for key in ["style", "colors", "occasions", "seasons", "tags", "confidence", "reasoning"] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
        assert!(value["colors"].as_array().is_some_and(|c| !c.is_empty()));
    }

    #[tokio::test]
    async fn test_bad_bytes_are_a_hard_failure() {
        let err = categorizer()
            .categorize(ClothingRequest::new(ImageSource::Bytes(vec![1, 2, 3])))
            .await
            .unwrap_err();
        assert!(err.is_hard_failure());
    }

    #[tokio::test]
    async fn test_confidence_and_colors_invariants() {
        let cases = [
            (flat(400, 150, [255, 255, 255, 255]), Some("nike_sneakers.png")),
            (flat(120, 400, [200, 30, 60, 255]), Some("maxi_dress.jpg")),
            (flat(300, 300, [0, 0, 0, 0]), None),
            (flat(1200, 1100, [70, 70, 70, 255]), Some("IMG_1.HEIC")),
        ];
        for (image, filename) in cases {
            let mut request = ClothingRequest::new(image);
            request.filename = filename.map(str::to_string);
            let result = categorizer().categorize(request).await.unwrap();
            assert!((0.3..=0.95).contains(&result.confidence), "{result:?}");
            assert!(!result.colors.is_empty());
            assert_ne!(result.category, ClothingCategory::Other);
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(ClothingConfig::default().validate().is_ok());
        let bad = ClothingConfig {
            min_confidence: 0.9,
            max_confidence: 0.5,
            ..ClothingConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
