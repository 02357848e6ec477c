//! Garment color names, from pixels first and the filename second.

use super::filename::{file_stem, tokenize};
use crate::error::{AnalysisError, Result};
use crate::pipeline::services::color::{classify_color, cluster, named_color, KMeansConfig};
use crate::pipeline::services::image::PixelSampler;
use crate::pipeline::services::orchestration::{AnalysisStrategy, ChainOutcome, FallbackChain};
use async_trait::async_trait;
use image::RgbaImage;
use std::sync::Arc;
use tracing::debug;

/// Used when neither pixels nor filename yield a color.
pub const FALLBACK_COLOR: &str = "neutral";

const BACKGROUND_COLORS: &[&str] = &["white", "light gray", "gray", "cream", FALLBACK_COLOR];

/// Clusters holding less of the sampled mass are ignored.
const MIN_CLUSTER_SHARE: f32 = 0.05;

pub fn is_background_color(name: &str) -> bool {
    BACKGROUND_COLORS.contains(&name)
}

/// Drops studio-background colors unless nothing else is left, in which
/// case the first one is kept. Idempotent.
pub fn filter_background(colors: &[String]) -> Vec<String> {
    let kept: Vec<String> = colors
        .iter()
        .filter(|c| !is_background_color(c))
        .cloned()
        .collect();
    if kept.is_empty() {
        colors.iter().take(1).cloned().collect()
    } else {
        kept
    }
}

fn push_unique(colors: &mut Vec<String>, name: &str) {
    if !colors.iter().any(|c| c == name) {
        colors.push(name.to_string());
    }
}

/// Named colors of the dominant clusters, heaviest first.
pub fn image_palette<R: rand::Rng + ?Sized>(
    image: &RgbaImage,
    sampler: &PixelSampler,
    clustering: &KMeansConfig,
    max_colors: usize,
    rng: &mut R,
) -> Vec<String> {
    let samples = sampler.sample_all(image);
    let clusters = cluster(&samples, clustering, rng);
    let total: f32 = clusters.iter().map(|c| c.weighted_count).sum();

    let mut colors = Vec::new();
    for c in clusters {
        if total <= 0.0 || c.weighted_count / total < MIN_CLUSTER_SHARE {
            continue;
        }
        push_unique(&mut colors, classify_color(c.color).name);
    }
    colors.truncate(max_colors.max(1));
    colors
}

/// Color words in a filename. Two-word names win over their parts.
pub fn filename_colors(filename: &str) -> Vec<String> {
    let words = tokenize(file_stem(filename));
    let mut colors = Vec::new();
    let mut i = 0;
    while i < words.len() {
        if let Some(pair) = words.get(i + 1).map(|next| format!("{} {}", words[i], next)) {
            if let Some(named) = named_color(&pair) {
                push_unique(&mut colors, named.name);
                i += 2;
                continue;
            }
        }
        if let Some(named) = named_color(&words[i]) {
            push_unique(&mut colors, named.name);
        }
        i += 1;
    }
    colors
}

#[derive(Debug, Clone)]
pub struct PaletteInput {
    pub image: Arc<RgbaImage>,
    pub filename: Option<String>,
}

struct ImagePaletteStrategy {
    sampler: PixelSampler,
    clustering: KMeansConfig,
    max_colors: usize,
}

#[async_trait]
impl AnalysisStrategy<PaletteInput, Vec<String>> for ImagePaletteStrategy {
    fn name(&self) -> &'static str {
        "image"
    }

    async fn attempt(&self, input: &PaletteInput) -> Result<Vec<String>> {
        let mut rng = self.clustering.rng();
        let colors = image_palette(
            &input.image,
            &self.sampler,
            &self.clustering,
            self.max_colors,
            &mut rng,
        );
        if colors.is_empty() {
            return Err(AnalysisError::InsufficientSamples {
                found: 0,
                required: 1,
            });
        }
        Ok(colors)
    }
}

struct FilenamePaletteStrategy;

#[async_trait]
impl AnalysisStrategy<PaletteInput, Vec<String>> for FilenamePaletteStrategy {
    fn name(&self) -> &'static str {
        "filename"
    }

    async fn attempt(&self, input: &PaletteInput) -> Result<Vec<String>> {
        let colors = input
            .filename
            .as_deref()
            .map(filename_colors)
            .unwrap_or_default();
        if colors.is_empty() {
            return Err(AnalysisError::InsufficientSamples {
                found: 0,
                required: 1,
            });
        }
        Ok(colors)
    }
}

pub struct PaletteExtractor {
    chain: FallbackChain<PaletteInput, Vec<String>>,
}

impl PaletteExtractor {
    pub fn new(sampler: PixelSampler, clustering: KMeansConfig, max_colors: usize) -> Self {
        let chain = FallbackChain::new()
            .then(Box::new(ImagePaletteStrategy {
                sampler,
                clustering,
                max_colors,
            }))
            .then(Box::new(FilenamePaletteStrategy));
        Self { chain }
    }

    /// Never empty; background colors are filtered.
    pub async fn extract(&self, input: &PaletteInput) -> ChainOutcome<Vec<String>> {
        let mut outcome = self
            .chain
            .run_or_else(input, || vec![FALLBACK_COLOR.to_string()])
            .await;
        outcome.output = filter_background(&outcome.output);
        debug!(
            "Palette {:?} from {}",
            outcome.output,
            outcome.strategy.unwrap_or("default")
        );
        outcome
    }
}
