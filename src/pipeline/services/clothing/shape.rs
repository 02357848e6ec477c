//! Aspect-ratio and size heuristics, scored per category.

use crate::pipeline::services::image::LoadedImage;
use crate::pipeline::types::{CategoryVote, ClothingCategory, SignalSource};
use image::{Rgba, RgbaImage};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectBucket {
    VeryWide,
    Wide,
    Squarish,
    Tall,
    VeryTall,
}

impl AspectBucket {
    pub fn of(ratio: f32) -> Self {
        if ratio > 2.0 {
            AspectBucket::VeryWide
        } else if ratio > 1.3 {
            AspectBucket::Wide
        } else if ratio > 0.8 {
            AspectBucket::Squarish
        } else if ratio > 0.5 {
            AspectBucket::Tall
        } else {
            AspectBucket::VeryTall
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeBucket {
    Small,
    Medium,
    Large,
}

impl SizeBucket {
    pub fn of(pixels: u64) -> Self {
        if pixels < 150_000 {
            SizeBucket::Small
        } else if pixels < 1_000_000 {
            SizeBucket::Medium
        } else {
            SizeBucket::Large
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeProfile {
    pub aspect_ratio: f32,
    pub aspect: AspectBucket,
    pub size: SizeBucket,
    /// Most of the garment sits in the central vertical band.
    pub center_focus: bool,
}

impl ShapeProfile {
    pub fn of(image: &LoadedImage) -> Self {
        let aspect_ratio = image.aspect_ratio();
        Self {
            aspect_ratio,
            aspect: AspectBucket::of(aspect_ratio),
            size: SizeBucket::of(image.pixel_count()),
            center_focus: center_focus(&image.pixels),
        }
    }
}

/// Opaque and not near-white studio background.
pub fn is_foreground(pixel: &Rgba<u8>) -> bool {
    let [r, g, b, a] = pixel.0;
    a >= 128 && r.min(g).min(b) < 235
}

pub fn center_focus(image: &RgbaImage) -> bool {
    let width = image.width();
    let (lo, hi) = (width / 4, width - width / 4);
    let (mut center, mut total) = (0u32, 0u32);
    for (x, _, pixel) in image.enumerate_pixels() {
        if is_foreground(pixel) {
            total += 1;
            if (lo..hi).contains(&x) {
                center += 1;
            }
        }
    }
    total > 0 && center as f32 / total as f32 >= 0.7
}

fn add(scores: &mut IndexMap<ClothingCategory, i32>, category: ClothingCategory, points: i32) {
    *scores.entry(category).or_insert(0) += points;
}

/// Points per wearable category; contradictory combinations are penalised
/// and totals never go below zero.
pub fn shape_scores(profile: &ShapeProfile) -> IndexMap<ClothingCategory, i32> {
    use ClothingCategory::*;

    let mut scores: IndexMap<ClothingCategory, i32> =
        ClothingCategory::WEARABLE.iter().map(|c| (*c, 0)).collect();

    match profile.aspect {
        AspectBucket::VeryWide => {
            add(&mut scores, Shoes, 4);
            add(&mut scores, Accessories, 2);
            add(&mut scores, Bottoms, 1);
            if profile.size == SizeBucket::Small {
                add(&mut scores, Shoes, 2);
            }
            add(&mut scores, Dresses, -3);
            add(&mut scores, Outerwear, -2);
        }
        AspectBucket::Wide => {
            add(&mut scores, Shoes, 2);
            add(&mut scores, Accessories, 2);
            add(&mut scores, Tops, 1);
            add(&mut scores, Bottoms, 1);
        }
        AspectBucket::Squarish => {
            add(&mut scores, Tops, 3);
            add(&mut scores, Accessories, 2);
            add(&mut scores, Outerwear, 1);
            if profile.size == SizeBucket::Large {
                add(&mut scores, Shoes, -1);
            }
        }
        AspectBucket::Tall => {
            add(&mut scores, Bottoms, 2);
            add(&mut scores, Outerwear, 2);
            add(&mut scores, Dresses, 2);
            add(&mut scores, Tops, 1);
            add(&mut scores, Shoes, -2);
        }
        AspectBucket::VeryTall => {
            add(&mut scores, Dresses, 3);
            add(&mut scores, Bottoms, 3);
            if profile.center_focus {
                add(&mut scores, Dresses, 2);
            }
            add(&mut scores, Shoes, -3);
        }
    }

    match profile.size {
        SizeBucket::Small => {
            add(&mut scores, Shoes, 1);
            add(&mut scores, Accessories, 1);
        }
        SizeBucket::Medium => {}
        SizeBucket::Large => {
            add(&mut scores, Outerwear, 1);
            add(&mut scores, Dresses, 1);
        }
    }

    for score in scores.values_mut() {
        *score = (*score).max(0);
    }
    scores
}

/// Image-properties vote from combined shape (and texture) points.
pub fn properties_vote(
    scores: &IndexMap<ClothingCategory, i32>,
    reasoning: &str,
) -> Option<CategoryVote> {
    let (category, score) = scores
        .iter()
        .fold(None, |best: Option<(ClothingCategory, i32)>, (&c, &s)| match best {
            Some((_, top)) if top >= s => best,
            _ => Some((c, s)),
        })?;

    if score < 2 {
        return None;
    }
    Some(CategoryVote::new(
        SignalSource::ImageProperties,
        category,
        (0.35 + 0.07 * score as f32).min(0.8),
        format!("{} ({} points for {})", reasoning, score, category),
    ))
}
