//! Deeper image features: Sobel edges, color complexity, symmetry and
//! compactness. Used for extra category points plus pattern and material
//! guesses.

use super::shape::is_foreground;
use crate::pipeline::types::ClothingCategory;
use image::{imageops, RgbaImage};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Gradient magnitude above which a pixel counts as an edge.
const EDGE_THRESHOLD: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextureFeatures {
    /// Fraction of interior pixels on an edge.
    pub edge_density: f32,
    /// Edge orientation histogram: horizontal, 45°, vertical, 135°.
    pub directions: [f32; 4],
    pub color_complexity: f32,
    /// 1.0 for a perfect left/right mirror.
    pub symmetry: f32,
    /// Foreground share of its bounding box.
    pub compactness: f32,
}

impl TextureFeatures {
    pub fn horizontal(&self) -> f32 {
        self.directions[0]
    }

    pub fn vertical(&self) -> f32 {
        self.directions[2]
    }
}

pub fn extract(image: &RgbaImage) -> TextureFeatures {
    let (w, h) = image.dimensions();
    if w < 3 || h < 3 {
        return TextureFeatures::default();
    }
    let luma = imageops::grayscale(image);
    let at = |x: u32, y: u32| luma.get_pixel(x, y).0[0] as f32;

    let mut bins = [0u32; 4];
    let mut edges = 0u32;
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let gx = at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1)
                - at(x - 1, y - 1)
                - 2.0 * at(x - 1, y)
                - at(x - 1, y + 1);
            let gy = at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1)
                - at(x - 1, y - 1)
                - 2.0 * at(x, y - 1)
                - at(x + 1, y - 1);
            if (gx * gx + gy * gy).sqrt() <= EDGE_THRESHOLD {
                continue;
            }
            edges += 1;
            // Edges run perpendicular to the gradient.
            let orientation = (gy.atan2(gx).to_degrees() + 90.0).rem_euclid(180.0);
            let bin = match orientation {
                o if !(22.5..157.5).contains(&o) => 0,
                o if o < 67.5 => 1,
                o if o < 112.5 => 2,
                _ => 3,
            };
            bins[bin] += 1;
        }
    }

    let interior = ((w - 2) * (h - 2)) as f32;
    let directions = if edges == 0 {
        [0.0; 4]
    } else {
        bins.map(|b| b as f32 / edges as f32)
    };

    let mut palette = HashSet::new();
    let mut foreground = 0u32;
    let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0, 0);
    for (x, y, pixel) in image.enumerate_pixels() {
        if !is_foreground(pixel) {
            continue;
        }
        foreground += 1;
        let [r, g, b, _] = pixel.0;
        palette.insert((r >> 5, g >> 5, b >> 5));
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }
    let compactness = if foreground == 0 {
        0.0
    } else {
        foreground as f32 / ((x1 - x0 + 1) * (y1 - y0 + 1)) as f32
    };

    let mut mirror_diff = 0.0;
    for y in 0..h {
        for x in 0..w / 2 {
            mirror_diff += (at(x, y) - at(w - 1 - x, y)).abs();
        }
    }
    let symmetry = 1.0 - mirror_diff / ((w / 2) * h) as f32 / 255.0;

    TextureFeatures {
        edge_density: edges as f32 / interior,
        directions,
        color_complexity: (palette.len() as f32 / 64.0).min(1.0),
        symmetry,
        compactness,
    }
}

/// Small additive points per category; shape stays the dominant signal.
pub fn texture_scores(features: &TextureFeatures) -> IndexMap<ClothingCategory, i32> {
    use ClothingCategory::*;

    let mut scores: IndexMap<ClothingCategory, i32> =
        ClothingCategory::WEARABLE.iter().map(|c| (*c, 0)).collect();
    let mut add = |category: ClothingCategory, points: i32| {
        *scores.entry(category).or_insert(0) += points;
    };

    let busy = features.edge_density > 0.05;
    if busy && features.horizontal() > 0.45 {
        add(Tops, 1);
    }
    if busy && features.vertical() > 0.45 {
        add(Bottoms, 1);
    }
    if features.symmetry > 0.9 && features.compactness > 0.7 {
        add(Tops, 1);
        add(Outerwear, 1);
    }
    if features.compactness > 0.0 && features.compactness < 0.45 {
        add(Accessories, 2);
    }
    if features.color_complexity > 0.5 {
        add(Dresses, 1);
    }
    if features.edge_density > 0.25 {
        add(Outerwear, 1);
    }
    scores
}

pub fn detect_patterns(features: &TextureFeatures) -> Vec<String> {
    let mut patterns = Vec::new();
    if features.edge_density < 0.02 {
        patterns.push("solid");
    } else {
        if features.edge_density >= 0.05
            && (features.horizontal() > 0.5 || features.vertical() > 0.5)
        {
            patterns.push("striped");
        }
        if features.edge_density >= 0.05 && features.color_complexity > 0.4 {
            patterns.push("patterned");
        }
        if patterns.is_empty() {
            patterns.push("textured");
        }
    }
    patterns.into_iter().map(String::from).collect()
}

pub fn guess_materials(
    category: ClothingCategory,
    colors: &[String],
    features: &TextureFeatures,
) -> Vec<String> {
    let blue = colors
        .iter()
        .any(|c| matches!(c.as_str(), "denim" | "navy" | "blue"));

    let mut materials = Vec::new();
    match category {
        ClothingCategory::Bottoms if blue => materials.push("denim"),
        ClothingCategory::Shoes | ClothingCategory::Accessories => materials.push("leather"),
        ClothingCategory::Outerwear if features.edge_density > 0.15 => materials.push("wool"),
        ClothingCategory::Outerwear => materials.push("nylon"),
        _ => {}
    }
    if features.edge_density > 0.2 {
        materials.push("knit");
    }
    if materials.is_empty() {
        materials.push("cotton");
    }
    materials.dedup();
    materials.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn stripes(horizontal: bool) -> RgbaImage {
        RgbaImage::from_fn(60, 60, |x, y| {
            let band = if horizontal { y / 3 } else { x / 3 };
            if band % 2 == 0 {
                Rgba([20, 20, 20, 255])
            } else {
                Rgba([200, 60, 60, 255])
            }
        })
    }

    #[test]
    fn test_flat_image_is_solid() {
        let image = RgbaImage::from_pixel(50, 50, Rgba([30, 60, 120, 255]));
        let features = extract(&image);
        assert_eq!(features.edge_density, 0.0);
        assert!((features.symmetry - 1.0).abs() < 1e-6);
        assert_eq!(features.compactness, 1.0);
        assert_eq!(detect_patterns(&features), vec!["solid"]);
    }

    #[test]
    fn test_stripe_orientation() {
        let h = extract(&stripes(true));
        assert!(h.horizontal() > 0.9, "{:?}", h.directions);
        assert!(detect_patterns(&h).contains(&"striped".to_string()));
        let scores = texture_scores(&h);
        assert!(scores[&ClothingCategory::Tops] >= 1);
        assert_eq!(scores[&ClothingCategory::Bottoms], 0);

        let v = extract(&stripes(false));
        assert!(v.vertical() > 0.9, "{:?}", v.directions);
        assert_eq!(texture_scores(&v)[&ClothingCategory::Bottoms], 1);
    }

    #[test]
    fn test_sparse_foreground_is_not_compact() {
        let image = RgbaImage::from_fn(40, 40, |x, y| {
            if x == y || x + y == 39 {
                Rgba([10, 10, 10, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let features = extract(&image);
        assert!(features.compactness < 0.1);
        assert_eq!(texture_scores(&features)[&ClothingCategory::Accessories], 2);
    }

    #[test]
    fn test_materials() {
        let flat = TextureFeatures::default();
        assert_eq!(
            guess_materials(ClothingCategory::Bottoms, &["denim".to_string()], &flat),
            vec!["denim"]
        );
        assert_eq!(guess_materials(ClothingCategory::Tops, &[], &flat), vec!["cotton"]);
    }
}
