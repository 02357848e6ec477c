//! Where to sample skin, hair and eyes. Landmark regions hug the detected
//! face; heuristic regions are fixed fractions of the whole image.

use super::landmarks::FaceLandmarks;
use crate::pipeline::services::image::{ImageRegion, Point, SampleRegion};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRegions {
    pub skin: Vec<SampleRegion>,
    pub hair: Vec<SampleRegion>,
    pub eyes: Vec<SampleRegion>,
}

/// Image-relative regions for a roughly centred portrait.
pub fn heuristic_regions(width: u32, height: u32) -> FeatureRegions {
    let rect = |x0, y0, x1, y1| {
        SampleRegion::Rect(ImageRegion::from_fractions(width, height, x0, y0, x1, y1))
    };
    FeatureRegions {
        skin: vec![rect(0.3, 0.3, 0.7, 0.7)],
        hair: vec![rect(0.15, 0.0, 0.85, 0.4)],
        eyes: vec![rect(0.25, 0.32, 0.45, 0.40), rect(0.55, 0.32, 0.75, 0.40)],
    }
}

fn centroid(points: &[Point]) -> Point {
    let n = points.len().max(1) as f32;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
    Point::new(sx / n, sy / n)
}

fn bounds(points: &[Point]) -> (f32, f32, f32, f32) {
    points.iter().fold(
        (f32::MAX, f32::MAX, f32::MIN, f32::MIN),
        |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
    )
}

fn rect_polygon(x0: f32, y0: f32, x1: f32, y1: f32) -> SampleRegion {
    SampleRegion::Polygon(vec![
        Point::new(x0, y0),
        Point::new(x1, y0),
        Point::new(x1, y1),
        Point::new(x0, y1),
    ])
}

/// Eye outline pulled toward its centre so only the iris is sampled.
fn iris(eye: &[Point], shrink: f32) -> SampleRegion {
    let c = centroid(eye);
    SampleRegion::Polygon(
        eye.iter()
            .map(|p| Point::new(c.x + (p.x - c.x) * shrink, c.y + (p.y - c.y) * shrink))
            .collect(),
    )
}

/// Regions derived from landmark geometry.
pub fn landmark_regions(landmarks: &FaceLandmarks) -> FeatureRegions {
    let mut brows: Vec<Point> = landmarks
        .left_eyebrow
        .iter()
        .chain(&landmarks.right_eyebrow)
        .copied()
        .collect();
    brows.sort_by(|a, b| a.x.total_cmp(&b.x));

    let eyes: Vec<Point> = landmarks
        .left_eye
        .iter()
        .chain(&landmarks.right_eye)
        .copied()
        .collect();
    let brow_y = centroid(&brows).y;
    let gap = (centroid(&eyes).y - brow_y).abs().max(4.0);
    let (jaw_x0, _, jaw_x1, jaw_y1) = bounds(&landmarks.jaw);
    let (_, brow_top, _, _) = bounds(&brows);
    let face_height = (jaw_y1 - brow_top).max(gap * 4.0);

    // Forehead: the brow line lifted clear of the brows, extended upward.
    let lower: Vec<Point> = brows
        .iter()
        .map(|p| Point::new(p.x, p.y - gap * 0.3))
        .collect();
    let upper = lower
        .iter()
        .rev()
        .map(|p| Point::new(p.x, p.y - gap * 1.2));
    let forehead = SampleRegion::Polygon(lower.iter().copied().chain(upper).collect());

    // Cheeks: below each eye, between the eye's outer edge and the nose.
    let (nose_x0, _, nose_x1, nose_y1) = bounds(&landmarks.nose);
    let (lx0, _, _, ly1) = bounds(&landmarks.left_eye);
    let (_, _, rx1, ry1) = bounds(&landmarks.right_eye);
    let left_cheek = rect_polygon(lx0, ly1 + gap * 0.4, nose_x0, nose_y1);
    let right_cheek = rect_polygon(nose_x1, ry1 + gap * 0.4, rx1, nose_y1);

    // Hair: a band above the forehead plus the temples beside it.
    let hair_bottom = brow_top - gap * 1.8;
    let hair_top = brow_top - face_height * 0.6;
    let width = jaw_x1 - jaw_x0;
    let top = rect_polygon(jaw_x0, hair_top, jaw_x1, hair_bottom);
    let left_temple = rect_polygon(jaw_x0 - width * 0.15, hair_top, jaw_x0, brow_y);
    let right_temple = rect_polygon(jaw_x1, hair_top, jaw_x1 + width * 0.15, brow_y);

    FeatureRegions {
        skin: vec![forehead, left_cheek, right_cheek],
        hair: vec![top, left_temple, right_temple],
        eyes: vec![iris(&landmarks.left_eye, 0.5), iris(&landmarks.right_eye, 0.5)],
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pipeline::services::image::PixelSampler;
    use image::{Rgba, RgbaImage};

    /// A synthetic 200x200 face: eyes at y=80, brows at y=65, jaw to y=170.
    pub(crate) fn portrait_landmarks() -> FaceLandmarks {
        let eye = |cx: f32| {
            vec![
                Point::new(cx - 10.0, 80.0),
                Point::new(cx - 4.0, 76.0),
                Point::new(cx + 4.0, 76.0),
                Point::new(cx + 10.0, 80.0),
                Point::new(cx + 4.0, 84.0),
                Point::new(cx - 4.0, 84.0),
            ]
        };
        FaceLandmarks {
            jaw: vec![
                Point::new(50.0, 80.0),
                Point::new(60.0, 140.0),
                Point::new(100.0, 170.0),
                Point::new(140.0, 140.0),
                Point::new(150.0, 80.0),
            ],
            left_eyebrow: vec![
                Point::new(60.0, 66.0),
                Point::new(75.0, 63.0),
                Point::new(88.0, 66.0),
            ],
            right_eyebrow: vec![
                Point::new(112.0, 66.0),
                Point::new(125.0, 63.0),
                Point::new(140.0, 66.0),
            ],
            left_eye: eye(75.0),
            right_eye: eye(125.0),
            nose: vec![Point::new(95.0, 90.0), Point::new(100.0, 115.0), Point::new(105.0, 90.0)],
            mouth: vec![Point::new(85.0, 140.0), Point::new(115.0, 140.0)],
        }
    }

    #[test]
    fn test_heuristic_regions_are_fractions() {
        let regions = heuristic_regions(200, 100);
        assert_eq!(
            regions.skin[0],
            SampleRegion::Rect(ImageRegion::new(60, 30, 80, 40))
        );
        assert_eq!(regions.eyes.len(), 2);
    }

    #[test]
    fn test_landmark_regions_sample_inside_image() {
        let image = RgbaImage::from_pixel(200, 200, Rgba([200, 160, 130, 255]));
        let regions = landmark_regions(&portrait_landmarks());
        let sampler = PixelSampler::default();

        for region in regions.skin.iter().chain(&regions.hair).chain(&regions.eyes) {
            assert!(!sampler.sample(&image, region).is_empty(), "{:?}", region);
        }
    }

    #[test]
    fn test_forehead_sits_above_brows() {
        let regions = landmark_regions(&portrait_landmarks());
        match &regions.skin[0] {
            SampleRegion::Polygon(points) => assert!(points.iter().all(|p| p.y < 63.0)),
            other => panic!("unexpected region {:?}", other),
        }
    }
}
