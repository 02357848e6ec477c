use crate::pipeline::types::{ColorSample, RgbColor};
use image::RgbaImage;
use serde::Deserialize;

/// Rectangular region of an image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ImageRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn full_image(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Region given as fractions of the image size, e.g. `(0.3, 0.3, 0.7, 0.7)`
    /// for the central 40% square.
    pub fn from_fractions(width: u32, height: u32, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        let px = |f: f32, total: u32| (f.clamp(0.0, 1.0) * total as f32).round() as u32;
        let (left, top) = (px(x0, width), px(y0, height));
        let (right, bottom) = (px(x1, width), px(y1, height));
        Self::new(
            left,
            top,
            right.saturating_sub(left),
            bottom.saturating_sub(top),
        )
    }

    /// Builds a region from float bounds, clipped to `width` x `height`.
    /// Returns `None` when nothing is left after clipping.
    pub fn from_bounds(
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        width: u32,
        height: u32,
    ) -> Option<Self> {
        let left = x0.min(x1).max(0.0).floor() as u32;
        let top = y0.min(y1).max(0.0).floor() as u32;
        let right = (x0.max(x1).ceil().max(0.0) as u32).min(width);
        let bottom = (y0.max(y1).ceil().max(0.0) as u32).min(height);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Self::new(left, top, right - left, bottom - top))
    }

    pub fn clip(&self, width: u32, height: u32) -> Option<Self> {
        let right = self.x.saturating_add(self.width).min(width);
        let bottom = self.y.saturating_add(self.height).min(height);
        if right <= self.x || bottom <= self.y {
            return None;
        }
        Some(Self::new(self.x, self.y, right - self.x, bottom - self.y))
    }

    pub fn contains_point(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SampleRegion {
    Rect(ImageRegion),
    Polygon(Vec<Point>),
}

impl SampleRegion {
    fn clipped_bounds(&self, width: u32, height: u32) -> Option<ImageRegion> {
        match self {
            SampleRegion::Rect(region) => region.clip(width, height),
            SampleRegion::Polygon(points) if points.len() >= 3 => {
                let (mut x0, mut y0) = (f32::MAX, f32::MAX);
                let (mut x1, mut y1) = (f32::MIN, f32::MIN);
                for p in points {
                    x0 = x0.min(p.x);
                    y0 = y0.min(p.y);
                    x1 = x1.max(p.x);
                    y1 = y1.max(p.y);
                }
                ImageRegion::from_bounds(x0, y0, x1, y1, width, height)
            }
            SampleRegion::Polygon(_) => None,
        }
    }

    fn contains(&self, x: f32, y: f32) -> bool {
        match self {
            SampleRegion::Rect(_) => true,
            SampleRegion::Polygon(points) => point_in_polygon(Point::new(x, y), points),
        }
    }
}

/// Ray casting: counts edge crossings of a horizontal ray from `p`.
pub fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Keep every `stride`-th pixel in row-major order.
    pub stride: usize,
    pub min_alpha: u8,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            stride: 4,
            min_alpha: 128,
        }
    }
}

impl SamplingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.stride == 0 {
            return Err("Sample stride must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PixelSampler {
    config: SamplingConfig,
}

impl PixelSampler {
    pub fn new(config: SamplingConfig) -> Self {
        Self { config }
    }

    /// Samples `region` of `image`, skipping translucent pixels. Empty when
    /// the region lies outside the image.
    pub fn sample(&self, image: &RgbaImage, region: &SampleRegion) -> Vec<ColorSample> {
        let (width, height) = image.dimensions();
        let Some(bounds) = region.clipped_bounds(width, height) else {
            return Vec::new();
        };

        let stride = self.config.stride.max(1);
        let mut samples = Vec::with_capacity(bounds.area() as usize / stride + 1);
        let mut index = 0usize;

        for y in bounds.y..bounds.y + bounds.height {
            for x in bounds.x..bounds.x + bounds.width {
                let take = index % stride == 0;
                index += 1;
                if !take || !region.contains(x as f32 + 0.5, y as f32 + 0.5) {
                    continue;
                }
                let [r, g, b, a] = image.get_pixel(x, y).0;
                if a < self.config.min_alpha {
                    continue;
                }
                samples.push(ColorSample::from(RgbColor::new(r, g, b)));
            }
        }

        samples
    }

    pub fn sample_all(&self, image: &RgbaImage) -> Vec<ColorSample> {
        let (w, h) = image.dimensions();
        self.sample(image, &SampleRegion::Rect(ImageRegion::full_image(w, h)))
    }
}

impl Default for PixelSampler {
    fn default() -> Self {
        Self::new(SamplingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
        ImageBuffer::from_pixel(w, h, Rgba(px))
    }

    #[test]
    fn test_stride_keeps_every_fourth_pixel() {
        let image = solid(8, 8, [10, 20, 30, 255]);
        let samples = PixelSampler::default().sample_all(&image);
        assert_eq!(samples.len(), 16);
        assert!(samples.iter().all(|s| s.color == RgbColor::new(10, 20, 30)));
    }

    #[test]
    fn test_translucent_pixels_dropped() {
        let image = solid(8, 8, [10, 20, 30, 100]);
        assert!(PixelSampler::default().sample_all(&image).is_empty());
    }

    #[test]
    fn test_region_clipped_to_bounds() {
        let image = solid(10, 10, [1, 2, 3, 255]);
        let sampler = PixelSampler::new(SamplingConfig {
            stride: 1,
            min_alpha: 128,
        });
        let samples = sampler.sample(&image, &SampleRegion::Rect(ImageRegion::new(8, 8, 10, 10)));
        assert_eq!(samples.len(), 4);

        let outside = sampler.sample(&image, &SampleRegion::Rect(ImageRegion::new(20, 20, 5, 5)));
        assert!(outside.is_empty());
    }

    #[test]
    fn test_polygon_sampling() {
        let image: RgbaImage = ImageBuffer::from_fn(20, 20, |x, _| {
            if x < 10 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let sampler = PixelSampler::new(SamplingConfig {
            stride: 1,
            min_alpha: 128,
        });
        let left_triangle = SampleRegion::Polygon(vec![
            Point::new(0.0, 0.0),
            Point::new(9.0, 10.0),
            Point::new(0.0, 20.0),
        ]);
        let samples = sampler.sample(&image, &left_triangle);
        assert!(!samples.is_empty());
        assert!(samples.iter().all(|s| s.color == RgbColor::new(255, 0, 0)));
    }

    #[test]
    fn test_degenerate_polygon_is_empty() {
        let image = solid(10, 10, [1, 2, 3, 255]);
        let line = SampleRegion::Polygon(vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)]);
        assert!(PixelSampler::default().sample(&image, &line).is_empty());
    }

    #[test]
    fn test_point_in_polygon() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        assert!(point_in_polygon(Point::new(2.0, 2.0), &square));
        assert!(!point_in_polygon(Point::new(5.0, 2.0), &square));
    }

    #[test]
    fn test_fractional_regions() {
        let region = ImageRegion::from_fractions(100, 200, 0.3, 0.3, 0.7, 0.7);
        assert_eq!(region, ImageRegion::new(30, 60, 40, 80));
        assert!(ImageRegion::from_bounds(-10.0, -10.0, -1.0, -1.0, 50, 50).is_none());
        assert_eq!(
            ImageRegion::from_bounds(-5.0, 2.0, 10.0, 8.0, 50, 50),
            Some(ImageRegion::new(0, 2, 10, 6))
        );
    }
}
