//! Small k-means over sampled pixels. Runs the full iteration budget, there
//! is no convergence check.

use super::conversion::rgb_to_lab;
use crate::pipeline::types::{ColorCluster, ColorSample, Lab, RgbColor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    Rgb,
    Lab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initialization {
    /// k samples drawn at random.
    Random,
    /// First sample, then repeatedly the sample farthest from all chosen
    /// centroids. Deterministic.
    FarthestPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct KMeansConfig {
    pub k: usize,
    pub max_iterations: usize,
    pub space: ColorSpace,
    pub init: Initialization,
    /// Fixed RNG seed for reproducible runs; entropy-seeded when unset.
    pub seed: Option<u64>,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 3,
            max_iterations: 12,
            space: ColorSpace::Rgb,
            init: Initialization::Random,
            seed: None,
        }
    }
}

impl KMeansConfig {
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_space(mut self, space: ColorSpace) -> Self {
        self.space = space;
        self
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.k == 0 {
            return Err("Cluster count must be greater than 0".to_string());
        }
        if !(1..=50).contains(&self.max_iterations) {
            return Err("Clustering iterations must be between 1 and 50".to_string());
        }
        Ok(())
    }
}

/// Point in the distance space used for assignment.
#[derive(Debug, Clone, Copy)]
struct Point([f32; 3]);

impl Point {
    fn of(color: RgbColor, space: ColorSpace) -> Self {
        match space {
            ColorSpace::Rgb => Point(color.channels()),
            ColorSpace::Lab => {
                let Lab { l, a, b } = rgb_to_lab(color);
                Point([l, a, b])
            }
        }
    }

    fn distance_sq(&self, other: &Point) -> f32 {
        (0..3).map(|i| (self.0[i] - other.0[i]).powi(2)).sum()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    point: [f32; 3],
    rgb: [f32; 3],
    weight: f32,
    count: usize,
}

/// Clusters `samples` and returns non-empty clusters ordered by descending
/// weighted mass. A cluster's color is the weighted RGB mean of its members.
pub fn cluster<R: Rng + ?Sized>(
    samples: &[ColorSample],
    config: &KMeansConfig,
    rng: &mut R,
) -> Vec<ColorCluster> {
    if samples.is_empty() || config.k == 0 {
        return Vec::new();
    }

    let points: Vec<Point> = samples
        .iter()
        .map(|s| Point::of(s.color, config.space))
        .collect();
    let k = config.k.min(samples.len());

    let mut centroids = match config.init {
        Initialization::Random => (0..k)
            .map(|_| points[rng.random_range(0..points.len())])
            .collect::<Vec<_>>(),
        Initialization::FarthestPoint => farthest_point_init(&points, k),
    };

    let mut accumulators = vec![Accumulator::default(); k];
    for _ in 0..config.max_iterations.max(1) {
        accumulators = assign(samples, &points, &centroids);
        for (centroid, acc) in centroids.iter_mut().zip(&accumulators) {
            // Empty clusters keep their previous position with zero mass.
            if acc.weight > 0.0 {
                *centroid = Point(acc.point.map(|v| v / acc.weight));
            }
        }
    }

    let mut clusters: Vec<ColorCluster> = accumulators
        .iter()
        .filter(|acc| acc.count > 0 && acc.weight > 0.0)
        .map(|acc| {
            let [r, g, b] = acc.rgb.map(|v| (v / acc.weight).round().clamp(0.0, 255.0) as u8);
            ColorCluster {
                color: RgbColor::new(r, g, b),
                count: acc.count,
                weighted_count: acc.weight,
            }
        })
        .collect();

    clusters.sort_by(|a, b| b.weighted_count.total_cmp(&a.weighted_count));
    clusters
}

/// Centroid of the heaviest cluster.
pub fn dominant_color<R: Rng + ?Sized>(
    samples: &[ColorSample],
    config: &KMeansConfig,
    rng: &mut R,
) -> Option<ColorCluster> {
    cluster(samples, config, rng).into_iter().next()
}

fn assign(samples: &[ColorSample], points: &[Point], centroids: &[Point]) -> Vec<Accumulator> {
    let mut accumulators = vec![Accumulator::default(); centroids.len()];

    for (sample, point) in samples.iter().zip(points) {
        let nearest = centroids
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| point.distance_sq(a).total_cmp(&point.distance_sq(b)))
            .map(|(i, _)| i)
            .unwrap_or(0);

        let weight = sample.weight.max(0.0);
        let acc = &mut accumulators[nearest];
        for i in 0..3 {
            acc.point[i] += point.0[i] * weight;
        }
        let channels = sample.color.channels();
        for i in 0..3 {
            acc.rgb[i] += channels[i] * weight;
        }
        acc.weight += weight;
        acc.count += 1;
    }

    accumulators
}

fn farthest_point_init(points: &[Point], k: usize) -> Vec<Point> {
    let mut centroids = vec![points[0]];
    while centroids.len() < k {
        let next = points
            .iter()
            .max_by(|a, b| {
                let da = nearest_distance(a, &centroids);
                let db = nearest_distance(b, &centroids);
                da.total_cmp(&db)
            })
            .copied()
            .unwrap_or(points[0]);
        centroids.push(next);
    }
    centroids
}

fn nearest_distance(point: &Point, centroids: &[Point]) -> f32 {
    centroids
        .iter()
        .map(|c| point.distance_sq(c))
        .fold(f32::MAX, f32::min)
}
