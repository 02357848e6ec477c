pub mod analyzer;
pub mod features;
pub mod landmarks;
pub mod lighting;
pub mod regions;

pub use analyzer::{color_season, default_analysis, FaceConfig, FacialFeatureAnalyzer};
pub use features::FeatureThresholds;
pub use landmarks::{FaceLandmarks, LandmarkDetector, LandmarkService};
pub use lighting::{LightingAnalysis, LightingCondition, LightingCorrection, LightingThresholds};
