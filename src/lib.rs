//! Color and category classification for wardrobe photos: clothing
//! category votes, garment palettes, skin/hair/eye color detection and
//! color-harmony scoring.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod pipeline;

pub use config::Configuration;
pub use coordinator::{Coordinator, CoordinatorBuilder};
pub use error::{AnalysisError, Result};

pub use pipeline::services::clothing::{ClothingRequest, VisionService};
pub use pipeline::services::face::{FaceLandmarks, LandmarkDetector};
pub use pipeline::services::image::{ImageFetcher, ImageSource};
pub use pipeline::types::{
    ClothingAnalysisResult, ClothingCategory, ColorHarmonyResult, FacialAnalysis, HarmonyType,
    Season,
};

use tracing::Level;

/// Installs a fmt subscriber. Safe to call more than once; later calls are
/// ignored.
pub fn init_logging(level: Level) {
    let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
}
