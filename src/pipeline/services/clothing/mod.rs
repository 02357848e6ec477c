pub mod categorizer;
pub mod filename;
pub mod palette;
pub mod shape;
pub mod texture;
pub mod vision;

pub use categorizer::{
    aggregate_votes, decide, ClothingCategorizer, ClothingConfig, ClothingOutcome,
    ClothingRequest,
};
pub use filename::{context_hint_vote, filename_vote, score_keywords};
pub use palette::{filter_background, filename_colors, PaletteExtractor, FALLBACK_COLOR};
pub use shape::{shape_scores, ShapeProfile};
pub use texture::TextureFeatures;
pub use vision::{VisionPayload, VisionService, VisionVerdict};
