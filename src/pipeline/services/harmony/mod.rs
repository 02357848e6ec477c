pub mod engine;
pub mod rules;

pub use engine::{HarmonyConfig, HarmonyEngine};
pub use rules::season_palette;
