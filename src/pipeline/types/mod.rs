mod clothing;
mod color;
mod facial;
mod harmony;

pub use clothing::{CategoryVote, ClothingAnalysisResult, ClothingCategory, SignalSource};
pub use color::{
    ClassifiedColor, ColorCluster, ColorFamily, ColorSample, Hsl, Intensity, Lab, RgbColor,
    SaturationLevel, Temperature,
};
pub use facial::{
    DetectionMethod, EyeColor, FacialAnalysis, FeatureColorResult, HairColor, SkinTone,
    SkinToneResult, Undertone,
};
pub use harmony::{ColorHarmonyResult, HarmonyType, Season};
