pub mod classifier;
pub mod clustering;
pub mod conversion;

pub use classifier::{
    classify_color, is_neutral_name, is_skin_tone, named_color, resolve_color, NamedColor,
    NAMED_COLORS,
};
pub use clustering::{cluster, dominant_color, ColorSpace, Initialization, KMeansConfig};
pub use conversion::{
    hex_to_rgb, hsl_to_rgb, lab_to_rgb, parse_hex, rgb_to_hex, rgb_to_hsl, rgb_to_lab,
};
