pub mod loader;
pub mod sampler;

pub use loader::{DecodeService, ImageConfig, ImageFetcher, ImageLoader, ImageSource, LoadedImage};
pub use sampler::{
    point_in_polygon, ImageRegion, PixelSampler, Point, SampleRegion, SamplingConfig,
};
