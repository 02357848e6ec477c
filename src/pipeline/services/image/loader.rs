use crate::error::{AnalysisError, Result};
use crate::pipeline::services::orchestration::capability::call_with_timeout;
use async_trait::async_trait;
use image::{imageops::FilterType, DynamicImage, RgbaImage};
use serde::Deserialize;
use std::{
    future::Future,
    path::PathBuf,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};
use tower::Service;
use tracing::debug;

/// Where an image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
    Url(String),
    Decoded(DynamicImage),
}

/// Fetches remote images. Owned by the host's network layer.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Longest side after downscaling.
    pub max_dimension: u32,
    pub load_timeout_ms: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_dimension: 400,
            load_timeout_ms: 10_000,
        }
    }
}

impl ImageConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_dimension < 16 {
            return Err("Max image dimension must be at least 16".to_string());
        }
        if self.load_timeout_ms == 0 {
            return Err("Image load timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// A decoded, downscaled image ready for sampling.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixels: Arc<RgbaImage>,
    /// Dimensions before downscaling.
    pub original_dimensions: (u32, u32),
}

impl LoadedImage {
    pub fn from_dynamic(image: DynamicImage, max_dimension: u32) -> Self {
        let original_dimensions = (image.width(), image.height());
        let image = if image.width().max(image.height()) > max_dimension {
            image.resize(max_dimension, max_dimension, FilterType::Triangle)
        } else {
            image
        };
        Self {
            pixels: Arc::new(image.to_rgba8()),
            original_dimensions,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn aspect_ratio(&self) -> f32 {
        let (w, h) = self.original_dimensions;
        w as f32 / h.max(1) as f32
    }

    pub fn pixel_count(&self) -> u64 {
        self.original_dimensions.0 as u64 * self.original_dimensions.1 as u64
    }
}

/// Decodes an [`ImageSource`] off the async runtime.
#[derive(Clone)]
pub struct DecodeService {
    fetcher: Option<Arc<dyn ImageFetcher>>,
}

impl DecodeService {
    pub fn new(fetcher: Option<Arc<dyn ImageFetcher>>) -> Self {
        Self { fetcher }
    }
}

async fn decode_blocking<F>(decode: F) -> Result<DynamicImage>
where
    F: FnOnce() -> image::ImageResult<DynamicImage> + Send + 'static,
{
    tokio::task::spawn_blocking(decode)
        .await
        .map_err(|e| AnalysisError::LoadError(format!("decoder task failed: {}", e)))?
        .map_err(|e| AnalysisError::LoadError(e.to_string()))
}

impl Service<ImageSource> for DecodeService {
    type Response = DynamicImage;
    type Error = AnalysisError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, source: ImageSource) -> Self::Future {
        let fetcher = self.fetcher.clone();
        Box::pin(async move {
            match source {
                ImageSource::Decoded(image) => Ok(image),
                ImageSource::Path(path) => decode_blocking(move || image::open(path)).await,
                ImageSource::Bytes(bytes) => {
                    decode_blocking(move || image::load_from_memory(&bytes)).await
                }
                ImageSource::Url(url) => {
                    let fetcher = fetcher.ok_or_else(|| {
                        AnalysisError::LoadError(format!("no image fetcher for {}", url))
                    })?;
                    let bytes = fetcher.fetch(&url).await.map_err(|e| match e {
                        AnalysisError::Timeout { .. } | AnalysisError::LoadError(_) => e,
                        other => AnalysisError::LoadError(other.to_string()),
                    })?;
                    decode_blocking(move || image::load_from_memory(&bytes)).await
                }
            }
        })
    }
}

/// Acquires images with a load budget and normalises their size.
#[derive(Clone)]
pub struct ImageLoader {
    config: ImageConfig,
    decoder: DecodeService,
}

impl ImageLoader {
    pub fn new(config: ImageConfig) -> Self {
        Self {
            config,
            decoder: DecodeService::new(None),
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.decoder = DecodeService::new(Some(fetcher));
        self
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    pub async fn load(&self, source: ImageSource) -> Result<LoadedImage> {
        let budget = Duration::from_millis(self.config.load_timeout_ms);
        let image = call_with_timeout(self.decoder.clone(), source, "image load", budget).await?;

        if image.width() == 0 || image.height() == 0 {
            return Err(AnalysisError::LoadError("image has no pixels".to_string()));
        }

        let loaded = LoadedImage::from_dynamic(image, self.config.max_dimension);
        debug!(
            "Loaded image {:?} -> {:?}",
            loaded.original_dimensions,
            loaded.dimensions()
        );
        Ok(loaded)
    }
}
