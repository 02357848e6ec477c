use crate::error::{AnalysisError, Result};
use crate::pipeline::services::clothing::ClothingConfig;
use crate::pipeline::services::color::KMeansConfig;
use crate::pipeline::services::face::FaceConfig;
use crate::pipeline::services::harmony::HarmonyConfig;
use crate::pipeline::services::image::{ImageConfig, SamplingConfig};
use crate::pipeline::services::orchestration::HistoryConfig;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Environment variables override file values, e.g.
/// `WARDROBE__CLOTHING__VISION_TIMEOUT_MS=5000`.
pub const ENV_PREFIX: &str = "WARDROBE";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub image: ImageConfig,
    pub sampling: SamplingConfig,
    pub clustering: KMeansConfig,
    pub face: FaceConfig,
    pub clothing: ClothingConfig,
    pub harmony: HarmonyConfig,
    pub history: HistoryConfig,
}

impl Configuration {
    /// Defaults, then `path` if given, then `WARDROBE__*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let configuration: Configuration = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        configuration
            .validate()
            .map_err(AnalysisError::InvalidConfiguration)?;
        Ok(configuration)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        self.image.validate()?;
        self.sampling.validate()?;
        self.clustering.validate()?;
        self.face.validate()?;
        self.clothing.validate()?;
        self.history.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::Season;

    fn write_temp(contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("wardrobe-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_are_valid() {
        let configuration = Configuration::default();
        assert!(configuration.validate().is_ok());
        assert_eq!(configuration.clothing.filename_weight, 0.4);
        assert_eq!(configuration.history.capacity, 1000);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = write_temp(
            r#"
[clustering]
k = 5
seed = 42

[harmony]
season = "winter"

[clothing]
deep_analysis = false
"#,
        );
        let configuration = Configuration::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(configuration.clustering.k, 5);
        assert_eq!(configuration.clustering.seed, Some(42));
        assert_eq!(configuration.harmony.season, Some(Season::Winter));
        assert!(!configuration.clothing.deep_analysis);
        assert_eq!(configuration.image, ImageConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let path = write_temp("[sampling]\nstride = 0\n");
        let err = Configuration::load(Some(&path)).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, AnalysisError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = Configuration::load(Some(Path::new("/nonexistent/wardrobe.toml"))).unwrap_err();
        assert!(matches!(err, AnalysisError::ConfigSource(_)));
    }
}
