use crate::{
    config::Configuration,
    error::{AnalysisError, Result},
    pipeline::services::{
        clothing::{ClothingCategorizer, ClothingRequest, VisionService},
        color::KMeansConfig,
        face::{FacialFeatureAnalyzer, LandmarkDetector},
        harmony::HarmonyEngine,
        image::{ImageFetcher, ImageLoader, ImageSource, PixelSampler},
        orchestration::{
            AnalysisHistory, AnalysisKind, AnalysisObserver, AnalysisRecord, MetricsCollector,
            MetricsSummary,
        },
    },
    pipeline::types::{
        ClothingAnalysisResult, ColorHarmonyResult, DetectionMethod, FacialAnalysis, SignalSource,
    },
};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Composition root. Owns every analyzer and the shared history; the host
/// builds one and passes it around by reference.
pub struct Coordinator {
    configuration: Configuration,
    face: FacialFeatureAnalyzer,
    clothing: ClothingCategorizer,
    harmony: HarmonyEngine,
    history: AnalysisHistory,
    metrics: Mutex<MetricsCollector>,
}

impl Coordinator {
    pub fn builder(configuration: Configuration) -> CoordinatorBuilder {
        CoordinatorBuilder::new(configuration)
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    fn record(&self, record: AnalysisRecord) {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .notify(&record);
    }

    #[instrument(skip(self, source))]
    pub async fn analyze_face(&self, source: ImageSource) -> Result<FacialAnalysis> {
        let started = Instant::now();
        let analysis = self.face.analyze(source).await.inspect_err(|e| {
            warn!("Facial analysis aborted: {}", e);
        })?;

        let method = match analysis.method {
            DetectionMethod::Landmarks => "landmarks",
            DetectionMethod::Heuristic => "heuristic",
            DetectionMethod::Fallback => "fallback",
        };
        self.record(
            AnalysisRecord::new(
                AnalysisKind::Facial,
                analysis.overall_confidence,
                method,
                started.elapsed(),
            )
            .with_fallback(analysis.method == DetectionMethod::Fallback),
        );
        Ok(analysis)
    }

    #[instrument(skip(self, request), fields(filename = ?request.filename))]
    pub async fn categorize_clothing(
        &self,
        request: ClothingRequest,
    ) -> Result<ClothingAnalysisResult> {
        let started = Instant::now();
        let outcome = self
            .clothing
            .categorize_with_evidence(request)
            .await
            .inspect_err(|e| warn!("Clothing analysis aborted: {}", e))?;

        let method = if outcome
            .votes
            .iter()
            .any(|v| v.source == SignalSource::ExternalVision)
        {
            "vision"
        } else {
            "heuristic"
        };
        self.record(
            AnalysisRecord::new(
                AnalysisKind::Clothing,
                outcome.result.confidence,
                method,
                started.elapsed(),
            )
            .with_fallback(outcome.used_fallback || outcome.vision_error.is_some()),
        );
        Ok(outcome.result)
    }

    #[instrument(skip(self))]
    pub fn analyze_harmony(&self, colors_a: &[String], colors_b: &[String]) -> ColorHarmonyResult {
        let started = Instant::now();
        let result = self.harmony.analyze_harmony(colors_a, colors_b);
        self.record_harmony(&result, started);
        result
    }

    #[instrument(skip(self))]
    pub fn find_best_harmony(&self, colors: &[String]) -> ColorHarmonyResult {
        let started = Instant::now();
        let result = self.harmony.find_best_harmony(colors);
        self.record_harmony(&result, started);
        result
    }

    fn record_harmony(&self, result: &ColorHarmonyResult, started: Instant) {
        self.record(
            AnalysisRecord::new(
                AnalysisKind::Harmony,
                result.confidence,
                result.harmony_type.as_str(),
                started.elapsed(),
            )
            .with_fallback(!result.is_harmonious),
        );
    }

    pub fn history(&self) -> &AnalysisHistory {
        &self.history
    }

    pub fn summary(&self) -> MetricsSummary {
        self.history.summary()
    }

    /// Drops aged records. The host decides when to call this.
    pub fn prune_history(&self, now: DateTime<Utc>) -> usize {
        let removed = self.history.prune(now);
        if removed > 0 {
            info!("Pruned {} analysis records", removed);
        }
        removed
    }
}

pub struct CoordinatorBuilder {
    configuration: Configuration,
    detector: Option<Arc<dyn LandmarkDetector>>,
    vision: Option<Arc<dyn VisionService>>,
    fetcher: Option<Arc<dyn ImageFetcher>>,
    observers: Vec<Box<dyn AnalysisObserver>>,
}

impl CoordinatorBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            detector: None,
            vision: None,
            fetcher: None,
            observers: Vec::new(),
        }
    }

    pub fn with_landmark_detector(mut self, detector: Arc<dyn LandmarkDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_vision_service(mut self, service: Arc<dyn VisionService>) -> Self {
        self.vision = Some(service);
        self
    }

    // Needed for `ImageSource::Url`; without it URL sources fail to load.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn AnalysisObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn build(self) -> Result<Coordinator> {
        let configuration = self.configuration;
        configuration
            .validate()
            .map_err(AnalysisError::InvalidConfiguration)?;

        let mut loader = ImageLoader::new(configuration.image.clone());
        if let Some(fetcher) = self.fetcher {
            loader = loader.with_fetcher(fetcher);
        }
        let sampler = PixelSampler::new(configuration.sampling);
        let clustering: KMeansConfig = configuration.clustering;

        let face = FacialFeatureAnalyzer::new(
            configuration.face.clone(),
            sampler,
            clustering,
            loader.clone(),
            self.detector,
        );
        let mut clothing = ClothingCategorizer::new(
            configuration.clothing.clone(),
            sampler,
            clustering,
            loader,
        );
        if let Some(vision) = self.vision {
            clothing = clothing.with_vision_service(vision);
        }

        let history = AnalysisHistory::new(configuration.history.clone());
        let metrics = self
            .observers
            .into_iter()
            .fold(
                MetricsCollector::new().add_observer(Box::new(history.clone())),
                MetricsCollector::add_observer,
            );

        info!(
            "Coordinator ready: face strategies {:?}",
            face.strategies()
        );
        Ok(Coordinator {
            harmony: HarmonyEngine::new(configuration.harmony.clone()),
            configuration,
            face,
            clothing,
            history,
            metrics: Mutex::new(metrics),
        })
    }
}
