use crate::error::{AnalysisError, Result};
use crate::pipeline::services::image::Point;
use async_trait::async_trait;
use image::RgbaImage;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tower::Service;

/// Named 2D point groups outlining one face, in image pixel coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceLandmarks {
    pub jaw: Vec<Point>,
    pub left_eyebrow: Vec<Point>,
    pub right_eyebrow: Vec<Point>,
    pub left_eye: Vec<Point>,
    pub right_eye: Vec<Point>,
    pub nose: Vec<Point>,
    pub mouth: Vec<Point>,
}

impl FaceLandmarks {
    /// Enough points to derive every sampling region.
    pub fn is_usable(&self) -> bool {
        self.jaw.len() >= 3
            && !self.left_eyebrow.is_empty()
            && !self.right_eyebrow.is_empty()
            && self.left_eye.len() >= 3
            && self.right_eye.len() >= 3
            && !self.nose.is_empty()
    }
}

/// External face-landmark model. `Ok(None)` means no face was found;
/// `Err` means the model itself is unavailable.
#[async_trait]
pub trait LandmarkDetector: Send + Sync {
    async fn detect(&self, image: &RgbaImage) -> Result<Option<FaceLandmarks>>;
}

/// Tower adapter so detector calls can be wrapped with a timeout.
#[derive(Clone)]
pub struct LandmarkService {
    detector: Arc<dyn LandmarkDetector>,
}

impl LandmarkService {
    pub fn new(detector: Arc<dyn LandmarkDetector>) -> Self {
        Self { detector }
    }
}

impl Service<Arc<RgbaImage>> for LandmarkService {
    type Response = FaceLandmarks;
    type Error = AnalysisError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, image: Arc<RgbaImage>) -> Self::Future {
        let detector = Arc::clone(&self.detector);
        Box::pin(async move {
            match detector.detect(&image).await? {
                Some(landmarks) if landmarks.is_usable() => Ok(landmarks),
                Some(_) => Err(AnalysisError::CapabilityUnavailable(
                    "landmark set is incomplete".to_string(),
                )),
                None => Err(AnalysisError::NoFaceDetected),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    struct NoFace;

    #[async_trait]
    impl LandmarkDetector for NoFace {
        async fn detect(&self, _image: &RgbaImage) -> Result<Option<FaceLandmarks>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_missing_face_maps_to_error() {
        let service = LandmarkService::new(Arc::new(NoFace));
        let err = service
            .oneshot(Arc::new(RgbaImage::new(4, 4)))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::NoFaceDetected));
    }

    #[test]
    fn test_usable_requires_core_groups() {
        let landmarks = FaceLandmarks {
            nose: vec![Point::new(10.0, 20.0)],
            ..FaceLandmarks::default()
        };
        assert!(!landmarks.is_usable());
    }
}
