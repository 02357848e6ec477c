use crate::error::{AnalysisError, Result};
use crate::pipeline::types::{CategoryVote, ClothingCategory, SignalSource};
use async_trait::async_trait;
use image::RgbaImage;
use serde::Deserialize;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tower::Service;

/// External clothing categorization model. Responses are loosely shaped
/// JSON and are validated before use.
#[async_trait]
pub trait VisionService: Send + Sync {
    async fn analyze(&self, image: &RgbaImage, filename: Option<&str>)
        -> Result<serde_json::Value>;
}

/// Expected response shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionPayload {
    pub is_clothing: bool,
    pub category: String,
    pub confidence: f32,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A payload that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionVerdict {
    pub is_clothing: bool,
    pub category: ClothingCategory,
    pub confidence: f32,
    pub colors: Vec<String>,
    pub style: Option<String>,
    pub reasoning: String,
    pub tags: Vec<String>,
}

impl VisionVerdict {
    pub fn vote(&self) -> Option<CategoryVote> {
        if !self.is_clothing {
            return None;
        }
        Some(CategoryVote::new(
            SignalSource::ExternalVision,
            self.category,
            self.confidence,
            self.reasoning.clone(),
        ))
    }
}

fn malformed(detail: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::CapabilityUnavailable(format!("malformed vision response: {}", detail))
}

impl TryFrom<serde_json::Value> for VisionVerdict {
    type Error = AnalysisError;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        let payload: VisionPayload = serde_json::from_value(value).map_err(malformed)?;

        if !(0.0..=1.0).contains(&payload.confidence) {
            return Err(malformed(format!("confidence {}", payload.confidence)));
        }
        let category = ClothingCategory::parse(&payload.category)
            .ok_or_else(|| malformed(format!("unknown category '{}'", payload.category)))?;
        if category == ClothingCategory::Other && payload.is_clothing {
            return Err(malformed("'other' reported for a clothing item"));
        }

        Ok(Self {
            is_clothing: payload.is_clothing,
            category,
            confidence: payload.confidence,
            colors: payload
                .colors
                .into_iter()
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect(),
            style: payload.style.filter(|s| !s.trim().is_empty()),
            reasoning: payload
                .reasoning
                .unwrap_or_else(|| format!("vision model reported {}", category)),
            tags: payload.tags,
        })
    }
}

#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub image: Arc<RgbaImage>,
    pub filename: Option<String>,
}

/// Tower adapter that also validates the payload.
#[derive(Clone)]
pub struct VisionCapability {
    service: Arc<dyn VisionService>,
}

impl VisionCapability {
    pub fn new(service: Arc<dyn VisionService>) -> Self {
        Self { service }
    }
}

impl Service<VisionRequest> for VisionCapability {
    type Response = VisionVerdict;
    type Error = AnalysisError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: VisionRequest) -> Self::Future {
        let service = Arc::clone(&self.service);
        Box::pin(async move {
            let value = service
                .analyze(&request.image, request.filename.as_deref())
                .await?;
            VisionVerdict::try_from(value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tower::ServiceExt;

    struct Canned(serde_json::Value);

    #[async_trait]
    impl VisionService for Canned {
        async fn analyze(
            &self,
            _image: &RgbaImage,
            _filename: Option<&str>,
        ) -> Result<serde_json::Value> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_valid_payload() {
        let verdict = VisionVerdict::try_from(json!({
            "isClothing": true,
            "category": "Dresses",
            "confidence": 0.82,
            "colors": [" Navy ", ""],
            "tags": ["midi"]
        }))
        .unwrap();
        assert_eq!(verdict.category, ClothingCategory::Dresses);
        assert_eq!(verdict.colors, vec!["navy"]);
        let vote = verdict.vote().unwrap();
        assert_eq!(vote.source, SignalSource::ExternalVision);
    }

    #[test]
    fn test_malformed_payloads_are_rejected() {
        let cases = [
            json!(null),
            json!({"category": "tops", "confidence": 0.5}),
            json!({"isClothing": true, "category": "spacesuit", "confidence": 0.5}),
            json!({"isClothing": true, "category": "tops", "confidence": 1.4}),
            json!({"isClothing": true, "category": "other", "confidence": 0.9}),
        ];
        for case in cases {
            let err = VisionVerdict::try_from(case.clone()).unwrap_err();
            assert!(
                matches!(err, AnalysisError::CapabilityUnavailable(_)),
                "{case}"
            );
        }
    }

    #[test]
    fn test_non_clothing_has_no_vote() {
        let verdict = VisionVerdict::try_from(json!({
            "isClothing": false,
            "category": "other",
            "confidence": 0.9
        }))
        .unwrap();
        assert!(verdict.vote().is_none());
    }

    #[tokio::test]
    async fn test_service_validates() {
        let capability = VisionCapability::new(Arc::new(Canned(json!({"oops": 1}))));
        let request = VisionRequest {
            image: Arc::new(RgbaImage::new(2, 2)),
            filename: None,
        };
        assert!(capability.oneshot(request).await.is_err());
    }
}
