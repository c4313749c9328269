use anyhow::anyhow;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use plant_diagnosis::{
    ClassificationResult, ClassificationSource, DiagnosisError, Result, SourceKind,
};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ClassifierConfig;

pub const BELOW_THRESHOLD: &str = "confidence below threshold";

/// Hosted Roboflow classification model
pub struct RoboflowClassifier {
    client: Client,
    config: ClassifierConfig,
}

impl RoboflowClassifier {
    pub fn new(config: ClassifierConfig, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.config.base_url, self.config.model_id)
    }

    async fn request(&self, image: &[u8]) -> anyhow::Result<RoboflowResponse> {
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("api_key", self.config.api_key.as_str())])
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(STANDARD.encode(image))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("classifier request failed: {}", response.status()));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ClassificationSource for RoboflowClassifier {
    fn id(&self) -> &str {
        "roboflow"
    }

    async fn classify(&self, image: &[u8]) -> Result<ClassificationResult> {
        debug!(model_id = %self.config.model_id, bytes = image.len(), "Calling classifier");

        let response = self
            .request(image)
            .await
            .map_err(|e| DiagnosisError::unavailable(SourceKind::Classification, e.to_string()))?;

        let result = response.into_classification(self.config.min_confidence);
        info!(
            success = result.success,
            plant_name = %result.plant_name,
            confidence = result.confidence,
            "Classifier answered"
        );
        Ok(result)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoboflowPrediction {
    #[serde(rename = "class")]
    pub label: String,
    pub confidence: f64,
}

/// Single-label classification response. `top` is absent on some model versions,
/// in which case the best entry of `predictions` decides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoboflowResponse {
    pub top: Option<String>,
    pub confidence: Option<f64>,
    pub predictions: Vec<RoboflowPrediction>,
}

impl RoboflowResponse {
    fn best(&self) -> Option<(String, f64)> {
        if let Some(top) = self.top.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let confidence = self.confidence.or_else(|| {
                self.predictions
                    .iter()
                    .find(|p| p.label == top)
                    .map(|p| p.confidence)
            });
            return Some((top.to_string(), confidence.unwrap_or(0.0)));
        }

        self.predictions
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .map(|p| (p.label.clone(), p.confidence))
    }

    pub fn into_classification(self, min_confidence: f64) -> ClassificationResult {
        match self.best() {
            None => ClassificationResult::failed("no prediction returned"),
            Some((plant_name, confidence)) if confidence < min_confidence => {
                ClassificationResult {
                    success: false,
                    plant_name,
                    confidence,
                    error: Some(BELOW_THRESHOLD.to_string()),
                }
            }
            Some((plant_name, confidence)) => {
                ClassificationResult::identified(plant_name, confidence)
            }
        }
    }
}
