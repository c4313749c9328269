use anyhow::anyhow;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use plant_diagnosis::{
    AdviceBlock, DiagnosisError, DiseaseInfo, DiseaseReport, DiseaseSource, Result, SourceKind,
    null_as_default,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DiseaseServiceConfig;

/// HTTP client for the disease-detection and advice service
pub struct DiseaseServiceClient {
    client: Client,
    config: DiseaseServiceConfig,
}

impl DiseaseServiceClient {
    pub fn new(config: DiseaseServiceConfig, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }

    async fn request(&self, image: &[u8]) -> anyhow::Result<DiseaseServiceResponse> {
        let mut request = self
            .client
            .post(&self.config.url)
            .header("Content-Type", "application/json")
            .json(&json!({ "image": STANDARD.encode(image) }));

        if let Some(api_key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "disease service request failed: {}",
                response.status()
            ));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl DiseaseSource for DiseaseServiceClient {
    fn id(&self) -> &str {
        "disease_service"
    }

    async fn diagnose(&self, image: &[u8]) -> Result<DiseaseReport> {
        debug!(url = %self.config.url, bytes = image.len(), "Calling disease service");

        let response = self.request(image).await.map_err(|e| {
            DiagnosisError::unavailable(SourceKind::DiseaseDetection, e.to_string())
        })?;

        let report = DiseaseReport::from(response);
        info!(
            disease_detected = report.disease.disease_detected,
            disease_name = %report.disease.disease_name,
            "Disease service answered"
        );
        Ok(report)
    }
}

/// `confidence` arrives either as a bare score or as a breakdown object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireConfidence {
    Score(f64),
    Detailed {
        #[serde(default)]
        disease_detection: Option<f64>,
        #[serde(default)]
        overall: Option<f64>,
        #[serde(default)]
        calculation_method: Option<String>,
    },
}

/// Structured model treatments, either `{"combined_treatments": [...]}` or a bare list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireTreatments {
    Combined {
        #[serde(default, deserialize_with = "null_as_default")]
        combined_treatments: Vec<String>,
        #[serde(default, deserialize_with = "null_as_default")]
        prevention_tips: Vec<String>,
    },
    List(Vec<String>),
}

/// Wire shape of the disease service. Every field is optional; the verdict may be
/// nested under `disease_info` or flattened onto the top level. Explicit `null`s read
/// as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiseaseServiceResponse {
    #[serde(alias = "disease")]
    pub disease_info: Option<DiseaseInfo>,
    pub disease_detected: Option<bool>,
    pub disease_name: Option<String>,
    pub severity: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub symptoms: Vec<String>,
    pub disease_type: Option<String>,
    pub confidence: Option<WireConfidence>,
    #[serde(deserialize_with = "null_as_default")]
    pub llm_advice: AdviceBlock,
    #[serde(deserialize_with = "null_as_default")]
    pub model_advice: AdviceBlock,
    pub treatments: Option<WireTreatments>,
    #[serde(deserialize_with = "null_as_default")]
    pub treatment: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub prevention: Vec<String>,
    pub overall_confidence: Option<f64>,
    pub calculation_method: Option<String>,
}

impl From<DiseaseServiceResponse> for DiseaseReport {
    fn from(wire: DiseaseServiceResponse) -> Self {
        let disease = match wire.disease_info {
            Some(info) => info,
            None => DiseaseInfo {
                disease_detected: wire.disease_detected.unwrap_or(false),
                disease_name: wire.disease_name.unwrap_or_default(),
                severity: wire.severity.unwrap_or_default(),
                symptoms: wire.symptoms,
            },
        };

        let (confidence, overall_from_breakdown, method_from_breakdown) = match wire.confidence {
            Some(WireConfidence::Score(score)) => (Some(score), None, None),
            Some(WireConfidence::Detailed {
                disease_detection,
                overall,
                calculation_method,
            }) => (disease_detection, overall, calculation_method),
            None => (None, None, None),
        };

        let mut model_advice = wire.model_advice;
        match wire.treatments {
            Some(WireTreatments::Combined {
                combined_treatments,
                prevention_tips,
            }) => {
                model_advice.treatments.extend(combined_treatments);
                model_advice.prevention_tips.extend(prevention_tips);
            }
            Some(WireTreatments::List(steps)) => model_advice.treatments.extend(steps),
            None => {}
        }

        DiseaseReport {
            disease,
            disease_type: wire.disease_type,
            confidence,
            llm_advice: wire.llm_advice,
            model_advice,
            treatment: wire.treatment,
            prevention: wire.prevention,
            overall_confidence: wire.overall_confidence.or(overall_from_breakdown),
            calculation_method: wire.calculation_method.or(method_from_breakdown),
        }
    }
}
