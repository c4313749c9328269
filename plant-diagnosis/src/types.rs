use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::confidence::ConfidenceSet;
use crate::merge::TreatmentStep;

/// Plant name reported whenever the classifier could not identify the plant
pub const UNKNOWN_PLANT: &str = "Unknown Plant";

/// Marker an upstream source uses to reject the uploaded photo
pub const INVALID_IMAGE: &str = "invalid_image";

/// Which parts of the pipeline a request wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Plant identification, disease detection and knowledge-base advice
    #[default]
    Full,
    /// Disease detection only
    Quick,
}

impl AnalysisMode {
    pub fn includes_classification(self) -> bool {
        matches!(self, Self::Full)
    }

    pub fn includes_knowledge_base(self) -> bool {
        matches!(self, Self::Full)
    }
}

/// A single photo submitted for diagnosis
#[derive(Debug, Clone)]
pub struct DiagnosisRequest {
    pub id: Uuid,
    pub image: Vec<u8>,
    pub mode: AnalysisMode,
}

impl DiagnosisRequest {
    pub fn new(image: impl Into<Vec<u8>>, mode: AnalysisMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            image: image.into(),
            mode,
        }
    }
}

/// Field deserializer that reads an explicit `null` as the type's default.
///
/// `#[serde(default)]` only covers absent keys; upstream services also send `null`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_plant_name() -> String {
    UNKNOWN_PLANT.to_string()
}

/// Answer of the plant classification source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub success: bool,
    #[serde(default = "default_plant_name")]
    pub plant_name: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClassificationResult {
    pub fn identified(plant_name: impl Into<String>, confidence: f64) -> Self {
        Self {
            success: true,
            plant_name: plant_name.into(),
            confidence,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            plant_name: default_plant_name(),
            confidence: 0.0,
            error: Some(error.into()),
        }
    }

    /// The plant name to report. Unsuccessful or blank answers fall back to [`UNKNOWN_PLANT`].
    pub fn resolved_plant_name(&self) -> &str {
        let name = self.plant_name.trim();
        if self.success && !name.is_empty() {
            name
        } else {
            UNKNOWN_PLANT
        }
    }

    pub fn flags_invalid_image(&self) -> bool {
        self.error
            .as_deref()
            .is_some_and(|e| e.trim().eq_ignore_ascii_case(INVALID_IMAGE))
    }
}

/// Disease verdict of the disease-detection source
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiseaseInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub disease_detected: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub disease_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub severity: String,
    #[serde(deserialize_with = "null_as_default")]
    pub symptoms: Vec<String>,
}

/// Advice from one source. Every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceBlock {
    #[serde(alias = "observed_symptoms", deserialize_with = "null_as_default")]
    pub symptoms: Vec<String>,
    #[serde(
        alias = "treatment_plan",
        alias = "treatment_recommendations",
        deserialize_with = "null_as_default"
    )]
    pub treatments: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub prevention_tips: Vec<String>,
    #[serde(alias = "kb_confidence", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl AdviceBlock {
    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty() && self.treatments.is_empty() && self.prevention_tips.is_empty()
    }
}

/// Everything the disease/advice source returns for one photo
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiseaseReport {
    #[serde(deserialize_with = "null_as_default")]
    pub disease: DiseaseInfo,
    /// Category reported by the detector; `invalid_image` rejects the photo
    pub disease_type: Option<String>,
    pub confidence: Option<f64>,
    /// Free-text advice written by the language model
    #[serde(deserialize_with = "null_as_default")]
    pub llm_advice: AdviceBlock,
    /// Structured output of the detection model
    #[serde(deserialize_with = "null_as_default")]
    pub model_advice: AdviceBlock,
    /// Treatment steps supplied without a provenance tag
    #[serde(deserialize_with = "null_as_default")]
    pub treatment: Vec<String>,
    /// Prevention tips supplied directly on the report
    #[serde(deserialize_with = "null_as_default")]
    pub prevention: Vec<String>,
    pub overall_confidence: Option<f64>,
    pub calculation_method: Option<String>,
}

impl DiseaseReport {
    pub fn flags_invalid_image(&self) -> bool {
        self.disease_type
            .as_deref()
            .is_some_and(|t| t.trim().eq_ignore_ascii_case(INVALID_IMAGE))
    }

    pub fn disease_confidence(&self) -> Option<f64> {
        self.confidence.or(self.model_advice.confidence)
    }

    /// Key used to look up knowledge-base advice for this verdict
    pub fn knowledge_base_key(&self) -> &str {
        let name = self.disease.disease_name.trim();
        if self.disease.disease_detected && !name.is_empty() {
            name
        } else {
            "healthy"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Unknown,
    /// The photo was rejected before any verdict was merged
    InvalidImage,
}

impl HealthStatus {
    pub fn from_report(report: Option<&DiseaseReport>) -> Self {
        match report {
            None => Self::Unknown,
            Some(r) if r.disease.disease_detected => Self::Unhealthy,
            Some(_) => Self::Healthy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Pending,
    PartiallyFailed,
    Succeeded,
    Rejected,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::PartiallyFailed => write!(f, "partially_failed"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Final, immutable diagnosis handed to the transport layer
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisResult {
    pub request_id: Uuid,
    pub mode: AnalysisMode,
    pub pipeline_success: bool,
    pub pipeline_state: PipelineState,
    pub plant_name: String,
    pub health_status: HealthStatus,
    /// Category reported by the detector; `invalid_image` on rejected photos
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disease_type: Option<String>,
    pub disease_info: DiseaseInfo,
    pub confidence: ConfidenceSet,
    pub treatments: Vec<TreatmentStep>,
    pub symptoms: Vec<String>,
    pub prevention: Vec<String>,
    pub warnings: Vec<String>,
    pub timestamp: String,
}

impl DiagnosisResult {
    /// Result for a photo that is not a usable plant image. Nothing is merged.
    pub fn invalid_image(request: &DiagnosisRequest, reason: impl Into<String>) -> Self {
        Self {
            request_id: request.id,
            mode: request.mode,
            pipeline_success: false,
            pipeline_state: PipelineState::Rejected,
            plant_name: UNKNOWN_PLANT.to_string(),
            health_status: HealthStatus::InvalidImage,
            disease_type: Some(INVALID_IMAGE.to_string()),
            disease_info: DiseaseInfo::default(),
            confidence: ConfidenceSet::default(),
            treatments: Vec::new(),
            symptoms: Vec::new(),
            prevention: Vec::new(),
            warnings: vec![reason.into()],
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_invalid_image(&self) -> bool {
        self.health_status == HealthStatus::InvalidImage
    }
}
