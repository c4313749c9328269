pub mod confidence;
pub mod error;
pub mod merge;
pub mod orchestrator;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use confidence::{ConfidenceEntry, ConfidenceInputs, ConfidenceSet, Percent, normalize};
pub use error::{DiagnosisError, Result};
pub use merge::{Provenance, TreatmentStep};
pub use orchestrator::{
    DEFAULT_SOURCE_TIMEOUT, DiagnosisOrchestrator, PartialResults, validate_image,
};
pub use source::{
    ClassificationSource, DiseaseSource, EmptyKnowledgeBase, KnowledgeBase, SourceKind,
};
pub use types::{
    AdviceBlock, AnalysisMode, ClassificationResult, DiagnosisRequest, DiagnosisResult,
    DiseaseInfo, DiseaseReport, HealthStatus, INVALID_IMAGE, PipelineState, UNKNOWN_PLANT,
    null_as_default,
};
