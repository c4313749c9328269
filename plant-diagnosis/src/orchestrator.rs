//! Gathers the upstream answers for one photo and assembles
//! the final [`DiagnosisResult`].
//!
//! ## Failure tolerance
//! * The classification and disease sources are called concurrently, each under its own
//!   timeout. A failure or timeout of either degrades that part of the result
//!   (`"Unknown Plant"`, `health_status = unknown`) instead of failing the request.
//! * The knowledge base is consulted only once a disease verdict exists; when it fails,
//!   the diagnosis proceeds without curated advice.
//! * Malformed input (an empty or unrecognisable payload, or a source that explicitly
//!   rejects the photo as `invalid_image`) is answered with a rejected result whose
//!   `health_status` is `invalid_image`. Nothing is merged for it.
//!
//! ## Cancellation
//! Dropping the future returned by [`DiagnosisOrchestrator::diagnose`] drops every
//! in-flight upstream call with it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, debug, info, info_span, warn};

use crate::{
    confidence::{self, ConfidenceInputs},
    error::{DiagnosisError, Result},
    merge::{self, TreatmentSources},
    source::{ClassificationSource, DiseaseSource, EmptyKnowledgeBase, KnowledgeBase, SourceKind},
    types::{
        AdviceBlock, ClassificationResult, DiagnosisRequest, DiagnosisResult, DiseaseReport,
        HealthStatus, PipelineState, UNKNOWN_PLANT,
    },
};

/// Per-call budget for every upstream source
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct DiagnosisOrchestrator {
    classifier: Arc<dyn ClassificationSource>,
    disease: Arc<dyn DiseaseSource>,
    knowledge_base: Arc<dyn KnowledgeBase>,
    source_timeout: Duration,
}

impl DiagnosisOrchestrator {
    pub fn new(
        classifier: Arc<dyn ClassificationSource>,
        disease: Arc<dyn DiseaseSource>,
    ) -> Self {
        Self {
            classifier,
            disease,
            knowledge_base: Arc::new(EmptyKnowledgeBase),
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    pub fn with_knowledge_base(mut self, knowledge_base: Arc<dyn KnowledgeBase>) -> Self {
        self.knowledge_base = knowledge_base;
        self
    }

    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    pub fn source_timeout(&self) -> Duration {
        self.source_timeout
    }

    /// Run the whole pipeline for one request.
    ///
    /// Always returns a structurally complete result. Malformed input yields
    /// [`DiagnosisResult::invalid_image`] and no upstream answer is merged.
    pub async fn diagnose(&self, request: &DiagnosisRequest) -> Result<DiagnosisResult> {
        let span = info_span!("diagnosis", request_id = %request.id, mode = ?request.mode);
        match self.run(request).instrument(span).await {
            Err(DiagnosisError::MalformedInput(reason)) => {
                info!(request_id = %request.id, state = %PipelineState::Rejected, "{}", reason);
                Ok(DiagnosisResult::invalid_image(request, reason))
            }
            outcome => outcome,
        }
    }

    async fn run(&self, request: &DiagnosisRequest) -> Result<DiagnosisResult> {
        validate_image(&request.image)?;
        debug!(state = %PipelineState::Pending, "Starting diagnosis");

        let classify = async {
            if request.mode.includes_classification() {
                Some(
                    self.guarded(
                        SourceKind::Classification,
                        self.classifier.classify(&request.image),
                    )
                    .await,
                )
            } else {
                None
            }
        };
        let detect = self.guarded(
            SourceKind::DiseaseDetection,
            self.disease.diagnose(&request.image),
        );
        let (classification, report) = tokio::join!(classify, detect);

        reject_invalid_image(classification.as_ref(), &report)?;

        let mut parts = PartialResults::default();

        match classification {
            None => {}
            Some(Ok(result)) => {
                if result.success {
                    info!(plant_name = %result.plant_name, "Plant classified");
                } else {
                    let reason = result.error.as_deref().unwrap_or("classification failed");
                    warn!(
                        classifier = self.classifier.id(),
                        "Classification unsuccessful: {}", reason
                    );
                    parts.degrade(format!("{}: {}", SourceKind::Classification, reason));
                }
                parts.classification = Some(result);
            }
            Some(Err(e)) => {
                warn!(classifier = self.classifier.id(), "Classification failed: {}", e);
                parts.degrade(e.to_string());
                parts.classification = Some(ClassificationResult::failed(e.to_string()));
            }
        }

        match report {
            Ok(report) => {
                info!(
                    disease_detected = report.disease.disease_detected,
                    disease_name = %report.disease.disease_name,
                    "Disease detection completed"
                );
                parts.report = Some(report);
            }
            Err(e) => {
                warn!(detector = self.disease.id(), "Disease detection failed: {}", e);
                parts.degrade(e.to_string());
            }
        }

        if request.mode.includes_knowledge_base() {
            if let Some(report) = &parts.report {
                let plant_name = parts
                    .classification
                    .as_ref()
                    .map(ClassificationResult::resolved_plant_name)
                    .unwrap_or(UNKNOWN_PLANT)
                    .to_string();
                let disease_key = report.knowledge_base_key().to_string();

                let lookup = self
                    .guarded(
                        SourceKind::KnowledgeBase,
                        self.knowledge_base.lookup(&plant_name, &disease_key),
                    )
                    .await;

                match lookup {
                    Ok(advice) => {
                        debug!(
                            plant_name = %plant_name,
                            disease = %disease_key,
                            matched = !advice.is_empty(),
                            "Knowledge base consulted"
                        );
                        parts.kb_advice = advice;
                    }
                    Err(e) => {
                        warn!(
                            knowledge_base = self.knowledge_base.id(),
                            "Knowledge base lookup failed: {}", e
                        );
                        parts.degrade(e.to_string());
                    }
                }
            }
        }

        let result = parts.assemble(request);
        info!(
            state = %result.pipeline_state,
            health_status = ?result.health_status,
            treatments = result.treatments.len(),
            "Diagnosis assembled"
        );
        Ok(result)
    }

    async fn guarded<T, F>(&self, kind: SourceKind, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.source_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(DiagnosisError::Timeout {
                kind,
                after: self.source_timeout,
            }),
        }
    }
}

/// Reject payloads that are empty or carry no recognisable image signature.
pub fn validate_image(image: &[u8]) -> Result<()> {
    if image.is_empty() {
        return Err(DiagnosisError::MalformedInput(
            "image payload is empty".to_string(),
        ));
    }
    image::guess_format(image).map_err(|_| {
        DiagnosisError::MalformedInput("payload is not a recognised image format".to_string())
    })?;
    Ok(())
}

fn reject_invalid_image(
    classification: Option<&Result<ClassificationResult>>,
    report: &Result<DiseaseReport>,
) -> Result<()> {
    let classifier_rejected = matches!(classification, Some(Ok(c)) if c.flags_invalid_image());
    let detector_rejected = matches!(report, Ok(r) if r.flags_invalid_image());

    if classifier_rejected || detector_rejected {
        warn!("Upstream source rejected the photo as invalid");
        return Err(DiagnosisError::MalformedInput(
            "the photo does not show a plant leaf or affected area".to_string(),
        ));
    }
    Ok(())
}

/// Upstream answers collected for one request, before merging
#[derive(Debug, Clone)]
pub struct PartialResults {
    /// `None` when classification was not attempted
    pub classification: Option<ClassificationResult>,
    /// `None` when the disease source failed
    pub report: Option<DiseaseReport>,
    pub kb_advice: AdviceBlock,
    pub warnings: Vec<String>,
    pub all_succeeded: bool,
}

impl Default for PartialResults {
    fn default() -> Self {
        Self {
            classification: None,
            report: None,
            kb_advice: AdviceBlock::default(),
            warnings: Vec::new(),
            all_succeeded: true,
        }
    }
}

impl PartialResults {
    pub fn degrade(&mut self, warning: impl Into<String>) {
        self.all_succeeded = false;
        self.warnings.push(warning.into());
    }

    /// Merge the collected answers into the final result. Pure apart from the timestamp.
    pub fn assemble(self, request: &DiagnosisRequest) -> DiagnosisResult {
        let health_status = HealthStatus::from_report(self.report.as_ref());
        let plant_name = self
            .classification
            .as_ref()
            .map(ClassificationResult::resolved_plant_name)
            .unwrap_or(UNKNOWN_PLANT)
            .to_string();
        let report = self.report.unwrap_or_default();
        let kb = self.kb_advice;

        let symptoms = merge::merge_symptoms(
            &report.disease.symptoms,
            &report.llm_advice.symptoms,
            &kb.symptoms,
        );

        let direct_prevention: Vec<String> = report
            .model_advice
            .prevention_tips
            .iter()
            .chain(&report.prevention)
            .cloned()
            .collect();
        let prevention = merge::merge_prevention(
            &kb.prevention_tips,
            &report.llm_advice.prevention_tips,
            &direct_prevention,
        );

        let confidence = confidence::calculate(&ConfidenceInputs {
            classification: self.classification.as_ref().map(|c| c.confidence),
            disease_detection: report.disease_confidence(),
            knowledge_base: kb.confidence,
            upstream_overall: report.overall_confidence,
            calculation_method: report.calculation_method.clone(),
        });

        let treatments = merge::merge_treatments(TreatmentSources {
            llm: &report.llm_advice.treatments,
            model: &report.model_advice.treatments,
            knowledge_base: &kb.treatments,
            untagged: &report.treatment,
            kb_confidence: confidence.kb_confidence,
        });

        let pipeline_state = if self.all_succeeded {
            PipelineState::Succeeded
        } else {
            PipelineState::PartiallyFailed
        };

        DiagnosisResult {
            request_id: request.id,
            mode: request.mode,
            pipeline_success: self.all_succeeded,
            pipeline_state,
            plant_name,
            health_status,
            disease_type: report.disease_type,
            disease_info: report.disease,
            confidence,
            treatments,
            symptoms,
            prevention,
            warnings: self.warnings,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::Provenance;
    use crate::types::{AnalysisMode, DiseaseInfo};
    use async_trait::async_trait;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    struct FixedClassifier(ClassificationResult);

    #[async_trait]
    impl ClassificationSource for FixedClassifier {
        async fn classify(&self, _image: &[u8]) -> Result<ClassificationResult> {
            Ok(self.0.clone())
        }
    }

    struct FixedDisease(DiseaseReport);

    #[async_trait]
    impl DiseaseSource for FixedDisease {
        async fn diagnose(&self, _image: &[u8]) -> Result<DiseaseReport> {
            Ok(self.0.clone())
        }
    }

    struct DownClassifier;

    #[async_trait]
    impl ClassificationSource for DownClassifier {
        async fn classify(&self, _image: &[u8]) -> Result<ClassificationResult> {
            Err(DiagnosisError::unavailable(
                SourceKind::Classification,
                "connection refused",
            ))
        }
    }

    struct DownDisease;

    #[async_trait]
    impl DiseaseSource for DownDisease {
        async fn diagnose(&self, _image: &[u8]) -> Result<DiseaseReport> {
            Err(DiagnosisError::unavailable(
                SourceKind::DiseaseDetection,
                "503 Service Unavailable",
            ))
        }
    }

    /// Answers after a fixed delay
    struct DelayedClassifier(Duration);

    #[async_trait]
    impl ClassificationSource for DelayedClassifier {
        async fn classify(&self, _image: &[u8]) -> Result<ClassificationResult> {
            tokio::time::sleep(self.0).await;
            Ok(ClassificationResult::identified("Rose", 0.95))
        }
    }

    struct DelayedDisease(Duration);

    #[async_trait]
    impl DiseaseSource for DelayedDisease {
        async fn diagnose(&self, _image: &[u8]) -> Result<DiseaseReport> {
            tokio::time::sleep(self.0).await;
            Ok(blight_report())
        }
    }

    struct FixedKnowledgeBase(AdviceBlock);

    #[async_trait]
    impl KnowledgeBase for FixedKnowledgeBase {
        async fn lookup(&self, _plant_name: &str, _disease_name: &str) -> Result<AdviceBlock> {
            Ok(self.0.clone())
        }
    }

    struct BrokenKnowledgeBase;

    #[async_trait]
    impl KnowledgeBase for BrokenKnowledgeBase {
        async fn lookup(&self, _plant_name: &str, _disease_name: &str) -> Result<AdviceBlock> {
            Err(DiagnosisError::KnowledgeBase("index corrupted".to_string()))
        }
    }

    /// Panics when consulted; used to prove a call was skipped.
    struct UnreachableClassifier;

    #[async_trait]
    impl ClassificationSource for UnreachableClassifier {
        async fn classify(&self, _image: &[u8]) -> Result<ClassificationResult> {
            panic!("classifier must not be called");
        }
    }

    struct UnreachableKnowledgeBase;

    #[async_trait]
    impl KnowledgeBase for UnreachableKnowledgeBase {
        async fn lookup(&self, _plant_name: &str, _disease_name: &str) -> Result<AdviceBlock> {
            panic!("knowledge base must not be called");
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn blight_report() -> DiseaseReport {
        DiseaseReport {
            disease: DiseaseInfo {
                disease_detected: true,
                disease_name: "Early Blight".to_string(),
                severity: "moderate".to_string(),
                symptoms: strings(&["Brown spots on leaves"]),
            },
            confidence: Some(0.8),
            llm_advice: AdviceBlock {
                symptoms: strings(&["brown spots on leaves", "Yellowing edges"]),
                treatments: strings(&["Apply fungicide"]),
                prevention_tips: strings(&["Rotate crops"]),
                confidence: None,
            },
            model_advice: AdviceBlock {
                treatments: strings(&["Remove infected leaves", "Apply fungicide"]),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn kb_advice() -> AdviceBlock {
        AdviceBlock {
            symptoms: strings(&["Concentric rings"]),
            treatments: strings(&["Water regularly"]),
            prevention_tips: strings(&["Space plants for airflow", "rotate crops"]),
            confidence: Some(0.6),
        }
    }

    fn orchestrator(
        classifier: impl ClassificationSource + 'static,
        disease: impl DiseaseSource + 'static,
    ) -> DiagnosisOrchestrator {
        DiagnosisOrchestrator::new(Arc::new(classifier), Arc::new(disease))
    }

    #[tokio::test]
    async fn full_pipeline_merges_all_sources() {
        let orchestrator = orchestrator(
            FixedClassifier(ClassificationResult::identified("Tomato", 0.9)),
            FixedDisease(blight_report()),
        )
        .with_knowledge_base(Arc::new(FixedKnowledgeBase(kb_advice())));

        let request = DiagnosisRequest::new(PNG, AnalysisMode::Full);
        let result = orchestrator.diagnose(&request).await.unwrap();

        assert!(result.pipeline_success);
        assert_eq!(result.pipeline_state, PipelineState::Succeeded);
        assert_eq!(result.request_id, request.id);
        assert_eq!(result.plant_name, "Tomato");
        assert_eq!(result.health_status, HealthStatus::Unhealthy);
        assert_eq!(result.disease_info.disease_name, "Early Blight");
        assert!(result.warnings.is_empty());

        assert_eq!(
            result.symptoms,
            vec!["Brown spots on leaves", "Yellowing edges", "Concentric rings"]
        );
        assert_eq!(
            result.prevention,
            vec!["Space plants for airflow", "rotate crops"]
        );

        let texts: Vec<&str> = result.treatments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Apply fungicide", "Remove infected leaves", "Water regularly"]
        );
        assert_eq!(result.treatments[0].source, Provenance::Llm);
        assert!(result.treatments[2].verified);

        // (90 * 0.3 + 80 * 0.5 + 60 * 0.2) / 1.0
        assert!((result.confidence.overall.value() - 79.0).abs() < 1e-9);
        assert_eq!(result.confidence.breakdown.len(), 3);
    }

    #[tokio::test]
    async fn all_sources_failed_still_yields_a_result() {
        let orchestrator = orchestrator(DownClassifier, DownDisease)
            .with_knowledge_base(Arc::new(UnreachableKnowledgeBase));

        let result = orchestrator
            .diagnose(&DiagnosisRequest::new(PNG, AnalysisMode::Full))
            .await
            .unwrap();

        assert!(!result.pipeline_success);
        assert_eq!(result.pipeline_state, PipelineState::PartiallyFailed);
        assert_eq!(result.plant_name, UNKNOWN_PLANT);
        assert_eq!(result.health_status, HealthStatus::Unknown);
        assert!(result.symptoms.is_empty());
        assert!(result.treatments.is_empty());
        assert!(result.prevention.is_empty());
        assert!(result.confidence.overall.is_zero());
        assert_eq!(result.warnings.len(), 2);
    }

    #[tokio::test]
    async fn classification_failure_degrades_only_the_plant_name() {
        let orchestrator = orchestrator(DownClassifier, FixedDisease(blight_report()));

        let result = orchestrator
            .diagnose(&DiagnosisRequest::new(PNG, AnalysisMode::Full))
            .await
            .unwrap();

        assert!(!result.pipeline_success);
        assert_eq!(result.plant_name, UNKNOWN_PLANT);
        assert_eq!(result.health_status, HealthStatus::Unhealthy);
        assert_eq!(result.treatments.len(), 2);
        assert!(result.warnings[0].contains("connection refused"));
    }

    #[tokio::test]
    async fn low_confidence_classification_marks_pipeline_unsuccessful() {
        let mut below = ClassificationResult::identified("Basil", 0.4);
        below.success = false;
        below.error = Some("confidence below threshold".to_string());

        let result = orchestrator(FixedClassifier(below), FixedDisease(blight_report()))
            .diagnose(&DiagnosisRequest::new(PNG, AnalysisMode::Full))
            .await
            .unwrap();

        assert!(!result.pipeline_success);
        assert_eq!(result.plant_name, UNKNOWN_PLANT);
        assert!(result.warnings[0].contains("confidence below threshold"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_disease_source_times_out_and_degrades() {
        let orchestrator = orchestrator(
            FixedClassifier(ClassificationResult::identified("Rose", 0.95)),
            DelayedDisease(Duration::from_secs(10)),
        )
        .with_source_timeout(Duration::from_millis(50));

        let result = orchestrator
            .diagnose(&DiagnosisRequest::new(PNG, AnalysisMode::Full))
            .await
            .unwrap();

        assert!(!result.pipeline_success);
        assert_eq!(result.plant_name, "Rose");
        assert_eq!(result.health_status, HealthStatus::Unknown);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("disease detection source timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_classifier_times_out_and_degrades() {
        let orchestrator = orchestrator(
            DelayedClassifier(Duration::from_secs(10)),
            FixedDisease(blight_report()),
        )
        .with_source_timeout(Duration::from_millis(50));

        let result = orchestrator
            .diagnose(&DiagnosisRequest::new(PNG, AnalysisMode::Full))
            .await
            .unwrap();

        assert!(!result.pipeline_success);
        assert_eq!(result.plant_name, UNKNOWN_PLANT);
        assert_eq!(result.health_status, HealthStatus::Unhealthy);
        assert_eq!(result.treatments.len(), 2);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("classification source timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn classification_and_detection_run_concurrently() {
        let delay = Duration::from_millis(400);
        let orchestrator = orchestrator(DelayedClassifier(delay), DelayedDisease(delay))
            .with_source_timeout(Duration::from_secs(1));

        let started = tokio::time::Instant::now();
        let result = orchestrator
            .diagnose(&DiagnosisRequest::new(PNG, AnalysisMode::Full))
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert!(result.pipeline_success);
        assert_eq!(result.plant_name, "Rose");
        assert!(elapsed >= delay);
        assert!(elapsed < delay * 2, "sources ran one after another: {:?}", elapsed);
    }

    #[tokio::test]
    async fn knowledge_base_failure_keeps_the_diagnosis() {
        let orchestrator = orchestrator(
            FixedClassifier(ClassificationResult::identified("Tomato", 0.9)),
            FixedDisease(blight_report()),
        )
        .with_knowledge_base(Arc::new(BrokenKnowledgeBase));

        let result = orchestrator
            .diagnose(&DiagnosisRequest::new(PNG, AnalysisMode::Full))
            .await
            .unwrap();

        assert!(!result.pipeline_success);
        assert_eq!(result.health_status, HealthStatus::Unhealthy);
        assert!(result.treatments.iter().all(|s| s.source != Provenance::Kb));
        assert!(result.confidence.kb_confidence.is_zero());
        assert_eq!(result.warnings.len(), 1);
    }

    #[tokio::test]
    async fn quick_mode_skips_classification_and_knowledge_base() {
        let orchestrator = orchestrator(UnreachableClassifier, FixedDisease(blight_report()))
            .with_knowledge_base(Arc::new(UnreachableKnowledgeBase));

        let result = orchestrator
            .diagnose(&DiagnosisRequest::new(PNG, AnalysisMode::Quick))
            .await
            .unwrap();

        assert!(result.pipeline_success);
        assert_eq!(result.mode, AnalysisMode::Quick);
        assert_eq!(result.plant_name, UNKNOWN_PLANT);
        assert_eq!(result.health_status, HealthStatus::Unhealthy);
        assert_eq!(result.treatments.len(), 2);
    }

    fn assert_rejected(result: &DiagnosisResult) {
        assert!(result.is_invalid_image());
        assert!(!result.pipeline_success);
        assert_eq!(result.pipeline_state, PipelineState::Rejected);
        assert_eq!(result.disease_type.as_deref(), Some(crate::types::INVALID_IMAGE));
        assert_eq!(result.plant_name, UNKNOWN_PLANT);
        assert!(result.symptoms.is_empty());
        assert!(result.treatments.is_empty());
        assert!(result.prevention.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    #[tokio::test]
    async fn invalid_image_verdict_yields_rejected_result() {
        let report = DiseaseReport {
            disease_type: Some("invalid_image".to_string()),
            ..blight_report()
        };
        let orchestrator = orchestrator(
            FixedClassifier(ClassificationResult::identified("Tomato", 0.9)),
            FixedDisease(report),
        )
        .with_knowledge_base(Arc::new(UnreachableKnowledgeBase));

        let request = DiagnosisRequest::new(PNG, AnalysisMode::Full);
        let result = orchestrator.diagnose(&request).await.unwrap();

        assert_rejected(&result);
        assert_eq!(result.request_id, request.id);
        assert!(result.disease_info.disease_name.is_empty());
    }

    #[tokio::test]
    async fn classifier_can_reject_the_photo_too() {
        let rejected = ClassificationResult::failed("invalid_image");

        let result = orchestrator(FixedClassifier(rejected), FixedDisease(blight_report()))
            .diagnose(&DiagnosisRequest::new(PNG, AnalysisMode::Full))
            .await
            .unwrap();

        assert_rejected(&result);
    }

    #[tokio::test]
    async fn empty_or_unknown_payload_is_rejected_before_any_call() {
        let orchestrator = orchestrator(UnreachableClassifier, DownDisease);

        for payload in [&b""[..], &b"definitely not an image"[..]] {
            let result = orchestrator
                .diagnose(&DiagnosisRequest::new(payload, AnalysisMode::Full))
                .await
                .unwrap();
            assert_rejected(&result);
        }
    }

    #[test]
    fn payload_sniffing_reports_malformed_input() {
        let err = validate_image(b"").unwrap_err();
        assert!(matches!(err, DiagnosisError::MalformedInput(_)));
        assert!(!err.is_retryable());
        assert!(validate_image(PNG).is_ok());
    }

    #[test]
    fn healthy_report_assembles_healthy_result() {
        let parts = PartialResults {
            classification: Some(ClassificationResult::identified("Fern", 0.99)),
            report: Some(DiseaseReport::default()),
            ..Default::default()
        };
        let request = DiagnosisRequest::new(PNG, AnalysisMode::Full);

        let result = parts.assemble(&request);

        assert_eq!(result.health_status, HealthStatus::Healthy);
        assert_eq!(result.plant_name, "Fern");
        assert!(result.pipeline_success);
        assert!(chrono::DateTime::parse_from_rfc3339(&result.timestamp).is_ok());
    }
}
