use axum::{
    Router,
    body::Body,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::{Json, Response},
    routing::{get, post},
};
use plant_diagnosis::{AnalysisMode, DiagnosisOrchestrator, DiagnosisRequest, DiagnosisResult};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::{
    config::ServiceConfig,
    sources::{DiseaseServiceClient, RoboflowClassifier, StaticKnowledgeBase},
};

pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: DiagnosisOrchestrator,
}

pub fn create_app(config: &ServiceConfig) -> anyhow::Result<Router> {
    let app_state = create_app_state(config)?;
    Ok(build_router(app_state))
}

fn create_app_state(config: &ServiceConfig) -> anyhow::Result<AppState> {
    let classifier = RoboflowClassifier::new(config.classifier.clone(), config.upstream_timeout)?;
    let disease = DiseaseServiceClient::new(config.disease.clone(), config.upstream_timeout)?;

    let mut orchestrator = DiagnosisOrchestrator::new(Arc::new(classifier), Arc::new(disease))
        .with_source_timeout(config.upstream_timeout);

    match &config.knowledge_base_path {
        Some(path) => {
            let knowledge_base = StaticKnowledgeBase::load(path)?;
            info!(
                path = %path.display(),
                entries = knowledge_base.len(),
                "Knowledge base loaded"
            );
            orchestrator = orchestrator.with_knowledge_base(Arc::new(knowledge_base));
        }
        None => {
            warn!("KNOWLEDGE_BASE_PATH not set, diagnoses will carry no curated advice");
        }
    }

    Ok(AppState { orchestrator })
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/diagnose", post(diagnose))
        .route("/disease-detection-file", post(detect_disease))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id_middleware))
        .with_state(app_state)
}

/// Tags every request with a correlation id, reusing the caller's when present
async fn correlation_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let correlation_id = request
        .headers()
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let header = HeaderValue::from_str(&correlation_id).ok();
    if let Some(value) = &header {
        request.headers_mut().insert(CORRELATION_HEADER, value.clone());
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;

    if let Some(value) = header {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Plant Doctor API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Plant identification, disease detection and care recommendations",
        "endpoints": {
            "POST /diagnose": "Complete plant diagnosis (multipart upload, field 'file')",
            "POST /disease-detection-file": "Disease detection only (multipart upload, field 'file')",
            "GET /health": "Health check"
        },
        "features": [
            "Plant species identification",
            "Disease detection and analysis",
            "Plant-specific care recommendations from the knowledge base",
            "Prioritized treatment plan and prevention advice"
        ]
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn diagnose(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<DiagnosisResult> {
    run_diagnosis(&state, multipart, AnalysisMode::Full).await
}

async fn detect_disease(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<DiagnosisResult> {
    run_diagnosis(&state, multipart, AnalysisMode::Quick).await
}

async fn run_diagnosis(
    state: &AppState,
    multipart: Multipart,
    mode: AnalysisMode,
) -> ApiResult<DiagnosisResult> {
    let image = read_image_upload(multipart).await?;
    let request = DiagnosisRequest::new(image, mode);

    info!(
        request_id = %request.id,
        mode = ?mode,
        bytes = request.image.len(),
        "Received image for diagnosis"
    );

    match state.orchestrator.diagnose(&request).await {
        Ok(result) => {
            if result.is_invalid_image() {
                warn!(
                    request_id = %request.id,
                    reason = ?result.warnings,
                    "Rejected image"
                );
            } else if !result.pipeline_success {
                warn!(
                    request_id = %request.id,
                    warnings = ?result.warnings,
                    "Plant diagnosis pipeline completed with issues"
                );
            }
            Ok(Json(result))
        }
        Err(e) => {
            error!(request_id = %request.id, error = %e, "Diagnosis failed");
            Err(internal_error("Diagnosis failed", &e.to_string()))
        }
    }
}

/// Bytes of the `file` part. The part must declare an `image/*` content type.
async fn read_image_upload(mut multipart: Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request_error(&format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let is_image = field
            .content_type()
            .is_some_and(|content_type| content_type.starts_with("image/"));
        if !is_image {
            return Err(bad_request_error("File must be an image"));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request_error(&format!("Failed to read upload: {}", e)))?;
        return Ok(bytes.to_vec());
    }

    Err(bad_request_error("Missing 'file' upload"))
}
