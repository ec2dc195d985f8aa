use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::error::{ErrorKind, GenerationError};
use crate::generator::DockerfileGenerator;
use crate::models::{DockerfileResponse, ErrorResponse, GenerationRequest, HealthResponse, ServiceInfo};

const CONFIG_UNAVAILABLE_MESSAGE: &str =
    "Server configuration is unavailable. Please check server startup logs.";
const AI_UNAVAILABLE_MESSAGE: &str =
    "The AI service is currently unavailable or rate limited. Please try again later.";
const AI_AUTH_MESSAGE: &str = "AI service authentication failed. Please contact the administrator.";
const UNEXPECTED_MESSAGE: &str = "An unexpected internal server error occurred.";

/// Shared handler state. `generator` is `None` when the mapping document
/// failed to load at startup.
#[derive(Clone, Default)]
pub struct AppState {
    generator: Option<Arc<DockerfileGenerator>>,
}

impl AppState {
    pub fn new(generator: DockerfileGenerator) -> Self {
        Self {
            generator: Some(Arc::new(generator)),
        }
    }

    /// State for a server whose configuration could not be loaded.
    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }
}

/// Error body plus the status it is sent with.
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(details: &[String]) -> Self {
        let message = format!("Request validation failed. Details: {}", details.join("; "));
        tracing::warn!("Request validation error: {}", message);
        Self::new(ErrorKind::Validation, message)
    }

    pub fn config_unavailable() -> Self {
        Self::new(ErrorKind::ConfigUnavailable, CONFIG_UNAVAILABLE_MESSAGE)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        let kind = err.kind();
        match kind {
            ErrorKind::UnsupportedLanguage => {
                tracing::warn!("{}", err);
                Self::new(kind, err.to_string())
            }
            // Provider detail stays in the log for these
            ErrorKind::AiUnavailable => {
                tracing::error!("AI service unavailable: {}", err);
                Self::new(kind, AI_UNAVAILABLE_MESSAGE)
            }
            ErrorKind::AiAuthentication => {
                tracing::error!("AI authentication failed: {}", err);
                Self::new(kind, AI_AUTH_MESSAGE)
            }
            ErrorKind::Unexpected => {
                tracing::error!("Unexpected error during generation: {}", err);
                Self::new(kind, UNEXPECTED_MESSAGE)
            }
            _ => {
                tracing::error!(
                    "Generation failed: status={}, code={}, message={}",
                    kind.status_code(),
                    kind.error_code(),
                    err
                );
                Self::new(kind, err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse::new(self.message, self.kind.error_code());
        (status, Json(body)).into_response()
    }
}

/// GET / → service info
async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Harbor Dockerfile Generator is running".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let configuration = if state.is_configured() { "loaded" } else { "unavailable" };
    Json(HealthResponse {
        status: "healthy".to_string(),
        configuration: configuration.to_string(),
    })
}

/// POST /api/v1/generate-dockerfile
async fn generate_dockerfile(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<DockerfileResponse>, ApiError> {
    // Unconfigured servers reject every request, well-formed or not
    let generator = state.generator.as_ref().ok_or_else(|| {
        tracing::error!("Generation requested but server configuration is not loaded");
        ApiError::config_unavailable()
    })?;

    let Json(request) = payload.map_err(|rejection| ApiError::validation(&[rejection.body_text()]))?;
    request.validate().map_err(|problems| ApiError::validation(&problems))?;

    let artifact = generator.generate(&request).await?;
    tracing::info!(
        "Generated Dockerfile for '{}' using {}",
        request.language,
        artifact.harbor_path
    );
    Ok(Json(artifact.into()))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!("Unhandled panic in request handler: {}", detail);
    ApiError::new(ErrorKind::Unexpected, UNEXPECTED_MESSAGE).into_response()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/v1/generate-dockerfile", post(generate_dockerfile))
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
