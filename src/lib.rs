//! Harbor-aware Dockerfile generation service.
//!
//! A request names a language and optional details. The service picks a
//! public base image, resolves it to the organization's Harbor registry,
//! asks an AI model for a Dockerfile using the public image, and then swaps
//! the resolved Harbor path into the `FROM` line.

pub mod ai;
pub mod config;
pub mod error;
pub mod generator;
pub mod handler;
pub mod models;
pub mod resolver;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub use error::{AiError, ConfigError, ErrorKind, GenerationError, ServerError};
pub use generator::{DockerfileArtifact, DockerfileGenerator};
pub use models::{DockerfileResponse, ErrorResponse, GenerationRequest, HealthResponse};
pub use resolver::HarborMapping;

use ai::GeminiClient;
use config::{load_mapping, ServerSettings};
use handler::{router, AppState};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn start_rest() -> Result<(), ServerError> {
    // 1) Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    tracing::info!("Logger initialized. Loading server settings...");

    // 2) Settings and mapping document
    let settings = ServerSettings::from_env()?;
    tracing::info!(
        "Loading Harbor mapping from '{}'",
        settings.mapping_path.display()
    );
    let mapping = match load_mapping(&settings.mapping_path) {
        Ok(mapping) => {
            tracing::info!(
                "Configuration loaded: {} mapping entries, base URL '{}'",
                mapping.mappings().len(),
                mapping.base_url()
            );
            Some(mapping)
        }
        Err(e) => {
            tracing::error!(
                "FATAL: {}. Generation requests will be rejected until the configuration is fixed and the server restarted.",
                e
            );
            None
        }
    };

    // 3) AI client
    let ai = GeminiClient::new(&settings.gemini)?;
    tracing::info!("AI client ready (model '{}')", settings.gemini.model);

    let state = match mapping {
        Some(mapping) => AppState::new(DockerfileGenerator::new(Arc::new(mapping), Arc::new(ai))),
        None => AppState::unconfigured(),
    };

    // 4) Serve
    let addr = settings.bind_address()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("🚀 Dockerfile generator listening on http://{}", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
