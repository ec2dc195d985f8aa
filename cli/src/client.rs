use std::time::Duration;

use harbor_dockergen::models::{DockerfileResponse, ErrorResponse, GenerationRequest, HealthResponse};
use reqwest::blocking::{Client, Response};

use crate::error::{ClientError, Result};

/// Generation can take a while on the model side.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Blocking HTTP client for the generator server.
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(server_url: &str) -> Result<Self> {
        Self::with_timeout(server_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(server_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("dockergen-cli/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: server_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn generate(&self, request: &GenerationRequest) -> Result<DockerfileResponse> {
        let url = self.endpoint("/api/v1/generate-dockerfile");
        log::info!("Calling generator server at {}", url);
        log::debug!(
            "Payload: {}",
            serde_json::to_string(request).unwrap_or_default()
        );

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .map_err(|e| connection_error(&url, e))?;
        log::info!("Server responded with status: {}", response.status());

        let body: DockerfileResponse = read_json(response)?;
        if body.status != "success" {
            return Err(ClientError::UnexpectedResponse(format!(
                "status '{}' in generation response",
                body.status
            )));
        }
        Ok(body)
    }

    pub fn health(&self) -> Result<HealthResponse> {
        let url = self.endpoint("/health");
        log::info!("Checking server health at {}", url);
        let response = self.http.get(&url).send().map_err(|e| connection_error(&url, e))?;
        read_json(response)
    }
}

fn connection_error(url: &str, err: reqwest::Error) -> ClientError {
    let reason = if err.is_timeout() {
        format!("request timed out ({})", err)
    } else {
        err.to_string()
    };
    ClientError::Connection {
        url: url.to_string(),
        reason,
    }
}

fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let text = response.text().map_err(|e| ClientError::UnexpectedResponse(e.to_string()))?;

    if !status.is_success() {
        return Err(ClientError::Server {
            status: status.as_u16(),
            message: error_message(&text, status.canonical_reason()),
        });
    }

    serde_json::from_str(&text).map_err(|e| ClientError::UnexpectedResponse(format!("{} in body: {}", e, text)))
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(err) = serde_json::from_str::<ErrorResponse>(body) {
        return err.message;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
    }
    let body = body.trim();
    if body.is_empty() {
        reason.unwrap_or("no details").to_string()
    } else {
        body.to_string()
    }
}
