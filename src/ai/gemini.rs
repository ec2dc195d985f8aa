//! Google Gemini client implementation using reqwest.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{clean_suggestion, SuggestionClient};
use crate::config::GeminiConfig;
use crate::error::AiError;

const X_GOOG_API_KEY: &str = "x-goog-api-key";
const TEMPERATURE: f32 = 0.3;
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// HTTP client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: Option<String>,
    api_url: String,
    model: String,
    client: Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        if config.api_key.is_none() {
            tracing::warn!("Gemini API key (GEMINI_API_KEY) not found. AI calls will fail.");
        }

        Ok(Self {
            api_key: config.api_key.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model: config.model.trim_start_matches("models/").to_string(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_url, self.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    safety_ratings: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

#[async_trait]
impl SuggestionClient for GeminiClient {
    async fn suggest(&self, prompt: &str) -> Result<String, AiError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            tracing::error!("Gemini client is not configured. Cannot make AI calls.");
            AiError::NotConfigured("Gemini API key is not set. Check GEMINI_API_KEY and logs.".into())
        })?;

        tracing::info!("Sending prompt to Google Gemini model: {}", self.model);
        tracing::debug!("Prompt:\n---\n{}\n---", prompt);

        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: "BLOCK_MEDIUM_AND_ABOVE",
                })
                .collect(),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header(X_GOOG_API_KEY, api_key)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            let err = classify_error_response(status, &text);
            tracing::error!("Gemini API returned {}: {}", status.as_u16(), err);
            return Err(err);
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| AiError::Unexpected(format!("Failed to parse Gemini response: {}", e)))?;

        let content = extract_text(parsed)?;
        tracing::info!("Received response from Google Gemini.");
        tracing::debug!("Raw AI Response Content:\n---\n{}\n---", content);

        Ok(clean_suggestion(&content))
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String, AiError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let feedback = response.prompt_feedback;
        let reason = feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let ratings = feedback
            .map(|f| serde_json::Value::Array(f.safety_ratings).to_string())
            .unwrap_or_else(|| "[]".to_string());
        tracing::warn!("Gemini response was empty or blocked. Reason: {}", reason);
        return Err(AiError::EmptyOrBlocked(format!(
            "Reason: {}. Safety feedback: {}",
            reason, ratings
        )));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "Unknown".to_string());
        tracing::warn!("Gemini candidate carried no text. Finish reason: {}", reason);
        return Err(AiError::EmptyOrBlocked(format!("Candidate had no text. Finish reason: {}", reason)));
    }

    Ok(text)
}

fn classify_transport_error(err: reqwest::Error) -> AiError {
    if err.is_timeout() {
        AiError::Unavailable(format!("Request to Gemini timed out: {}", err))
    } else {
        AiError::Unexpected(format!("HTTP request to Gemini failed: {}", err))
    }
}

/// Map a non-success Gemini reply onto the AI error taxonomy.
fn classify_error_response(status: StatusCode, body: &str) -> AiError {
    let envelope = serde_json::from_str::<ApiErrorEnvelope>(body).ok();
    let provider_status = envelope
        .as_ref()
        .and_then(|e| e.error.status.clone())
        .unwrap_or_default();
    let key_invalid = envelope.as_ref().is_some_and(|e| {
        e.error
            .details
            .iter()
            .any(|d| d.get("reason").and_then(|r| r.as_str()) == Some("API_KEY_INVALID"))
    });
    let message = envelope
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| body.trim().to_string());

    match (status.as_u16(), provider_status.as_str()) {
        (_, "PERMISSION_DENIED" | "UNAUTHENTICATED") | (401 | 403, _) => AiError::AuthenticationFailed(
            format!("Gemini authentication failed. Check your API key and permissions. Original error: {}", message),
        ),
        _ if key_invalid => AiError::AuthenticationFailed(format!("Gemini rejected the API key: {}", message)),
        (_, "RESOURCE_EXHAUSTED") | (429, _) => {
            AiError::Unavailable(format!("Gemini rate limit or quota exceeded. Original error: {}", message))
        }
        (_, "UNAVAILABLE" | "DEADLINE_EXCEEDED") | (503 | 504, _) => AiError::Unavailable(format!(
            "Gemini service is unavailable. Please try again later. Original error: {}",
            message
        )),
        (_, "INVALID_ARGUMENT" | "NOT_FOUND" | "FAILED_PRECONDITION") | (400 | 404, _) => AiError::InvalidArgument(
            format!("Invalid argument provided to Gemini (e.g., model name). Original error: {}", message),
        ),
        (code, _) => AiError::Unexpected(format!("Gemini API error ({}): {}", code, message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const PATH: &str = "/v1beta/models/test-model:generateContent";

    fn config_for(url: &str, api_key: Option<&str>) -> GeminiConfig {
        GeminiConfig {
            api_key: api_key.map(str::to_string),
            api_url: url.to_string(),
            model: "models/test-model".to_string(),
            timeout_secs: 1,
        }
    }

    fn candidate_body(text: &str) -> String {
        serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": text}], "role": "model"},
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    fn error_body(code: u16, status: &str, message: &str) -> String {
        serde_json::json!({"error": {"code": code, "message": message, "status": status}}).to_string()
    }

    async fn suggest_against(status: usize, body: String) -> Result<String, AiError> {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", PATH)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        let client = GeminiClient::new(&config_for(&server.url(), Some("fake-key"))).unwrap();
        client.suggest("prompt").await
    }

    #[tokio::test]
    async fn suggest_success_sends_key_and_cleans_fences() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_header(X_GOOG_API_KEY, "fake-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "contents": [{"parts": [{"text": "make a dockerfile"}]}],
                "generationConfig": {"temperature": 0.3},
                "safetySettings": [
                    {"category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE"},
                    {"category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_MEDIUM_AND_ABOVE"},
                    {"category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "BLOCK_MEDIUM_AND_ABOVE"},
                    {"category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(candidate_body("```dockerfile\nFROM python:3.11-slim\n```"))
            .expect(1)
            .create_async()
            .await;

        let client = GeminiClient::new(&config_for(&server.url(), Some("fake-key"))).unwrap();
        let result = client.suggest("make a dockerfile").await.unwrap();

        assert_eq!(result, "FROM python:3.11-slim");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn suggest_without_key_makes_no_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = GeminiClient::new(&config_for(&server.url(), None)).unwrap();
        let err = client.suggest("prompt").await.unwrap_err();

        assert!(matches!(err, AiError::NotConfigured(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn suggest_maps_permission_denied() {
        let err = suggest_against(403, error_body(403, "PERMISSION_DENIED", "denied")).await.unwrap_err();
        assert!(matches!(err, AiError::AuthenticationFailed(ref m) if m.contains("denied")));
    }

    #[tokio::test]
    async fn suggest_maps_invalid_api_key_to_authentication() {
        let body = serde_json::json!({"error": {
            "code": 400,
            "message": "API key not valid. Please pass a valid API key.",
            "status": "INVALID_ARGUMENT",
            "details": [{"@type": "type.googleapis.com/google.rpc.ErrorInfo", "reason": "API_KEY_INVALID"}]
        }})
        .to_string();
        let err = suggest_against(400, body).await.unwrap_err();
        assert!(matches!(err, AiError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn suggest_maps_rate_limit_and_outage_to_unavailable() {
        let err = suggest_against(429, error_body(429, "RESOURCE_EXHAUSTED", "quota")).await.unwrap_err();
        assert!(matches!(err, AiError::Unavailable(_)));

        let err = suggest_against(503, error_body(503, "UNAVAILABLE", "overloaded")).await.unwrap_err();
        assert!(matches!(err, AiError::Unavailable(_)));
    }

    #[tokio::test]
    async fn suggest_maps_bad_model_to_invalid_argument() {
        let err = suggest_against(400, error_body(400, "INVALID_ARGUMENT", "bad model")).await.unwrap_err();
        assert!(matches!(err, AiError::InvalidArgument(_)));

        let err = suggest_against(404, error_body(404, "NOT_FOUND", "models/nope is not found")).await.unwrap_err();
        assert!(matches!(err, AiError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn suggest_maps_other_failures_to_unexpected() {
        let err = suggest_against(500, error_body(500, "INTERNAL", "boom")).await.unwrap_err();
        assert!(matches!(err, AiError::Unexpected(ref m) if m.contains("boom")));

        let err = suggest_against(200, "not json".to_string()).await.unwrap_err();
        assert!(matches!(err, AiError::Unexpected(_)));
    }

    #[tokio::test]
    async fn suggest_reports_block_reason_when_no_candidates() {
        let body = serde_json::json!({
            "promptFeedback": {
                "blockReason": "SAFETY",
                "safetyRatings": [{"category": "HARM_CATEGORY_DANGEROUS_CONTENT", "probability": "HIGH"}]
            }
        })
        .to_string();
        let err = suggest_against(200, body).await.unwrap_err();
        match err {
            AiError::EmptyOrBlocked(message) => {
                assert!(message.contains("SAFETY"));
                assert!(message.contains("HARM_CATEGORY_DANGEROUS_CONTENT"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn suggest_treats_textless_candidate_as_blocked() {
        let body = serde_json::json!({"candidates": [{"finishReason": "SAFETY"}]}).to_string();
        let err = suggest_against(200, body).await.unwrap_err();
        assert!(matches!(err, AiError::EmptyOrBlocked(ref m) if m.contains("SAFETY")));
    }

    #[tokio::test]
    async fn suggest_timeout_is_unavailable() {
        // Accepts the connection but never answers.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let client = GeminiClient::new(&config_for(&url, Some("fake-key"))).unwrap();
        let err = client.suggest("prompt").await.unwrap_err();

        assert!(matches!(err, AiError::Unavailable(ref m) if m.contains("timed out")));
        drop(listener);
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = GeminiClient::new(&config_for("http://localhost", Some("super-secret"))).unwrap();
        let rendered = format!("{:?}", client);
        assert!(!rendered.contains("super-secret"));
        assert_eq!(client.endpoint(), format!("http://localhost{}", PATH));
    }
}
