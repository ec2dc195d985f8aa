//! AI suggestion clients.
//!
//! The rest of the service only sees [`SuggestionClient`] and the
//! [`AiError`] taxonomy; provider wire formats stay inside each client.

pub mod gemini;

use async_trait::async_trait;

use crate::error::AiError;

pub use gemini::GeminiClient;

/// Sends a prompt to a text generation service and returns the cleaned reply.
///
/// Implementations make exactly one outbound call per invocation and never
/// retry.
#[async_trait]
pub trait SuggestionClient: Send + Sync {
    async fn suggest(&self, prompt: &str) -> Result<String, AiError>;
}

/// Trim the reply and drop a surrounding ```` ```dockerfile ```` fence.
pub fn clean_suggestion(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("```dockerfile").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim().to_string()
}
