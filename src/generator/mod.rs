use std::sync::Arc;

use crate::ai::SuggestionClient;
use crate::error::{GenerationError, Result};
use crate::models::{BaseImage, DockerfileResponse, GenerationRequest};
use crate::resolver::HarborMapping;

pub mod base_image;
pub mod dockerfile_gen;
pub mod prompt;

pub use base_image::{select_base_image, BaseImagePolicy, LanguageImageRule};
pub use dockerfile_gen::substitute_base_image;
pub use prompt::build_prompt;

/// A generated Dockerfile and the base image swap that was applied to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerfileArtifact {
    pub content: String,
    pub generic_image: String,
    pub harbor_path: String,
}

impl From<DockerfileArtifact> for DockerfileResponse {
    fn from(artifact: DockerfileArtifact) -> Self {
        DockerfileResponse {
            status: "success".to_string(),
            dockerfile_content: artifact.content,
            base_image: BaseImage {
                generic: artifact.generic_image,
                harbor_path: artifact.harbor_path,
            },
        }
    }
}

/// Runs selection, resolution, prompting, the AI call and substitution.
#[derive(Clone)]
pub struct DockerfileGenerator {
    mapping: Arc<HarborMapping>,
    policy: BaseImagePolicy,
    ai: Arc<dyn SuggestionClient>,
}

impl DockerfileGenerator {
    pub fn new(mapping: Arc<HarborMapping>, ai: Arc<dyn SuggestionClient>) -> Self {
        Self {
            mapping,
            policy: BaseImagePolicy::default(),
            ai,
        }
    }

    pub fn with_policy(mut self, policy: BaseImagePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn mapping(&self) -> &HarborMapping {
        &self.mapping
    }

    /// Generate a Dockerfile for the request.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<DockerfileArtifact> {
        tracing::info!(
            "Received request to generate Dockerfile for language: {}, version: {:?}",
            request.language,
            request.version
        );

        let generic_image = self.policy.select(&request.language, request.version.as_deref())?;
        tracing::info!("Determined generic base image: {}", generic_image);

        let harbor_path = self.mapping.resolve(&generic_image);
        tracing::info!("Resolved Harbor path: {}", harbor_path);

        let prompt = build_prompt(request, &generic_image);

        tracing::info!("Requesting Dockerfile suggestion from AI service...");
        let suggestion = self.ai.suggest(&prompt).await?;
        tracing::info!("Successfully received AI suggestion.");

        let content = match substitute_base_image(&suggestion, &generic_image, &harbor_path) {
            Ok(content) => content,
            Err(err @ GenerationError::ResponseUnusable { .. }) => {
                tracing::error!("{} Raw AI content:\n{}", err, suggestion);
                return Err(err);
            }
            Err(err) => return Err(err),
        };
        tracing::info!(
            "Replaced FROM line using generic image '{}' with Harbor path.",
            generic_image
        );

        Ok(DockerfileArtifact {
            content,
            generic_image,
            harbor_path,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::error::AiError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Canned AI client that records every prompt it receives.
    pub struct StubClient {
        reply: std::result::Result<String, AiError>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl StubClient {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(err: AiError) -> Self {
            Self {
                reply: Err(err),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SuggestionClient for StubClient {
        async fn suggest(&self, prompt: &str) -> std::result::Result<String, AiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    pub fn test_mapping() -> Arc<HarborMapping> {
        let mappings = [("python", "base-images/python-base")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(HarborMapping::new("harbor.test.local", mappings))
    }
}
