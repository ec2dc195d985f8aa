//! Wire types shared by the HTTP gateway and the command-line client.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/generate-dockerfile`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Programming language (e.g. python, node, java)
    pub language: String,
    /// Language version (e.g. 3.11, 18, 20)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Type of application (e.g. web, cli, api)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_instructions: Option<String>,
}

impl GenerationRequest {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            version: None,
            dependencies: None,
            port: None,
            app_type: None,
            additional_instructions: None,
        }
    }

    /// Field-level checks serde cannot express. Returns one message per
    /// offending field.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();
        if self.language.trim().is_empty() {
            problems.push("Field body -> language: must not be empty".to_string());
        }
        if self.port == Some(0) {
            problems.push("Field body -> port: must be a positive integer".to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseImage {
    /// The generic image name the AI was asked to use
    pub generic: String,
    /// The Harbor path that was substituted
    pub harbor_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerfileResponse {
    pub status: String,
    pub dockerfile_content: String,
    pub base_image: BaseImage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub error_code: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, error_code: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            error_code: error_code.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// `loaded` or `unavailable`
    pub configuration: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_request_deserializes() {
        let request: GenerationRequest = serde_json::from_str(r#"{"language": "python"}"#).unwrap();
        assert_eq!(request, GenerationRequest::new("python"));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_omits_absent_fields() {
        let mut request = GenerationRequest::new("node");
        request.port = Some(3000);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"language": "node", "port": 3000}));
    }

    #[test]
    fn test_validate_reports_every_field() {
        let mut request = GenerationRequest::new("  ");
        request.port = Some(0);
        let problems = request.validate().unwrap_err();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("language"));
        assert!(problems[1].contains("port"));
    }

    #[test]
    fn test_negative_port_is_rejected_by_serde() {
        let result: Result<GenerationRequest, _> =
            serde_json::from_str(r#"{"language": "go", "port": -1}"#);
        assert!(result.is_err());
    }
}
