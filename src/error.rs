use std::path::PathBuf;
use thiserror::Error;

/// Machine-readable failure classes shared by every layer of the service.
///
/// Each kind carries the transport status it suggests and the code string
/// clients receive in `error_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    UnsupportedLanguage,
    ConfigUnavailable,
    AiNotConfigured,
    AiAuthentication,
    AiUnavailable,
    AiInvalidArgument,
    AiEmptyOrBlocked,
    AiResponseInvalid,
    Unexpected,
}

impl ErrorKind {
    pub fn error_code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::UnsupportedLanguage => "UNSUPPORTED_LANGUAGE",
            ErrorKind::ConfigUnavailable => "CONFIG_ERROR",
            ErrorKind::AiNotConfigured => "AI_NOT_CONFIGURED",
            ErrorKind::AiAuthentication => "AI_AUTH_ERROR",
            ErrorKind::AiUnavailable => "AI_SERVICE_UNAVAILABLE",
            ErrorKind::AiInvalidArgument => "AI_INVALID_ARGUMENT",
            ErrorKind::AiEmptyOrBlocked => "AI_EMPTY_OR_BLOCKED",
            ErrorKind::AiResponseInvalid => "AI_RESPONSE_INVALID",
            ErrorKind::Unexpected => "UNEXPECTED_SERVER_ERROR",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Validation => 422,
            ErrorKind::UnsupportedLanguage => 400,
            ErrorKind::ConfigUnavailable | ErrorKind::AiUnavailable => 503,
            ErrorKind::AiNotConfigured
            | ErrorKind::AiAuthentication
            | ErrorKind::AiInvalidArgument
            | ErrorKind::AiEmptyOrBlocked
            | ErrorKind::AiResponseInvalid
            | ErrorKind::Unexpected => 500,
        }
    }
}

/// Startup failures while loading the Harbor mapping document or settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at '{}'", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read configuration file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration file '{}' is empty or invalid", path.display())]
    Empty { path: PathBuf },

    #[error("Error parsing YAML configuration file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid mapping entry '{key}': {reason}")]
    InvalidEntry { key: String, reason: String },

    #[error("Invalid value '{value}' for setting {name}")]
    InvalidSetting { name: String, value: String },
}

/// Failures of the AI suggestion client, already mapped out of the
/// provider's own error vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    #[error("AI client is not configured: {0}")]
    NotConfigured(String),

    #[error("AI provider rejected the credentials: {0}")]
    AuthenticationFailed(String),

    #[error("AI provider is unavailable: {0}")]
    Unavailable(String),

    #[error("AI provider rejected the request: {0}")]
    InvalidArgument(String),

    #[error("AI response was blocked or empty: {0}")]
    EmptyOrBlocked(String),

    #[error("Unexpected AI provider error: {0}")]
    Unexpected(String),
}

impl AiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AiError::NotConfigured(_) => ErrorKind::AiNotConfigured,
            AiError::AuthenticationFailed(_) => ErrorKind::AiAuthentication,
            AiError::Unavailable(_) => ErrorKind::AiUnavailable,
            AiError::InvalidArgument(_) => ErrorKind::AiInvalidArgument,
            AiError::EmptyOrBlocked(_) => ErrorKind::AiEmptyOrBlocked,
            AiError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}

/// Per-request failures of the generation pipeline.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("The requested language '{0}' is not supported for base image selection.")]
    UnsupportedLanguage(String),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("AI response processed, but failed to find and replace the expected generic FROM line ('FROM {generic}'). Check AI output format.")]
    ResponseUnusable { generic: String },
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::UnsupportedLanguage(_) => ErrorKind::UnsupportedLanguage,
            GenerationError::Ai(e) => e.kind(),
            GenerationError::ResponseUnusable { .. } => ErrorKind::AiResponseInvalid,
        }
    }
}

/// Fatal errors raised while bringing the HTTP service up.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_errors_keep_distinct_kinds() {
        let kinds = [
            AiError::NotConfigured("x".into()).kind(),
            AiError::AuthenticationFailed("x".into()).kind(),
            AiError::Unavailable("x".into()).kind(),
            AiError::InvalidArgument("x".into()).kind(),
            AiError::EmptyOrBlocked("x".into()).kind(),
        ];
        let unique: std::collections::HashSet<_> = kinds.iter().collect();
        assert_eq!(unique.len(), kinds.len());
    }

    #[test]
    fn test_status_codes_follow_transport_policy() {
        assert_eq!(ErrorKind::Validation.status_code(), 422);
        assert_eq!(ErrorKind::UnsupportedLanguage.status_code(), 400);
        assert_eq!(ErrorKind::ConfigUnavailable.status_code(), 503);
        assert_eq!(ErrorKind::AiUnavailable.status_code(), 503);
        assert_eq!(ErrorKind::AiAuthentication.status_code(), 500);
        assert_eq!(ErrorKind::AiResponseInvalid.status_code(), 500);
        assert_eq!(ErrorKind::Unexpected.status_code(), 500);
    }

    #[test]
    fn test_generation_error_passes_ai_kind_through() {
        let err = GenerationError::from(AiError::Unavailable("quota".into()));
        assert_eq!(err.kind(), ErrorKind::AiUnavailable);
        assert_eq!(err.kind().error_code(), "AI_SERVICE_UNAVAILABLE");

        let err = GenerationError::ResponseUnusable { generic: "python:3.11-slim".into() };
        assert_eq!(err.kind().error_code(), "AI_RESPONSE_INVALID");
        assert!(err.to_string().contains("FROM python:3.11-slim"));
    }
}
