use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to connect to server at {url}. Is it running? Details: {reason}")]
    Connection { url: String, reason: String },

    #[error("Server returned HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response from server: {0}")]
    UnexpectedResponse(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
