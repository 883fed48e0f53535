use thiserror::Error;

/// Type alias for Result with ExporterError
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Error types for the label exporter
#[derive(Error, Debug)]
pub enum ExporterError {
    /// Gmail API returned an error
    #[error("Gmail API error: {0}")]
    ApiError(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    /// Network-related error (connection issues, timeouts, etc.)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Server returned 5xx error
    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Resource not found (404)
    #[error("Label not found: {0}")]
    LabelNotFound(String),

    /// Bad request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden (403)
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Label response could not be interpreted
    #[error("Label error: {0}")]
    LabelError(String),

    /// Metric registration or encoding failed
    #[error("Metrics error: {0}")]
    MetricsError(#[from] prometheus::Error),

    /// IO error (file operations, sockets, etc.)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Parse the Retry-After header from an HTTP response
///
/// Only the delay-seconds form is understood. A missing or unparsable
/// header yields the default of 5 seconds.
fn parse_retry_after_header<B>(response: &hyper::Response<B>) -> u64 {
    const DEFAULT_RETRY_AFTER: u64 = 5;

    response
        .headers()
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

impl From<google_gmail1::Error> for ExporterError {
    fn from(error: google_gmail1::Error) -> Self {
        match error {
            // HTTP response with status code (non-success responses)
            google_gmail1::Error::Failure(ref response) => {
                let status = response.status();
                let status_code = status.as_u16();
                let message = format!(
                    "HTTP {}: {}",
                    status_code,
                    status.canonical_reason().unwrap_or("Unknown")
                );

                match status_code {
                    429 => ExporterError::RateLimitExceeded {
                        retry_after: parse_retry_after_header(response),
                    },
                    404 => ExporterError::LabelNotFound("Resource not found".to_string()),
                    400 => ExporterError::BadRequest(message),
                    403 => ExporterError::Forbidden(message),
                    500..=599 => ExporterError::ServerError {
                        status: status_code,
                        message,
                    },
                    _ => ExporterError::ApiError(message),
                }
            }
            google_gmail1::Error::BadRequest(ref err) => {
                ExporterError::BadRequest(format!("{}", err))
            }
            google_gmail1::Error::HttpError(ref err) => {
                ExporterError::NetworkError(format!("Connection error: {}", err))
            }
            google_gmail1::Error::Io(err) => ExporterError::NetworkError(err.to_string()),
            _ => ExporterError::ApiError(error.to_string()),
        }
    }
}
