/*!
 * Error types for the doctrans pipeline.
 *
 * Two families, both built on thiserror:
 * - `ProviderError`: what a translation client reports for a single call.
 * - `PipelineError`: the pipeline taxonomy. Format and container errors are
 *   fatal for a request; translation errors are per-chunk and recoverable.
 */

use thiserror::Error;

/// Errors that can occur when calling a translation provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The call did not complete within the configured deadline
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
}

/// Errors raised by the document translation pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The declared format tag is not one the router knows
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Every delimiter candidate already occurs in the document
    #[error("No available delimiter: all {0} candidates occur in the document")]
    NoAvailableDelimiter(usize),

    /// Malformed archive, malformed XML, or missing mandatory part
    #[error("Invalid container: {0}")]
    InvalidContainer(String),

    /// The translation call for a chunk failed
    #[error("Translation call failed for chunk {chunk}: {message}")]
    TranslationCallFailed {
        /// Zero-based chunk index
        chunk: usize,
        /// Provider error description
        message: String,
    },

    /// The translated response did not line up with the request
    #[error("Translation degraded for chunk {chunk}: expected {expected} segments, received {received}")]
    TranslationDegraded {
        /// Zero-based chunk index
        chunk: usize,
        /// Number of segments sent
        expected: usize,
        /// Number of segments recovered from the response
        received: usize,
    },

    /// An optional part was not present in the container
    #[error("Part not found: {0}")]
    PartNotFound(String),
}

impl PipelineError {
    /// Wrap a provider failure as a per-chunk translation failure
    pub fn from_provider(chunk: usize, error: &ProviderError) -> Self {
        Self::TranslationCallFailed {
            chunk,
            message: error.to_string(),
        }
    }

    /// Whether the request can still produce a document after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TranslationCallFailed { .. } | Self::TranslationDegraded { .. } | Self::PartNotFound(_)
        )
    }
}

impl From<zip::result::ZipError> for PipelineError {
    fn from(error: zip::result::ZipError) -> Self {
        Self::InvalidContainer(error.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(error: std::io::Error) -> Self {
        Self::InvalidContainer(error.to_string())
    }
}

/// Result alias used throughout the pipeline
pub type Result<T> = std::result::Result<T, PipelineError>;
