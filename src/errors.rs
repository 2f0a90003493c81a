/*!
 * Error types for the anonymizer.
 *
 * Each pipeline stage has its own error enum, defined with the thiserror
 * crate. `AnonymizerError` wraps them per stage and `AppError` is the
 * top-level error used by the binary.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to an LLM provider
#[derive(Error, Debug)]
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
}

impl ProviderError {
    /// Map a non-success HTTP status to the matching variant
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }

    /// Whether a retry may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The model produced no hypothesis
    #[error("Translation produced no output for input of {0} chars")]
    EmptyOutput(usize),
}

/// Errors raised by a named-entity recognizer
#[derive(Error, Debug)]
pub enum RecognizerError {
    /// Error from an LLM provider backing the recognizer
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The entity service answered with an error or could not be reached
    #[error("Entity service error: {0}")]
    Service(String),

    /// The entity service answered with something we cannot read
    #[error("Malformed recognizer response: {0}")]
    MalformedResponse(String),
}

/// Errors raised while loading a gazetteer
#[derive(Error, Debug)]
pub enum GazetteerError {
    /// The gazetteer file could not be opened or read
    #[error("Failed to read gazetteer {path:?}: {source}")]
    Io {
        /// Path of the gazetteer file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to model assets on disk
#[derive(Error, Debug)]
pub enum ModelError {
    /// Download of a model asset failed
    #[error("Failed to download {name} from {url}: {message}")]
    Download {
        /// Asset name
        name: String,
        /// Source URL
        url: String,
        /// Failure description
        message: String,
    },

    /// The downloaded file does not match the configured digest
    #[error("Checksum mismatch for {name}: expected {expected}, got {actual}")]
    Checksum {
        /// Asset name
        name: String,
        /// Configured SHA-256
        expected: String,
        /// Computed SHA-256
        actual: String,
    },

    /// A model file could not be parsed
    #[error("Invalid model file {path:?}: {message}")]
    Invalid {
        /// Path of the model file
        path: PathBuf,
        /// Parse failure description
        message: String,
    },

    /// Filesystem error while reading or writing a model file
    #[error("Model I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by the anonymization pipeline, tagged by stage
#[derive(Error, Debug)]
pub enum AnonymizerError {
    /// Gazetteer loading failed
    #[error("Gazetteer error: {0}")]
    Gazetteer(#[from] GazetteerError),

    /// Translation failed
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// A recognizer failed
    #[error("Recognizer '{recognizer}' failed: {source}")]
    Recognizer {
        /// Name of the failing recognizer
        recognizer: String,
        /// Underlying error
        #[source]
        source: RecognizerError,
    },

    /// Model assets are missing or invalid
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// A masking pattern could not be compiled
    #[error("Invalid masking pattern for '{key}': {message}")]
    Pattern {
        /// Entity key that produced the pattern
        key: String,
        /// Regex compilation error
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the pipeline
    #[error("Anonymizer error: {0}")]
    Anonymizer(#[from] AnonymizerError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
