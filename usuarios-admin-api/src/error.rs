use serde::{Deserialize, Serialize};

/// Unified error type for every call made against the usuarios API.
///
/// All variants are serializable so that a frontend can render structured
/// error information. `Display` produces the user-facing message that ends up
/// in notifications and in the fetcher's error slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "code")]
pub enum ApiError {
    /// A network-level error occurred (connection refused, DNS failure, ...).
    NetworkError {
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Error details.
        detail: String,
    },

    /// The server answered with a non-success status code.
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the body (`message` / `error` field), or the raw body.
        raw_message: Option<String>,
    },

    /// The requested usuario does not exist (HTTP 404 on a single-record endpoint).
    NotFound {
        /// Identifier that was requested.
        id: String,
    },

    /// The response body was not valid JSON for the expected type.
    ParseError {
        /// Details about the parse failure.
        detail: String,
    },

    /// The response parsed, but a required field was absent.
    MalformedPayload {
        /// Name of the missing field (e.g. `data`, `pagination`).
        missing: String,
    },

    /// Failed to serialize a request body.
    SerializationError {
        /// Details about the serialization failure.
        detail: String,
    },

    /// A request parameter is invalid before anything is sent.
    InvalidParameter {
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },
}

impl ApiError {
    /// Whether the error is an expected outcome (user input, missing record...).
    ///
    /// Used for log levels: `true` → `warn`, `false` → `error`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::InvalidParameter { .. } => true,
            Self::HttpStatus { status, .. } => (400..500).contains(status),
            _ => false,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { detail } => write!(f, "Network error: {detail}"),
            Self::Timeout { detail } => write!(f, "Request timed out: {detail}"),
            Self::HttpStatus {
                status,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "HTTP {status}: {msg}")
                } else {
                    write!(f, "HTTP {status}")
                }
            }
            Self::NotFound { id } => write!(f, "Usuario not found: {id}"),
            Self::ParseError { detail } => write!(f, "Failed to parse response: {detail}"),
            Self::MalformedPayload { missing } => {
                write!(f, "Unexpected response format: missing '{missing}'")
            }
            Self::SerializationError { detail } => {
                write!(f, "Failed to serialize request: {detail}")
            }
            Self::InvalidParameter { param, detail } => {
                write!(f, "Invalid parameter '{param}': {detail}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Result alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
