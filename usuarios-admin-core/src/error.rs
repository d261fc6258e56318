//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

pub use usuarios_admin_api::ApiError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// An update or delete was attempted without an identifier.
    #[error("El ID del usuario es requerido para {0}.")]
    MissingId(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// API error (converting from the client library)
    #[error("{0}")]
    Api(#[from] ApiError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, missing record...), used for log levels.
    ///
    /// `true` → `warn`, `false` → `error`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::MissingId(_) => true,
            Self::Api(e) => e.is_expected(),
            Self::Config(_) => false,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
