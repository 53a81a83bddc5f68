//! Error types for the pizza-admin core crate

use thiserror::Error;

/// Result type alias using the core [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the core crate
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Entity type name that matches no known entity
    #[error("Unknown entity type: {name}")]
    UnknownEntity {
        /// The unrecognised name
        name: String,
    },

    /// Operation name that matches no access operation
    #[error("Unknown access operation: {name}")]
    UnknownOperation {
        /// The unrecognised name
        name: String,
    },

    /// A form or command line value that cannot be parsed for its field
    #[error("Invalid value for field {field}: {message}")]
    InvalidField {
        /// Field name
        field: String,
        /// Why the value was rejected
        message: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The global tracing subscriber could not be installed
    #[error("Logging initialization failed: {message}")]
    Logging {
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a new configuration error
    #[must_use]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new invalid field error
    #[must_use]
    pub fn invalid_field<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}
