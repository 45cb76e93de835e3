//! Error types and handling for the `reachmap` map controller

use thiserror::Error;

/// Main error type for the map controller
#[derive(Error, Debug)]
pub enum ReachMapError {
    /// Empty or unparsable user input (address, coordinates, duration, profile)
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The geocoder returned no results
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Non-success HTTP status from an external service
    #[error("API error: {status_text}")]
    Api { status_text: String },

    /// Transport failure or malformed response
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Underlying cause, kept for logging only
        detail: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ReachMapError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new not found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new API error from the response status text
    pub fn api<S: Into<String>>(status_text: S) -> Self {
        Self::Api {
            status_text: status_text.into(),
        }
    }

    /// Create a new network error with a user-facing message and a cause
    pub fn network<S: Into<String>, D: ToString>(message: S, detail: D) -> Self {
        Self::Network {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Short machine-readable name of the error kind
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ReachMapError::InvalidInput { .. } => "invalid_input",
            ReachMapError::NotFound { .. } => "not_found",
            ReachMapError::Api { .. } => "api",
            ReachMapError::Network { .. } => "network",
            ReachMapError::Config { .. } => "config",
        }
    }

    /// Get the message shown to the user in a blocking notification
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ReachMapError::InvalidInput { message } | ReachMapError::NotFound { message } => {
                message.clone()
            }
            ReachMapError::Api { status_text } => {
                format!("OpenRouteService API error: {status_text}")
            }
            ReachMapError::Network { message, .. } => message.clone(),
            ReachMapError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ReachMapError::invalid_input("Invalid coordinates entered.");
        assert!(matches!(err, ReachMapError::InvalidInput { .. }));

        let err = ReachMapError::not_found("Address not found.");
        assert!(matches!(err, ReachMapError::NotFound { .. }));

        let err = ReachMapError::api("Forbidden");
        assert!(matches!(err, ReachMapError::Api { .. }));
        assert_eq!(err.kind(), "api");
    }

    #[test]
    fn test_user_messages() {
        let err = ReachMapError::api("Forbidden");
        assert_eq!(err.user_message(), "OpenRouteService API error: Forbidden");

        let err = ReachMapError::network("Failed to geocode address.", "connection refused");
        assert_eq!(err.user_message(), "Failed to geocode address.");
        assert!(!err.user_message().contains("connection refused"));

        let err = ReachMapError::config("missing api key");
        assert!(err.user_message().contains("Configuration error"));
    }
}
