//! Error types for the provider, configuration and optimizer layers.

use thiserror::Error;

/// Failures talking to the distance-matrix provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: String, message: String },

    #[error("Deserialization error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures building provider configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GOOGLE_MAPS_API_KEY is not set")]
    MissingApiKey,

    #[error("invalid timeout '{0}'")]
    InvalidTimeout(String),
}

/// Outcomes of a failed optimization.
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("No destinations were given.")]
    NoDestinations,

    #[error("Distance provider unavailable: {0}")]
    ProviderUnavailable(#[from] ProviderError),

    #[error("Distance matrix has shape {found}, expected {expected}x{expected}.")]
    MalformedMatrix { expected: usize, found: String },

    #[error("No route can be found from '{origin}' to any other destinations.")]
    Unreachable { origin: String },

    #[error("No feasible route visits every destination.")]
    NoSolution,
}

impl OptimizeError {
    /// Whether repeating the same request could plausibly succeed.
    ///
    /// Only transport-level provider failures qualify. Nothing in this crate
    /// retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            OptimizeError::ProviderUnavailable(ProviderError::Request(err)) => {
                err.is_timeout()
                    || err.is_connect()
                    || err.status().is_some_and(|status| status.is_server_error())
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_message_names_origin() {
        let err = OptimizeError::Unreachable {
            origin: "Louvre".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No route can be found from 'Louvre' to any other destinations."
        );
    }

    #[test]
    fn test_non_transport_errors_are_not_retryable() {
        assert!(!OptimizeError::NoSolution.is_retryable());
        assert!(!OptimizeError::NoDestinations.is_retryable());
        let api = OptimizeError::from(ProviderError::Api {
            status: "REQUEST_DENIED".to_string(),
            message: "bad key".to_string(),
        });
        assert!(!api.is_retryable());
    }
}
