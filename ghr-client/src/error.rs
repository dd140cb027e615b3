//! Error types for the GitHub client

use ghr_core::FleetError;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the GitHub API
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if the API rejected the access token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::ApiError { status: 401 | 403, .. })
    }

    /// Check if the API could not be reached at all
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::RequestFailed(e) if e.is_connect() || e.is_timeout())
    }
}

impl From<ClientError> for FleetError {
    fn from(err: ClientError) -> Self {
        if err.is_unauthorized() {
            FleetError::control_plane_unavailable(format!("access token rejected: {}", err))
        } else if err.is_connection_error() {
            FleetError::control_plane_unavailable(err.to_string())
        } else {
            FleetError::ControlPlane(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_unavailable() {
        for status in [401, 403] {
            let err: FleetError = ClientError::api_error(status, "Bad credentials").into();
            assert!(err.is_unavailable(), "status {status} should be unavailable");
        }
    }

    #[test]
    fn test_other_status_maps_to_control_plane_error() {
        let err: FleetError = ClientError::api_error(404, "Not Found").into();
        assert!(matches!(err, FleetError::ControlPlane(_)));
        assert!(err.to_string().contains("status 404"));
    }
}
