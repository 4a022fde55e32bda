use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GenerationError>;

/// Ways a generation attempt can fail
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The provider could not be reached or the connection dropped
    #[error("connection error: {0}")]
    Connection(String),

    /// The provider rejected the credential (or it was missing)
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The provider answered but the job did not succeed
    #[error("provider request failed: {message}")]
    ProviderRequestFailed {
        /// HTTP status, when the failure came from an HTTP response
        status: Option<u16>,
        message: String,
    },

    /// The job was still queued or running when its deadline passed
    #[error("job {request_id} did not finish within {timeout:?}")]
    JobTimedOut { request_id: String, timeout: Duration },

    /// The job succeeded but its payload matched no known image envelope
    #[error("unrecognized response shape: {payload}")]
    UnrecognizedResponseShape {
        /// The payload as received, kept for diagnostics
        payload: serde_json::Value,
    },

    /// The generator could not be built from configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl GenerationError {
    pub(crate) fn provider(message: impl Into<String>) -> Self {
        Self::ProviderRequestFailed {
            status: None,
            message: message.into(),
        }
    }

    /// Whether the failure happened talking to the provider, as opposed to
    /// interpreting its answer
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::Connection(_)
                | Self::AuthenticationFailed(_)
                | Self::ProviderRequestFailed { .. }
                | Self::JobTimedOut { .. }
        )
    }
}
