use axum::http::StatusCode;
use thiserror::Error;

use super::{ErrorBody, ProxyEnvelope};
use crate::api::UpstreamError;
use crate::domain::ProviderStatus;

/// Every way a proxy invocation can fail. Each variant maps to exactly one
/// envelope via [`GatewayError::into_envelope`].
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("API key is not configured")]
    MissingApiKey,

    #[error("Missing required parameters")]
    MissingParameters,

    #[error("upstream denied access: {status}")]
    UpstreamDenied {
        status: ProviderStatus,
        message: String,
    },

    #[error("upstream returned {status}")]
    UpstreamFailure {
        status: ProviderStatus,
        message: String,
    },

    /// No usable upstream response reached the proxy
    #[error("proxy failed: {details}")]
    Proxy { details: String },
}

impl From<UpstreamError> for GatewayError {
    fn from(error: UpstreamError) -> Self {
        GatewayError::Proxy {
            details: error.to_string(),
        }
    }
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingParameters => StatusCode::BAD_REQUEST,
            GatewayError::UpstreamDenied { .. } => StatusCode::FORBIDDEN,
            GatewayError::MissingApiKey
            | GatewayError::UpstreamFailure { .. }
            | GatewayError::Proxy { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_envelope(self) -> ProxyEnvelope {
        let status = self.status_code();
        let body = match self {
            GatewayError::MissingApiKey | GatewayError::MissingParameters => {
                ErrorBody::new(self.to_string())
            }
            GatewayError::UpstreamDenied { status, message }
            | GatewayError::UpstreamFailure { status, message } => {
                ErrorBody::new(status.to_string()).with_message(message)
            }
            GatewayError::Proxy { details } => ErrorBody::new("proxy failed").with_details(details),
        };
        ProxyEnvelope::error(status, body)
    }
}
