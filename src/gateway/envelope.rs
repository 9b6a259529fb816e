use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// JSON error body: `{"error": .., "message"?: .., "details"?: ..}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            details: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeBody {
    /// Provider payload, byte-for-byte as received
    Upstream(String),
    Error(ErrorBody),
}

/// Normalized `{statusCode, body}` pair the gateway always returns
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyEnvelope {
    pub status: StatusCode,
    pub body: EnvelopeBody,
}

impl ProxyEnvelope {
    pub fn pass_through(payload: String) -> Self {
        Self {
            status: StatusCode::OK,
            body: EnvelopeBody::Upstream(payload),
        }
    }

    pub fn error(status: StatusCode, body: ErrorBody) -> Self {
        Self {
            status,
            body: EnvelopeBody::Error(body),
        }
    }

    /// Rebuild an envelope from a proxy HTTP response
    pub fn from_http(status: StatusCode, text: String) -> Self {
        if status == StatusCode::OK {
            return Self::pass_through(text);
        }
        let body = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(error) => EnvelopeBody::Error(error),
            Err(_) => EnvelopeBody::Upstream(text),
        };
        Self { status, body }
    }

    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn body_text(&self) -> String {
        match &self.body {
            EnvelopeBody::Upstream(payload) => payload.clone(),
            EnvelopeBody::Error(error) => {
                serde_json::to_string(error).unwrap_or_else(|_| error.error.clone())
            }
        }
    }
}

impl IntoResponse for ProxyEnvelope {
    fn into_response(self) -> Response {
        let body = match self.body {
            EnvelopeBody::Upstream(payload) => payload,
            EnvelopeBody::Error(error) => {
                serde_json::to_string(&error).unwrap_or_else(|_| error.error.clone())
            }
        };
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
