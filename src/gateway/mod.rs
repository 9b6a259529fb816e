//! Credential-hiding proxy in front of the mapping provider.
//!
//! Every invocation yields a [`ProxyEnvelope`]; failures never escape as
//! errors past [`ProxyGateway::handle`].

pub mod envelope;
pub mod error;
pub mod proxy;
pub mod server;

pub use envelope::{EnvelopeBody, ErrorBody, ProxyEnvelope};
pub use error::GatewayError;
pub use proxy::ProxyGateway;
pub use server::{PROXY_PATH, ProxyParams, proxy_router, serve};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use std::fmt;

/// Characters left alone when encoding a query component (same set as
/// JavaScript's `encodeURIComponent`)
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// The two logical requests the proxy understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    TextSearch,
    Geocode,
}

impl RequestType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "textSearch" => Some(RequestType::TextSearch),
            "geocode" => Some(RequestType::Geocode),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestType::TextSearch => "textSearch",
            RequestType::Geocode => "geocode",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percent-encode a free-text query into the proxy's `rawQuery` form
pub fn encode_query(query: &str) -> String {
    utf8_percent_encode(query, QUERY_COMPONENT).to_string()
}

/// Decode a `rawQuery`. Malformed escapes pass through; non-UTF-8 output is an error.
pub fn decode_query(raw: &str) -> Result<String, GatewayError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| GatewayError::Proxy {
            details: format!("query is not valid UTF-8 once decoded: {}", e),
        })
}
