use serde::Deserialize;
use std::fmt;

/// Status string carried by every upstream provider payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ProviderStatus {
    Ok,
    ZeroResults,
    RequestDenied,
    /// Any other provider status (`OVER_QUERY_LIMIT`, `INVALID_REQUEST`, ...)
    Other(String),
}

impl ProviderStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "OK" => ProviderStatus::Ok,
            "ZERO_RESULTS" => ProviderStatus::ZeroResults,
            "REQUEST_DENIED" => ProviderStatus::RequestDenied,
            other => ProviderStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProviderStatus::Ok => "OK",
            ProviderStatus::ZeroResults => "ZERO_RESULTS",
            ProviderStatus::RequestDenied => "REQUEST_DENIED",
            ProviderStatus::Other(status) => status,
        }
    }

    /// Statuses the proxy forwards verbatim with a 200 envelope
    pub fn is_pass_through(&self) -> bool {
        matches!(self, ProviderStatus::Ok | ProviderStatus::ZeroResults)
    }
}

impl From<String> for ProviderStatus {
    fn from(status: String) -> Self {
        ProviderStatus::parse(&status)
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
