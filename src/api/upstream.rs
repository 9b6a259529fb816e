use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("restomap/", env!("CARGO_PKG_VERSION"));

/// Field set requested from text search; there is no details panel so this stays minimal
pub const TEXT_SEARCH_FIELDS: &str =
    "name,rating,formatted_address,photos,place_id,geometry,website,user_ratings_total";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to reach upstream provider: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream provider returned HTTP {0}")]
    Status(StatusCode),
}

/// One fully-formed upstream GET: endpoint URL plus query parameters
/// (credential included).
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub url: String,
    pub params: Vec<(&'static str, String)>,
}

impl UpstreamRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

// Hand-written so the credential never ends up in logs
impl std::fmt::Debug for UpstreamRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(key, value)| {
                if *key == "key" {
                    (*key, "***")
                } else {
                    (*key, value.as_str())
                }
            })
            .collect();
        f.debug_struct("UpstreamRequest")
            .field("url", &self.url)
            .field("params", &params)
            .finish()
    }
}

/// Performs exactly one call against the mapping provider and returns the raw body.
pub trait Upstream: Send + Sync {
    fn fetch(
        &self,
        request: &UpstreamRequest,
    ) -> impl Future<Output = Result<String, UpstreamError>> + Send;
}

/// `reqwest`-backed provider client
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    pub fn new(timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Upstream for HttpUpstream {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<String, UpstreamError> {
        // reqwest errors embed the URL, which carries the key
        let response = self
            .client
            .get(&request.url)
            .query(&request.params)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        Ok(body)
    }
}
