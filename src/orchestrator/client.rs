use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::api::Upstream;
use crate::gateway::{ProxyEnvelope, ProxyGateway, RequestType, encode_query};

/// The proxy call never produced an envelope
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("proxy request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// How the orchestrator reaches the gateway. `query` is plain text; each
/// implementation encodes it into the gateway's `rawQuery` form.
pub trait PlacesGateway {
    fn call(
        &self,
        kind: RequestType,
        query: &str,
    ) -> impl Future<Output = Result<ProxyEnvelope, ClientError>> + Send;
}

/// In-process use of the gateway. The call itself cannot fail.
impl<U: Upstream> PlacesGateway for ProxyGateway<U> {
    async fn call(&self, kind: RequestType, query: &str) -> Result<ProxyEnvelope, ClientError> {
        let raw_query = encode_query(query);
        Ok(self.handle(Some(kind.as_str()), Some(&raw_query)).await)
    }
}

/// Talks to a remote proxy at `GET {proxy_url}?type=..&query=..`
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    proxy_url: String,
}

impl HttpGateway {
    pub fn new(proxy_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            proxy_url: proxy_url.into(),
        })
    }
}

impl PlacesGateway for HttpGateway {
    async fn call(&self, kind: RequestType, query: &str) -> Result<ProxyEnvelope, ClientError> {
        let raw_query = encode_query(query);
        let response = self
            .client
            .get(&self.proxy_url)
            .query(&[("type", kind.as_str()), ("query", raw_query.as_str())])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        Ok(ProxyEnvelope::from_http(status, text))
    }
}
