use tracing::{error, info, warn};

use super::{GatewayError, ProxyEnvelope, RequestType, decode_query};
use crate::api::{StatusProbe, TEXT_SEARCH_FIELDS, Upstream, UpstreamRequest};
use crate::config::{ApiKey, UpstreamConfig};
use crate::domain::ProviderStatus;

/// Stateless translator from `{type, query}` to one upstream call.
pub struct ProxyGateway<U> {
    upstream: U,
    api_key: Option<ApiKey>,
    endpoints: UpstreamConfig,
}

impl<U: Upstream> ProxyGateway<U> {
    pub fn new(upstream: U, api_key: Option<ApiKey>, endpoints: UpstreamConfig) -> Self {
        Self {
            upstream,
            api_key,
            endpoints,
        }
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    /// Handle one proxy invocation. Never fails: every outcome is an envelope.
    ///
    /// # Arguments
    /// * `request_type` - `"textSearch"` or `"geocode"`
    /// * `raw_query` - URL-encoded query, required and non-empty
    pub async fn handle(
        &self,
        request_type: Option<&str>,
        raw_query: Option<&str>,
    ) -> ProxyEnvelope {
        match self.forward(request_type, raw_query).await {
            Ok(payload) => ProxyEnvelope::pass_through(payload),
            Err(err) => {
                match &err {
                    GatewayError::MissingApiKey => {
                        error!("API key is not configured, refusing to call upstream")
                    }
                    GatewayError::MissingParameters => {
                        warn!(?request_type, ?raw_query, "Rejected proxy request")
                    }
                    GatewayError::UpstreamDenied { status, message }
                    | GatewayError::UpstreamFailure { status, message } => {
                        error!(%status, %message, "Upstream provider error")
                    }
                    GatewayError::Proxy { details } => error!(%details, "Proxy call failed"),
                }
                err.into_envelope()
            }
        }
    }

    async fn forward(
        &self,
        request_type: Option<&str>,
        raw_query: Option<&str>,
    ) -> Result<String, GatewayError> {
        let api_key = self.api_key.as_ref().ok_or(GatewayError::MissingApiKey)?;
        let kind = request_type
            .and_then(RequestType::parse)
            .ok_or(GatewayError::MissingParameters)?;
        let raw_query = raw_query
            .filter(|query| !query.is_empty())
            .ok_or(GatewayError::MissingParameters)?;

        let query = decode_query(raw_query)?;
        let request = self.upstream_request(kind, query, api_key);

        info!(request_type = %kind, url = %request.url, "Calling upstream provider");
        let payload = self.upstream.fetch(&request).await?;

        let probe: StatusProbe =
            serde_json::from_str(&payload).map_err(|e| GatewayError::Proxy {
                details: format!("invalid upstream payload: {}", e),
            })?;
        info!(status = %probe.status, "Upstream responded");

        let message = probe.error_message.unwrap_or_default();
        match probe.status {
            status if status.is_pass_through() => Ok(payload),
            ProviderStatus::RequestDenied => Err(GatewayError::UpstreamDenied {
                status: ProviderStatus::RequestDenied,
                message,
            }),
            status => Err(GatewayError::UpstreamFailure { status, message }),
        }
    }

    fn upstream_request(
        &self,
        kind: RequestType,
        query: String,
        api_key: &ApiKey,
    ) -> UpstreamRequest {
        let key = ("key", api_key.expose().to_string());
        match kind {
            RequestType::Geocode => UpstreamRequest {
                url: self.endpoints.geocode_url.clone(),
                params: vec![key, ("address", query)],
            },
            RequestType::TextSearch => UpstreamRequest {
                url: self.endpoints.text_search_url.clone(),
                params: vec![
                    key,
                    ("query", query),
                    ("fields", TEXT_SEARCH_FIELDS.to_string()),
                ],
            },
        }
    }
}
