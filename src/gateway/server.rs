use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Query, State};
use axum::extract::rejection::QueryRejection;
use axum::http::{Method, header::CONTENT_TYPE};
use axum::routing::get;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::{ProxyEnvelope, ProxyGateway};
use crate::api::Upstream;

pub const PROXY_PATH: &str = "/proxy";

/// `GET /proxy?type=..&query=..`
#[derive(Debug, Default, Deserialize)]
pub struct ProxyParams {
    #[serde(rename = "type")]
    pub request_type: Option<String>,
    pub query: Option<String>,
}

pub fn proxy_router<U: Upstream + 'static>(gateway: Arc<ProxyGateway<U>>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(PROXY_PATH, get(proxy_handler::<U>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(gateway)
}

async fn proxy_handler<U: Upstream + 'static>(
    State(gateway): State<Arc<ProxyGateway<U>>>,
    params: Result<Query<ProxyParams>, QueryRejection>,
) -> ProxyEnvelope {
    // An unparsable query string is treated as if no parameters were sent
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            warn!(%rejection, "Unparsable proxy query string");
            ProxyParams::default()
        }
    };

    gateway
        .handle(params.request_type.as_deref(), params.query.as_deref())
        .await
}

/// Bind `address` and serve the proxy until Ctrl+C / SIGTERM.
pub async fn serve<U: Upstream + 'static>(
    gateway: Arc<ProxyGateway<U>>,
    address: &str,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(address).await?;
    info!("Proxy listening on {}", listener.local_addr()?);

    axum::serve(listener, proxy_router(gateway))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Proxy shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
