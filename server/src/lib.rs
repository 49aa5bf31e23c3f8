//! HTTP surface in front of the infrastructure API.
//!
//! - `POST /graphql` forwards `{query, variables}` upstream with the
//!   server's credential and answers with the upstream envelope.
//! - `GET /loaders/projects` and `GET /loaders/projects/{id}` return the
//!   data the project and service views render first, so a client can
//!   hydrate its cache instead of fetching again.
//! - `GET /healthz` answers `ok`.

mod error;
mod routes;
mod state;

use std::future::Future;

use station_client::GraphqlClient;
use station_common::StationConfig;
use tokio::net::TcpListener;

pub use error::{ApiError, ServerError};
pub use routes::router;
pub use state::AppState;

/// Client the server forwards with: the configured endpoint and token,
/// marked as issued on behalf of browser pages.
pub fn upstream_client(config: &StationConfig) -> Result<GraphqlClient, ServerError> {
    let client = GraphqlClient::builder()
        .endpoint(config.endpoint.as_str())
        .token(config.require_token()?)
        .with_cors_header(true)
        .build()?;
    Ok(client)
}

/// Build the upstream client and bind `addr`, ready for [`serve`].
pub async fn bind(config: &StationConfig, addr: &str) -> Result<(TcpListener, AppState), ServerError> {
    let state = AppState::new(upstream_client(config)?);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    Ok((listener, state))
}

/// Resolves on Ctrl+C.
pub async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Signal received, shutting down");
}

/// Serve `state` on `listener` until `shutdown` resolves, then drain open
/// connections.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(%addr, upstream = %state.client().endpoint(), "station-server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!(%addr, "station-server stopped");
    Ok(())
}
