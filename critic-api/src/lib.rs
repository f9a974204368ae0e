//! Critic API - HTTP surface for pull request review
//!
//! Three endpoints: submit a pull request for analysis, poll a task's
//! status, and fetch its results once completed. Handlers only talk to the
//! [`Dispatcher`]; the analysis itself runs on its worker pool.

pub mod routes;

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use critic_core::Dispatcher;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared handler state
#[derive(Clone, Debug)]
pub struct AppState {
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

/// Build the router with request tracing
pub fn app(state: AppState) -> Router {
    routes::router(state).layer(TraceLayer::new_for_http())
}

/// Serve the API until `shutdown` resolves
pub async fn serve<F>(state: AppState, addr: SocketAddr, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "API listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await
}
