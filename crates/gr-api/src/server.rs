//! HTTP API Server
//!
//! Builds the router and runs the axum server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use gr_core::AllowList;
use gr_hangouts::HangoutsWebhook;
use gr_whatsapp::SessionClient;

use crate::routes::routes;

/// Where accepted messages go
#[derive(Clone)]
pub enum Delivery {
    WhatsApp(Arc<dyn SessionClient>),
    Hangouts(Arc<HangoutsWebhook>),
    /// WhatsApp group first, then the webhook with the same message
    Both {
        session: Arc<dyn SessionClient>,
        hangouts: Arc<HangoutsWebhook>,
    },
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub allow_list: Arc<AllowList>,
    pub delivery: Delivery,
}

impl AppState {
    pub fn new(allow_list: AllowList, delivery: Delivery) -> Self {
        Self {
            allow_list: Arc::new(allow_list),
            delivery,
        }
    }
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP API server and run until `shutdown` resolves
pub async fn start_server<F>(addr: SocketAddr, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server is running on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
