pub use crate::common::RouteResult;

use axum::Router;
use config::ServerConfig;
use locations::{database::Database, store::LocationStore};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod common;
pub mod config;
pub mod hateoas;
pub mod middleware;

#[derive(Clone)]
pub struct WebState<D>
where
    D: Database + 'static,
{
    pub store: LocationStore<D>,
}

impl<D> WebState<D>
where
    D: Database + 'static,
{
    pub fn new(database: D) -> Self {
        Self {
            store: LocationStore::new(database),
        }
    }
}

/// Builds the complete router serving the location api.
pub fn app<D>(state: WebState<D>) -> Router
where
    D: Database + 'static,
{
    api::routes(state).layer(TraceLayer::new_for_http())
}

pub async fn start_web_server<D>(
    config: &ServerConfig,
    state: WebState<D>,
) -> std::io::Result<()>
where
    D: Database + 'static,
{
    let listener = TcpListener::bind(config.socket_address()).await?;
    log::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("received ctrl-c, shutting down."),
        Err(why) => {
            log::error!("could not listen for ctrl-c: {}", why);
            std::future::pending::<()>().await;
        }
    }
}
