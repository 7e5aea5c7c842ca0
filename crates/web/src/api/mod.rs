use axum::{
    extract::{OriginalUri, State},
    http::Method,
    response::IntoResponse,
    routing::{get, on},
    Json, Router,
};
use locations::database::Database;
use serde_json::json;

pub mod location_routes;

use crate::{
    common::{route_not_found, RouteErrorResponse, RouteResult, METHOD_FILTER_ALL},
    WebState,
};

pub fn routes<D>(state: WebState<D>) -> Router
where
    D: Database + 'static,
{
    Router::new()
        .route("/ping", get(ping::<D>))
        .nest_service("/locations", location_routes::routes(state.clone()))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn ping<D>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { store }): State<WebState<D>>,
) -> RouteResult<impl IntoResponse>
where
    D: Database + 'static,
{
    store.health_check().await.map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_message("Storage backend is not available.")
            .with_uri(original_uri.path())
    })?;

    Ok(Json(json!({
        "message": "pong!"
    })))
}
