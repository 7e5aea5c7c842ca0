use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, State},
    http::{Method, StatusCode},
    routing::{get, on},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use locations::database::Database;
use model::{
    location::{
        Location, LocationPatch, LocationWithChildren, LocationWithRelations,
        NewLocation,
    },
    WithId,
};
use utility::{id::Id, let_also::LetAlso};

use crate::{
    common::{
        route_not_found, schema, schema_no_example, HateoasResult, RouteErrorResponse,
        RouteResult, METHOD_FILTER_ALL,
    },
    hateoas,
    middleware::base_url::{base_url_middleware, BaseUrl},
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        format!("/locations{}", format_args!($($arg)*))
    };
}

type JsonBody<T> = WithRejection<Json<T>, RouteErrorResponse>;
type IdPath = WithRejection<Path<i32>, RouteErrorResponse>;

pub(crate) fn routes<D>(state: WebState<D>) -> Router
where
    D: Database + 'static,
{
    Router::new()
        .route("/schema", get(schema::<Location>))
        .route("/input-schema", get(schema::<NewLocation>))
        .route("/patch-schema", get(schema_no_example::<LocationPatch>))
        .route("/", get(get_locations::<D>).post(create_location::<D>))
        .route(
            "/:id",
            get(get_location::<D>)
                .put(update_location::<D>)
                .delete(delete_location::<D>),
        )
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn create_location<D>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { store }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    WithRejection(Json(input), _): JsonBody<NewLocation>,
) -> RouteResult<(StatusCode, Json<hateoas::Response<WithId<Location>>>)>
where
    D: Database + 'static,
{
    let error_context = |why: RouteErrorResponse| {
        why.with_method(&Method::POST)
            .with_uri(original_uri.path())
    };

    input
        .validate()
        .map_err(|why| error_context(why.into()))?;

    store
        .create(input)
        .await
        .map(|location| {
            location_hateoas(location, base_url)
                .json()
                .let_owned(|body| (StatusCode::CREATED, body))
        })
        .map_err(|why| error_context(why.into()))
}

async fn get_locations<D>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { store }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> RouteResult<Json<Vec<hateoas::Response<LocationWithRelations>>>>
where
    D: Database + 'static,
{
    store
        .find_all()
        .await
        .map(|locations| {
            locations
                .into_iter()
                .map(|location| location_with_relations_hateoas(location, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(Json)
        })
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn get_location<D>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { store }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    WithRejection(Path(id), _): IdPath,
) -> HateoasResult<LocationWithChildren>
where
    D: Database + 'static,
{
    store
        .find_one(Id::new(id))
        .await
        .map(|location| location_with_children_hateoas(location, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn update_location<D>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { store }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(patch), _): JsonBody<LocationPatch>,
) -> HateoasResult<WithId<Location>>
where
    D: Database + 'static,
{
    let error_context = |why: RouteErrorResponse| {
        why.with_method(&Method::PUT)
            .with_uri(original_uri.path())
    };

    patch
        .validate()
        .map_err(|why| error_context(why.into()))?;

    store
        .update(Id::new(id), patch)
        .await
        .map(|location| location_hateoas(location, base_url).json())
        .map_err(|why| error_context(why.into()))
}

async fn delete_location<D>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { store }): State<WebState<D>>,
    WithRejection(Path(id), _): IdPath,
) -> RouteResult<StatusCode>
where
    D: Database + 'static,
{
    store
        .remove(Id::new(id))
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::DELETE)
                .with_uri(original_uri.path())
        })
}

// - hateoas -

fn location_links<T>(
    builder: hateoas::ResponseBuilder<T>,
    id: Id<Location>,
    parent_id: Option<Id<Location>>,
) -> hateoas::ResponseBuilder<T> {
    builder
        .link("self", resource!("/{}", id))
        .link_option("parent", parent_id.map(|parent| resource!("/{}", parent)))
}

fn location_hateoas(
    location: WithId<Location>,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<WithId<Location>> {
    let id = location.id;
    let parent_id = location.content.parent_id;
    location_links(hateoas::Response::builder(location, base_url), id, parent_id).build()
}

fn location_with_relations_hateoas(
    location: LocationWithRelations,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<LocationWithRelations> {
    let id = location.location.id;
    let parent_id = location.location.content.parent_id;
    location_links(hateoas::Response::builder(location, base_url), id, parent_id).build()
}

fn location_with_children_hateoas(
    location: LocationWithChildren,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<LocationWithChildren> {
    let id = location.location.id;
    let parent_id = location.location.content.parent_id;
    location_links(hateoas::Response::builder(location, base_url), id, parent_id).build()
}
