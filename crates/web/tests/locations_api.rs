use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use locations::memory::MemoryDatabase;
use serde_json::{json, Value};
use tower::ServiceExt;
use web::{app, WebState};

fn test_app() -> Router {
    app(WebState::new(MemoryDatabase::new()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, "locations.test");
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn send_raw(app: &Router, method: Method, uri: &str, body: &str) -> StatusCode {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap().status()
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, body) = send(app, Method::POST, "/locations", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

fn link<'a>(body: &'a Value, relation: &str) -> Option<&'a str> {
    body["links"]
        .as_array()?
        .iter()
        .find(|link| link["rel"] == relation)
        .and_then(|link| link["href"].as_str())
}

#[tokio::test]
async fn ping_answers_with_pong() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/ping", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "pong!" }));
}

#[tokio::test]
async fn creating_twice_with_same_number_conflicts() {
    let app = test_app();

    let created = create(
        &app,
        json!({ "locationNumber": "HQ-1", "name": "Main", "area": 1000 }),
    )
    .await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["locationNumber"], "HQ-1");
    assert_eq!(created["name"], "Main");
    assert_eq!(created["area"], json!(1000.0));
    assert_eq!(created["parentId"], Value::Null);
    assert_eq!(link(&created, "self"), Some("http://locations.test/locations/1"));
    assert_eq!(link(&created, "parent"), None);

    let (status, body) = send(
        &app,
        Method::POST,
        "/locations",
        Some(json!({ "locationNumber": "HQ-1", "name": "Copy" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Location number must be unique.");
    assert_eq!(body["httpMethod"], "POST");

    let (_, all) = send(&app, Method::GET, "/locations", None).await;
    let matching = all
        .as_array()
        .unwrap()
        .iter()
        .filter(|location| location["locationNumber"] == "HQ-1")
        .count();
    assert_eq!(matching, 1);
}

#[tokio::test]
async fn invalid_input_is_rejected() {
    let app = test_app();

    for body in [
        json!({ "name": "no number" }),
        json!({ "locationNumber": "A", "area": 0.5 }),
        json!({ "locationNumber": "" }),
        json!({ "locationNumber": "A", "color": "red" }),
        json!({ "locationNumber": 12 }),
    ] {
        let (status, response) =
            send(&app, Method::POST, "/locations", Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(response["message"].is_string());
    }

    let status = send_raw(&app, Method::POST, "/locations", "{ not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, all) = send(&app, Method::GET, "/locations", None).await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn unknown_parent_is_rejected() {
    let app = test_app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/locations",
        Some(json!({ "locationNumber": "A", "parentId": 99 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn find_all_resolves_parent_and_children() {
    let app = test_app();
    create(&app, json!({ "locationNumber": "P" })).await;
    let child = create(&app, json!({ "locationNumber": "C", "parentId": 1 })).await;
    assert_eq!(link(&child, "parent"), Some("http://locations.test/locations/1"));

    let (status, all) = send(&app, Method::GET, "/locations", None).await;
    assert_eq!(status, StatusCode::OK);
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);

    let parent = &all[0];
    assert_eq!(parent["id"], 1);
    assert_eq!(parent["parent"], Value::Null);
    assert_eq!(parent["children"][0]["id"], 2);
    assert_eq!(parent["children"][0]["locationNumber"], "C");

    let child = &all[1];
    assert_eq!(child["id"], 2);
    assert_eq!(child["parent"]["id"], 1);
    assert_eq!(child["parent"]["locationNumber"], "P");
    assert_eq!(child["children"], json!([]));
}

#[tokio::test]
async fn find_one_returns_children_or_not_found() {
    let app = test_app();
    create(&app, json!({ "locationNumber": "P" })).await;
    create(&app, json!({ "locationNumber": "C", "parentId": 1 })).await;

    let (status, body) = send(&app, Method::GET, "/locations/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["locationNumber"], "P");
    assert_eq!(body["children"][0]["id"], 2);
    assert!(body.get("parent").is_none());

    let (status, body) = send(&app, Method::GET, "/locations/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["requestedUri"], "/locations/42");

    let (status, _) = send(&app, Method::GET, "/locations/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_merges_only_present_fields() {
    let app = test_app();
    create(
        &app,
        json!({ "locationNumber": "A", "name": "Old", "building": "B1", "area": 10 }),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/locations/1",
        Some(json!({ "name": "New", "building": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "New");
    assert_eq!(body["building"], Value::Null);
    assert_eq!(body["locationNumber"], "A");
    assert_eq!(body["area"], json!(10.0));

    let (_, stored) = send(&app, Method::GET, "/locations/1", None).await;
    assert_eq!(stored["name"], "New");
    assert_eq!(stored["area"], json!(10.0));
}

#[tokio::test]
async fn update_checks_location_number_against_other_records() {
    let app = test_app();
    create(&app, json!({ "locationNumber": "A" })).await;
    create(&app, json!({ "locationNumber": "B" })).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/locations/2",
        Some(json!({ "locationNumber": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/locations/2",
        Some(json!({ "locationNumber": "B", "name": "same number" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "same number");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/locations/2",
        Some(json!({ "locationNumber": "C" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["locationNumber"], "C");
}

#[tokio::test]
async fn update_rejects_bad_requests() {
    let app = test_app();
    create(&app, json!({ "locationNumber": "A" })).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/locations/7",
        Some(json!({ "name": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for patch in [
        json!({ "area": 0 }),
        json!({ "locationNumber": " " }),
        json!({ "id": 5 }),
        json!({ "parentId": 1 }),
        json!({ "parentId": 3 }),
    ] {
        let (status, _) =
            send(&app, Method::PUT, "/locations/1", Some(patch.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{patch}");
    }
}

#[tokio::test]
async fn delete_removes_leaf_locations_only() {
    let app = test_app();
    create(&app, json!({ "locationNumber": "P" })).await;
    create(&app, json!({ "locationNumber": "C", "parentId": 1 })).await;

    let (status, _) = send(&app, Method::DELETE, "/locations/1", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, Method::DELETE, "/locations/2", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::GET, "/locations/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/locations/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/locations/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn links_respect_forwarded_headers() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/locations")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-proto", "https")
        .header("x-forwarded-host", "example.com")
        .header("x-forwarded-prefix", "/api")
        .body(Body::from(json!({ "locationNumber": "A" }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(link(&body, "self"), Some("https://example.com/api/locations/1"));
}

#[tokio::test]
async fn schemas_are_served() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/locations/schema", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Location");

    let (status, body) =
        send(&app, Method::GET, "/locations/input-schema", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "NewLocation");

    let (status, body) =
        send(&app, Method::GET, "/locations/patch-schema", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "LocationPatch");

    let (status, _) = send(
        &app,
        Method::GET,
        "/locations/schema?exampleData=true",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/nothing/here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["httpMethod"], "GET");
    assert_eq!(body["requestedUri"], "/nothing/here");

    let (status, _) = send(&app, Method::GET, "/locations/1/rooms", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_routes_are_not_found_for_every_method() {
    let app = test_app();

    let (status, body) = send(&app, Method::OPTIONS, "/nothing/here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["httpMethod"], "OPTIONS");

    let (status, _) = send(&app, Method::HEAD, "/nothing/here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::HEAD, "/locations/1/rooms", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
