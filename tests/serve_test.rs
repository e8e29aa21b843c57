use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use openapi_from_routes::{manifest::load, routes::docs_router};
use serde_json::Value;
use std::path::Path;
use tower::ServiceExt;

fn router(fixture: &str) -> Router {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(fixture);
    let loaded = load(&path).unwrap();
    docs_router(&loaded.config, &loaded.tree).unwrap()
}

async fn get(router: Router, path: &str) -> (StatusCode, String) {
    let req = Request::builder().uri(path).body(Body::empty()).unwrap();
    let response = router.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_serves_petstore() {
    let router = router("petstore.yaml");

    let (status, body) = get(router.clone(), "/api.json").await;
    assert_eq!(status, StatusCode::OK);
    let spec: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(spec["info"]["title"], "Pet Store");
    assert!(spec["paths"]["/pets"]["post"].is_object());

    let (status, body) = get(router, "/swagger/index.html").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>Pet Store</title>"));
    assert!(body.contains(r#""url":"/api.json""#));
}

#[tokio::test]
async fn test_serves_every_spec_of_a_directory() {
    let router = router("multi");

    let (status, body) = get(router.clone(), "/admin.json").await;
    assert_eq!(status, StatusCode::OK);
    let spec: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(spec["info"]["title"], "Shop Admin");

    let (_, body) = get(router, "/swagger/index.html").await;
    assert!(body.contains(r#""urls.primaryName":"api""#));
    assert!(body.contains(r#""url":"/admin.json""#));
    assert!(body.contains(r#""url":"/api.json""#));
}

#[tokio::test]
async fn test_unknown_document_is_not_found() {
    let (status, _) = get(router("petstore.yaml"), "/admin.json").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
