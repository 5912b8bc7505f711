//! Admin router tests, driven in-process with `tower::ServiceExt`.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use circuit_guard::admin::setup_admin_router;
use circuit_guard::config::AdminConfig;
use circuit_guard::{BreakerConfig, BreakerRegistry, BreakerResult};

mod common;

fn registry() -> BreakerRegistry {
    let registry = BreakerRegistry::new();
    registry.register(common::reference_config());
    registry.register(BreakerConfig::named("inventory"));
    registry
}

async fn get_json(app: axum::Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1 << 20).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_list_breakers() {
    let app = setup_admin_router(registry(), &AdminConfig::default());

    let (status, json) = get_json(app, "/admin/breakers", None).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["inventory", "reference"]);
}

#[tokio::test]
async fn test_single_breaker_reflects_state() {
    let registry = registry();
    for _ in 0..6 {
        let _: BreakerResult<(), &str> = registry.execute("reference", || Err("down"));
    }
    let app = setup_admin_router(registry, &AdminConfig::default());

    let (status, json) = get_json(app, "/admin/breakers/reference", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "OPEN");
    assert_eq!(json["window_len"], 6);
    assert_eq!(json["failure_rate"], 100.0);
}

#[tokio::test]
async fn test_unknown_breaker_is_404() {
    let app = setup_admin_router(registry(), &AdminConfig::default());
    let (status, _) = get_json(app, "/admin/breakers/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_key_required_when_configured() {
    let config = AdminConfig {
        api_key: "s3cret".into(),
        ..AdminConfig::default()
    };

    let app = setup_admin_router(registry(), &config);
    let (status, _) = get_json(app.clone(), "/admin/status", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get_json(app.clone(), "/admin/status", Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = get_json(app, "/admin/status", Some("s3cret")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "operational");
    assert_eq!(json["breakers"], 2);
}
