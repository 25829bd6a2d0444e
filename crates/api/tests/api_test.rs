use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use fleet_api::{create_app, AppState};
use fleet_core::config::AppConfig;
use fleet_core::traits::BotRepository;
use fleet_dispatcher::AssignmentCoordinator;
use fleet_infrastructure::InMemoryFleetStore;
use fleet_testing_utils::BotBuilder;
use metrics_exporter_prometheus::PrometheusBuilder;

fn test_app(store: &Arc<InMemoryFleetStore>) -> Router {
    let state = AppState {
        deliveries: store.clone(),
        bots: store.clone(),
        coordinator: Arc::new(AssignmentCoordinator::new(
            store.clone(),
            store.clone(),
            store.clone(),
        )),
        metrics: None,
    };
    create_app(state, &AppConfig::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn delivery_body(zone: &str, creator: &str) -> Value {
    json!({
        "pickup": {"lat": 40.7128, "lon": -74.0060},
        "dropoff": {"lat": 40.7306, "lon": -73.9352},
        "zone_id": zone,
        "creator_id": creator,
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(&InMemoryFleetStore::shared());
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_and_fetch_delivery() {
    let app = test_app(&InMemoryFleetStore::shared());

    let (status, body) = send(
        &app,
        Method::POST,
        "/deliveries",
        Some(delivery_body("Z1", "user-1")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["state"], "pending");
    assert!(body["data"]["assigned_bot_id"].is_null());
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, &format!("/deliveries/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["zone_id"], "Z1");

    let (status, body) = send(&app, Method::GET, "/deliveries/creator/user-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/deliveries/by-date?date={today}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_requests_are_rejected() {
    let app = test_app(&InMemoryFleetStore::shared());

    let mut bad_coordinate = delivery_body("Z1", "user-1");
    bad_coordinate["pickup"]["lat"] = json!(91.0);
    let (status, body) = send(&app, Method::POST, "/deliveries", Some(bad_coordinate)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "invalid_coordinate");

    let (status, _) = send(
        &app,
        Method::POST,
        "/deliveries",
        Some(json!({"zone_id": "Z1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, "/deliveries", Some(delivery_body("", "u"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/deliveries/by-date", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/deliveries/by-date?date=yesterday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/deliveries/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "delivery_not_found");

    let (status, _) = send(&app, Method::GET, "/bots/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_bots_and_list_by_zone() {
    let app = test_app(&InMemoryFleetStore::shared());

    let (status, body) = send(
        &app,
        Method::POST,
        "/bots",
        Some(json!({"location": {"lat": 40.7138, "lon": -74.0070}, "zone_id": "Z1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "available");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    // 机器人只能通过分配变为 busy
    let (status, body) = send(
        &app,
        Method::POST,
        "/bots",
        Some(json!({"location": {"lat": 40.73, "lon": -73.935}, "zone_id": "Z1", "status": "busy"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        Method::POST,
        "/bots",
        Some(json!({"location": {"lat": 40.73, "lon": -73.935}, "zone_id": "Z1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::GET, &format!("/bots/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["zone_id"], "Z1");

    let (status, body) = send(&app, Method::GET, "/bots/by-zone/Z1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, Method::GET, "/bots/by-zone/Z9", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_assign_bot_flow() {
    let store = InMemoryFleetStore::shared();
    for bot in [
        BotBuilder::new().with_id("B1").at(40.7138, -74.0070).build(),
        BotBuilder::new().with_id("B2").at(40.730, -73.935).build(),
    ] {
        BotRepository::create(&*store, &bot).await.unwrap();
    }
    let app = test_app(&store);

    let (_, body) = send(&app, Method::POST, "/deliveries", Some(delivery_body("Z1", "u"))).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::PUT, &format!("/deliveries/assign-bot/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["delivery_id"], id.as_str());
    assert_eq!(body["data"]["bot_id"], "B1");
    assert!(body["data"]["distance_km"].as_f64().unwrap() < 0.2);

    let (_, body) = send(&app, Method::GET, &format!("/deliveries/{id}"), None).await;
    assert_eq!(body["data"]["state"], "assigned");
    assert_eq!(body["data"]["assigned_bot_id"], "B1");

    let (status, body) = send(&app, Method::PUT, &format!("/deliveries/assign-bot/{id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "already_assigned");

    let (status, _) = send(&app, Method::PUT, "/deliveries/assign-bot/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_assign_in_empty_zone_is_service_unavailable() {
    let app = test_app(&InMemoryFleetStore::shared());
    let (_, body) = send(&app, Method::POST, "/deliveries", Some(delivery_body("Z7", "u"))).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::PUT, &format!("/deliveries/assign-bot/{id}"), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "no_bot_available");

    let (_, body) = send(&app, Method::GET, &format!("/deliveries/{id}"), None).await;
    assert_eq!(body["data"]["state"], "pending");
}

#[tokio::test]
async fn test_metrics_endpoint_when_enabled() {
    let store = InMemoryFleetStore::shared();
    let app_without = test_app(&store);
    let (status, _) = send(&app_without, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let handle = PrometheusBuilder::new().build_recorder().handle();
    let state = AppState {
        deliveries: store.clone(),
        bots: store.clone(),
        coordinator: Arc::new(AssignmentCoordinator::new(
            store.clone(),
            store.clone(),
            store.clone(),
        )),
        metrics: Some(handle),
    };
    let app = create_app(state, &AppConfig::default());

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}
