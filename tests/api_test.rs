//! HTTP API Integration Tests
//!
//! Drives the full router (pages + API) against a temp topology file.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use netinv::{Config, DashboardServer, TopologyStore};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const SEED: &str = r#"{
  "devices": [
    {
      "id": 1,
      "hostname": "core-1",
      "management_ip": "10.0.0.1",
      "type": "router",
      "interfaces": [{"name": "Gi0/0", "status": "up"}],
      "vlans": [{"id": 10, "name": "mgmt"}],
      "logs": [
        {"level": "INFO", "time": "2024-05-01T10:00:00Z", "message": "boot"},
        {"level": "ERROR", "time": "2024-05-01T11:00:00Z", "message": "bgp down"},
        {"level": "ERROR", "time": "garbage", "message": "no time"}
      ]
    },
    {"id": "sw-2", "hostname": "access-2", "type": "switch"}
  ],
  "links": [{"source": 1, "target": "sw-2", "status": "up", "speed": "10G"}]
}"#;

struct Harness {
    app: Router,
    store: TopologyStore,
    _dir: TempDir,
}

async fn harness() -> Harness {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("devices.txt");
    tokio::fs::write(&path, SEED).await.expect("Failed to seed topology");

    let mut config = Config::with_data_file(&path);
    config.dashboard.log_requests = false;
    let server = DashboardServer::new(config);

    Harness {
        app: server.router(),
        store: TopologyStore::new(path),
        _dir: dir,
    }
}

async fn send(app: &Router, method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Log in and return the `name=value` cookie pair
async fn login(app: &Router) -> String {
    let response = send(
        app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"ip": "10.0.0.1", "username": "op", "password": "x"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert_eq!(json_body(response).await, json!({"ok": true}));

    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_login_devices_logout_cycle() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    let response = send(&h.app, Method::GET, "/api/devices", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["devices"].as_array().unwrap().len(), 2);

    let response = send(&h.app, Method::POST, "/api/logout", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"ok": true}));

    let response = send(&h.app, Method::GET, "/api/devices", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["ok"], false);
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let h = harness().await;

    for uri in [
        "/api/topology",
        "/api/devices",
        "/api/device/1",
        "/api/device/1/logs",
    ] {
        let response = send(&h.app, Method::GET, uri, None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let response = send(
        &h.app,
        Method::PUT,
        "/api/device/1/interfaces",
        None,
        Some(json!({"interfaces": []})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Nothing was written
    let raw = tokio::fs::read_to_string(h.store.path()).await.unwrap();
    assert_eq!(raw, SEED);
}

#[tokio::test]
async fn test_forged_cookie_rejected() {
    let h = harness().await;
    let response = send(
        &h.app,
        Method::GET,
        "/api/devices",
        Some("netinv_session=eyJhbGciOiJIUzI1NiJ9.e30.invalid"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_requires_fields() {
    let h = harness().await;
    let response = send(
        &h.app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"ip": "10.0.0.1", "username": "  ", "password": "x"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(
        json_body(response).await,
        json!({"ok": false, "error": "IP, username and password are required"})
    );
}

#[tokio::test]
async fn test_login_accepts_form_body() {
    let h = harness().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("ip=10.0.0.9&username=op&password=pw&enable="))
        .unwrap();

    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_some());
}

#[tokio::test]
async fn test_topology_and_device_lookup() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    let body = json_body(send(&h.app, Method::GET, "/api/topology", Some(&cookie), None).await).await;
    assert_eq!(body["links"][0]["speed"], "10G");
    assert_eq!(body["devices"][0]["type"], "router");

    // String id "1" resolves numeric id 1
    let body = json_body(send(&h.app, Method::GET, "/api/device/1", Some(&cookie), None).await).await;
    assert_eq!(body["device"]["hostname"], "core-1");

    let response = send(&h.app, Method::GET, "/api/device/404", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await,
        json!({"ok": false, "error": "Device not found"})
    );
}

#[tokio::test]
async fn test_replace_interfaces_and_vlans() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    let response = send(
        &h.app,
        Method::PUT,
        "/api/device/sw-2/interfaces",
        Some(&cookie),
        Some(json!({"interfaces": [{"name": "Gi1/0/1"}, {"name": "Gi1/0/2"}]})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["device"]["interfaces"].as_array().unwrap().len(), 2);

    let response = send(
        &h.app,
        Method::PUT,
        "/api/device/sw-2/vlans",
        Some(&cookie),
        Some(json!({"vlans": [{"id": 20}]})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let topology = h.store.load().await.unwrap();
    let device = topology.find_device("sw-2").unwrap();
    assert_eq!(device.interfaces.as_ref().unwrap()[1]["name"], "Gi1/0/2");
    assert_eq!(device.vlans.as_ref().unwrap()[0]["id"], 20);
    // Other devices and links untouched
    assert_eq!(topology.devices.len(), 2);
    assert_eq!(topology.links.len(), 1);
}

#[tokio::test]
async fn test_replace_interfaces_rejects_object() {
    let h = harness().await;
    let cookie = login(&h.app).await;
    let before = h.store.load().await.unwrap();

    let response = send(
        &h.app,
        Method::PUT,
        "/api/device/1/interfaces",
        Some(&cookie),
        Some(json!({"interfaces": {"name": "Gi0/9"}})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"ok": false, "error": "interfaces must be a list"})
    );

    assert_eq!(h.store.load().await.unwrap(), before);
}

#[tokio::test]
async fn test_write_to_unknown_device() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    let response = send(
        &h.app,
        Method::PUT,
        "/api/device/ghost/meta",
        Some(&cookie),
        Some(json!({"location": "nowhere"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_body() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/api/device/1/vlans")
        .header(header::COOKIE, &cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["ok"], false);
}

#[tokio::test]
async fn test_update_meta_only_location() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    let response = send(
        &h.app,
        Method::PUT,
        "/api/device/1/meta",
        Some(&cookie),
        Some(json!({"location": "rack3", "type": "firewall"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let device = &body["device"];
    assert_eq!(device["location"], "rack3");
    assert_eq!(device["hostname"], "core-1");
    assert_eq!(device["management_ip"], "10.0.0.1");
    assert_eq!(device["type"], "router");
}

#[tokio::test]
async fn test_log_filtering() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    let body = json_body(
        send(&h.app, Method::GET, "/api/device/1/logs?level=ERROR", Some(&cookie), None).await,
    )
    .await;
    assert_eq!(body["logs"].as_array().unwrap().len(), 2);

    let body = json_body(
        send(
            &h.app,
            Method::GET,
            "/api/device/1/logs?level=ERROR&since=2024-05-01T00:00:00Z&until=2024-05-02T00:00:00Z",
            Some(&cookie),
            None,
        )
        .await,
    )
    .await;
    let logs = body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["message"], "bgp down");

    let response = send(&h.app, Method::GET, "/api/device/9/logs", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pages_follow_session() {
    let h = harness().await;

    let response = send(&h.app, Method::GET, "/device/1", None, None).await;
    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/login");

    let cookie = login(&h.app).await;

    let response = send(&h.app, Method::GET, "/", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&h.app, Method::GET, "/device/sw-2", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&html).contains(r#"data-device-id="sw-2""#));

    let response = send(&h.app, Method::GET, "/device/ghost", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_json_lines_file_served_through_api() {
    let h = harness().await;
    let lines = concat!(
        r#"{"_type": "device", "id": 7, "hostname": "edge-7"}"#,
        "\n",
        r#"{"_type": "link", "source": 7, "target": 8}"#,
        "\n",
        r#"{"_type": "comment", "text": "ignored"}"#,
        "\n",
    );
    tokio::fs::write(h.store.path(), lines).await.unwrap();
    let cookie = login(&h.app).await;

    let body = json_body(send(&h.app, Method::GET, "/api/topology", Some(&cookie), None).await).await;
    assert_eq!(body["devices"].as_array().unwrap().len(), 1);
    assert_eq!(body["links"].as_array().unwrap().len(), 1);

    let body = json_body(send(&h.app, Method::GET, "/api/device/7", Some(&cookie), None).await).await;
    assert_eq!(body["device"]["hostname"], "edge-7");
}
