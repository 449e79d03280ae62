//! End-to-end tests for the REST surface, driven through the router in-process.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use passdesk_api::ApiServer;
use passdesk_core::config::AppConfig;
use serde_json::{json, Value};
use tower::ServiceExt;

const ADMIN_KEY: &str = "test-admin";

fn test_router() -> Router {
    let mut config = AppConfig::default();
    config.auth.admin_key = ADMIN_KEY.to_string();
    ApiServer::new(config).unwrap().router()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn request(method: &str, uri: &str, key: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {key}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn create_tenant(app: &Router, name: &str, program: Value) -> String {
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/tenants")
        .header("x-admin-key", ADMIN_KEY)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "name": name, "program": program }).to_string()))
        .unwrap();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["apiKey"].as_str().unwrap().to_string()
}

fn standard_program() -> Value {
    json!({
        "metric": "points",
        "thresholds": { "tier1Max": 1000, "tier2Max": 5000, "tier3Max": 10000 },
        "tierSystem": "loyalty",
        "pointsPerDollar": 1
    })
}

async fn enroll(app: &Router, key: &str, pass: &str, source: &str, status: &str, points: i64) -> String {
    let (code, body) = send(
        app,
        request(
            "POST",
            "/api/v1/members",
            Some(key),
            Some(json!({
                "externalPassId": pass,
                "source": source,
                "status": status,
                "pointsBalance": points
            })),
        ),
    )
    .await;
    assert_eq!(code, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = test_router();
    let (status, body) = send(&app, request("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_tenant_creation_requires_admin_key() {
    let app = test_router();
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/tenants")
        .header("x-admin-key", "wrong")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "name": "Acme" }).to_string()))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn test_tenant_routes_require_bearer() {
    let app = test_router();
    let (status, body) = send(&app, request("GET", "/api/v1/members", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["data"].is_null());

    let (status, _) = send(&app, request("GET", "/api/v1/members", Some("bogus"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_member_tier_badge() {
    let app = test_router();
    let key = create_tenant(&app, "Acme Coffee", standard_program()).await;
    let id = enroll(&app, &key, "pass-1", "SMARTPASS", "INSTALLED", 1001).await;

    let (status, body) = send(
        &app,
        request("GET", &format!("/api/v1/members/{id}/tier"), Some(&key), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let badge = &body["data"];
    assert_eq!(badge["level"], 2);
    assert_eq!(badge["name"], "Silver");
    assert_eq!(badge["progress"]["amountToNext"], 3999);
    assert_eq!(badge["progress"]["nextThreshold"], 5000);
    assert!(body["metadata"]["requestId"].is_string());
}

#[tokio::test]
async fn test_members_isolated_between_tenants() {
    let app = test_router();
    let key_a = create_tenant(&app, "Tenant A", standard_program()).await;
    let key_b = create_tenant(&app, "Tenant B", standard_program()).await;
    let id = enroll(&app, &key_a, "pass-1", "CSV", "INSTALLED", 0).await;

    let (status, body) = send(&app, request("GET", "/api/v1/members", Some(&key_b), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (status, body) = send(
        &app,
        request("GET", &format!("/api/v1/members/{id}"), Some(&key_b), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_program_update_validates_thresholds() {
    let app = test_router();
    let key = create_tenant(&app, "Acme", standard_program()).await;

    let bad = json!({ "thresholds": { "tier1Max": 5000, "tier2Max": 1000 } });
    let (status, body) = send(&app, request("PUT", "/api/v1/program", Some(&key), Some(bad))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_failed");

    let good = json!({
        "thresholds": { "tier2Max": 500 },
        "tierSystem": "vip",
        "tierNames": { "tier4": "Legend" }
    });
    let (status, body) = send(&app, request("PUT", "/api/v1/program", Some(&key), Some(good))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tierSystem"], "vip");

    let (_, body) = send(&app, request("GET", "/api/v1/program", Some(&key), None)).await;
    assert_eq!(body["data"]["thresholds"]["tier2Max"], 500);
    assert!(body["data"]["thresholds"]["tier1Max"].is_null());
}

#[tokio::test]
async fn test_pos_transaction_upgrades_tier() {
    let app = test_router();
    let key = create_tenant(&app, "Acme", standard_program()).await;
    let id = enroll(&app, &key, "pass-1", "CLAIM_CODE", "INSTALLED", 950).await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/pos/transactions",
            Some(&key),
            Some(json!({ "memberId": id, "amountCents": 10_000 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let outcome = &body["data"];
    assert_eq!(outcome["pointsEarned"], 100);
    assert_eq!(outcome["newPointsBalance"], 1050);
    assert_eq!(outcome["previousTier"], 1);
    assert_eq!(outcome["tier"], 2);
    assert_eq!(outcome["tierChanged"], true);
}

#[tokio::test]
async fn test_enrollment_analytics_and_webhook() {
    let app = test_router();
    let key = create_tenant(&app, "Acme", standard_program()).await;
    enroll(&app, &key, "p-1", "CSV", "INSTALLED", 0).await;
    enroll(&app, &key, "p-2", "CSV", "INSTALLED", 2000).await;
    enroll(&app, &key, "p-3", "SMARTPASS", "INSTALLED", 20000).await;

    // Second CSV pass is removed from the wallet.
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/webhooks/wallet",
            Some(&key),
            Some(json!({ "externalPassId": "p-2", "event": "uninstalled" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "UNINSTALLED");

    let (status, body) = send(
        &app,
        request("GET", "/api/v1/analytics/enrollment", Some(&key), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["totals"]["total"], 3);
    assert_eq!(data["totals"]["active"], 2);
    assert_eq!(data["totals"]["churned"], 1);
    assert_eq!(data["bySource"]["CSV"]["total"], 2);
    assert_eq!(data["bySource"]["CSV"]["active"], 1);
    assert_eq!(data["bySource"]["CSV"]["churned"], 1);
    assert_eq!(data["sources"]["csv"]["retentionRate"], 50);
    assert_eq!(data["sources"]["claimCode"]["total"], 0);
    assert_eq!(data["tierDistribution"]["tier1"], 1);
    assert_eq!(data["tierDistribution"]["tier2"], 1);
    assert_eq!(data["tierDistribution"]["tier4"], 1);
}

#[tokio::test]
async fn test_bulk_import_reports_rejected_rows() {
    let app = test_router();
    let key = create_tenant(&app, "Acme", standard_program()).await;
    let rows = json!({
        "members": [
            { "externalPassId": "c-1", "status": "INSTALLED" },
            { "externalPassId": "c-2" },
            { "externalPassId": "c-1" }
        ]
    });
    let (status, body) = send(
        &app,
        request("POST", "/api/v1/imports/members", Some(&key), Some(rows)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enrolled"], 2);
    assert_eq!(body["data"]["errors"][0]["row"], 2);

    let (_, body) = send(
        &app,
        request("GET", "/api/v1/analytics/enrollment", Some(&key), None),
    )
    .await;
    assert_eq!(body["data"]["sources"]["csv"]["total"], 2);
    assert_eq!(body["data"]["sources"]["csv"]["active"], 1);
}

#[tokio::test]
async fn test_malformed_bodies_use_envelope() {
    let app = test_router();
    let key = create_tenant(&app, "Acme", standard_program()).await;

    let (status, body) = send(
        &app,
        request("POST", "/api/v1/members", Some(&key), Some(json!({ "source": 5 }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "validation_failed");
    assert!(body["metadata"]["requestId"].is_string());

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/pos/transactions")
        .header(header::AUTHORIZATION, format!("Bearer {key}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "validation_failed");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_invalid_member_id_uses_envelope() {
    let app = test_router();
    let key = create_tenant(&app, "Acme", standard_program()).await;

    for uri in ["/api/v1/members/not-a-uuid", "/api/v1/members/not-a-uuid/tier"] {
        let (status, body) = send(&app, request("GET", uri, Some(&key), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "validation_failed");
    }
}
