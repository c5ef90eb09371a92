// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use dossier_gateway::{GatewayState, ServerConfig, router};
use dossier_test_utils::fixtures::{self, CUSTOMER_A, CUSTOMER_B};
use dossier_test_utils::{MockIdentityResolver, TestHarness};
use serde_json::{Value, json};
use tower::ServiceExt;

const TOKEN: &str = "test-token";

fn config(bearer_token: Option<&str>) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        bearer_token: bearer_token.map(str::to_string),
        request_body_limit: 64 * 1024,
    }
}

fn app(harness: &TestHarness) -> Router {
    router(
        &config(Some(TOKEN)),
        GatewayState {
            service: Arc::clone(&harness.service),
        },
    )
}

fn request(method: &str, uri: &str, body: Option<String>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {TOKEN}"))
        .header("content-type", "application/json");
    builder
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn health_is_public() {
    let harness = TestHarness::new().await.unwrap();
    let app = app(&harness);
    let req = Request::builder()
        .uri("/api/v3/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn responses_carry_cors_headers() {
    let harness = TestHarness::new().await.unwrap();
    let app = app(&harness);
    let req = Request::builder()
        .uri("/api/v3/health")
        .header("origin", "https://portal.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

#[tokio::test]
async fn api_requires_token() {
    let harness = TestHarness::new().await.unwrap();
    let app = app(&harness);
    let req = Request::builder()
        .uri("/api/v3/status")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_token_config_fails_closed() {
    let harness = TestHarness::new().await.unwrap();
    let app = router(
        &config(None),
        GatewayState {
            service: Arc::clone(&harness.service),
        },
    );
    let (status, _) = send(&app, request("GET", "/api/v3/status", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ingest_returns_received() {
    let harness = TestHarness::new().await.unwrap();
    let app = app(&harness);
    let body = fixtures::envelope_json(&fixtures::sms_notification("D1", CUSTOMER_A, 100));
    let (status, body) = send(
        &app,
        request("POST", "/api/v3/notification", Some(body.to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"acknowledge": {"status": "received"}}));

    let uri = format!("/api/v3/demand/list?customerId={CUSTOMER_A}");
    let (status, demands) = send(&app, request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(demands.as_array().unwrap().len(), 1);
    assert_eq!(demands[0]["id"], "D1");
}

#[tokio::test]
async fn demand_list_filters_kind_and_orders_by_date() {
    let harness = TestHarness::new().await.unwrap();
    let app = app(&harness);
    harness
        .ingest(fixtures::sms_notification("D1", CUSTOMER_A, 100))
        .await
        .unwrap();
    harness
        .ingest(fixtures::dashboard_notification("D2", CUSTOMER_A, 200, Some(2), None))
        .await
        .unwrap();

    let base = format!("/api/v3/demand/list?customerId={CUSTOMER_A}");
    let (_, newest_first) = send(&app, request("GET", &base, None)).await;
    assert_eq!(newest_first[0]["id"], "D2");
    assert_eq!(newest_first[1]["id"], "D1");

    let uri = format!("{base}&directionDateOrderBy=ASC");
    let (status, oldest_first) = send(&app, request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(oldest_first[0]["id"], "D1");

    let uri = format!("{base}&notificationType=MYDASHBOARD");
    let (_, dashboards) = send(&app, request("GET", &uri, None)).await;
    assert_eq!(dashboards.as_array().unwrap().len(), 1);
    assert_eq!(dashboards[0]["id"], "D2");

    let uri = format!("{base}&directionDateOrderBy=sideways");
    let (status, body) = send(&app, request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["acknowledge"]["status"], "error");
}

#[tokio::test]
async fn demand_status_lists_matching_demands() {
    let harness = TestHarness::new().await.unwrap();
    let app = app(&harness);
    harness
        .ingest(fixtures::dashboard_notification("D1", CUSTOMER_A, 100, Some(8), None))
        .await
        .unwrap();
    harness
        .ingest(fixtures::dashboard_notification("D2", CUSTOMER_A, 200, Some(2), None))
        .await
        .unwrap();

    let uri = format!("/api/v3/demand/status?customerId={CUSTOMER_A}&listStatus=8,9");
    let (status, closed) = send(&app, request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed.as_array().unwrap().len(), 1);
    assert_eq!(closed[0]["id"], "D1");

    let uri = format!("/api/v3/demand/status?customerId={CUSTOMER_A}&listStatus=2,8&categoryCode=NONE");
    let (status, none) = send(&app, request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(none.as_array().unwrap().is_empty());

    let uri = format!("/api/v3/demand/status?customerId={CUSTOMER_A}");
    let (status, _) = send(&app, request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/v3/demand/status?customerId={CUSTOMER_A}&listStatus=8,closed");
    let (status, _) = send(&app, request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ingest_ignores_unknown_fields_and_reports_warnings() {
    let harness = TestHarness::new().await.unwrap();
    let app = app(&harness);
    let mut body = fixtures::envelope_json(&fixtures::sms_notification("D1", CUSTOMER_A, 100));
    body["notification"]["somethingNew"] = json!(true);
    body["notification"]["demand"]["typeId"] = json!("UNKNOWN");

    let (status, body) = send(
        &app,
        request("POST", "/api/v3/notification", Some(body.to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["acknowledge"]["status"], "warning");
    assert_eq!(
        body["acknowledge"]["warnings"][0]["reason"],
        "Demand Type Id not found"
    );
}

#[tokio::test]
async fn malformed_json_is_400_error_ack() {
    let harness = TestHarness::new().await.unwrap();
    let app = app(&harness);
    let (status, body) = send(
        &app,
        request("POST", "/api/v3/notification", Some("{not json".into())),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["acknowledge"]["status"], "error");
    assert_eq!(body["acknowledge"]["errors"][0]["type"], "NOTIFICATION");

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/v3/notification",
            Some(r#"{"notification": {"date": 1}}"#.into()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn identity_failure_is_500() {
    let identity = Arc::new(MockIdentityResolver::new());
    identity.set_failing(true);
    let harness = TestHarness::builder()
        .with_identity(identity)
        .build()
        .await
        .unwrap();
    let app = app(&harness);
    let body = fixtures::envelope_json(&fixtures::sms_notification("D1", CUSTOMER_A, 100));
    let (status, body) = send(
        &app,
        request("POST", "/api/v3/notification", Some(body.to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["acknowledge"]["errors"][0]["message"],
        "IdentityServiceError"
    );
}

#[tokio::test]
async fn reassign_status_codes() {
    let harness = TestHarness::new().await.unwrap();
    let app = app(&harness);

    let (status, _) = send(
        &app,
        request(
            "PUT",
            "/api/v3/notification/reassign",
            Some(json!({"oldCustomerId": "bad", "newCustomerId": CUSTOMER_B}).to_string()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let merge = json!({"oldCustomerId": CUSTOMER_A, "newCustomerId": CUSTOMER_B}).to_string();
    let (status, body) = send(
        &app,
        request("PUT", "/api/v3/notification/reassign", Some(merge.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["demands"], 0);

    harness
        .ingest(fixtures::sms_notification("D1", CUSTOMER_A, 100))
        .await
        .unwrap();
    let (status, body) = send(
        &app,
        request("PUT", "/api/v3/notification/reassign", Some(merge.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["demands"], 1);
    assert_eq!(body["notifications"], 1);

    harness
        .ingest(fixtures::sms_notification("D1", CUSTOMER_A, 200))
        .await
        .unwrap();
    let (status, body) = send(
        &app,
        request("PUT", "/api/v3/notification/reassign", Some(merge)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["acknowledge"]["status"], "error");
}

#[tokio::test]
async fn temporary_status_admin_flow() {
    let harness = TestHarness::new().await.unwrap();
    let app = app(&harness);

    let (status, created) = send(
        &app,
        request(
            "POST",
            "/api/v3/temporarystatus",
            Some(json!({"label": "A instruire"}).to_string()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let uri = format!("/api/v3/temporarystatus/{id}/generic");
    let (status, _) = send(
        &app,
        request("PUT", &uri, Some(json!({"genericStatusId": 99}).to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, report) = send(
        &app,
        request("PUT", &uri, Some(json!({"genericStatusId": 2}).to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["demandsUpdated"], 0);

    let (status, fetched) = send(
        &app,
        request("GET", &format!("/api/v3/temporarystatus/{id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["genericStatus"], "ONGOING");

    let (status, _) = send(
        &app,
        request("DELETE", &format!("/api/v3/temporarystatus/{id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(
        &app,
        request("GET", &format!("/api/v3/temporarystatus/{id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reference_lists() {
    let harness = TestHarness::new().await.unwrap();
    let app = app(&harness);

    let (_, statuses) = send(&app, request("GET", "/api/v3/status", None)).await;
    assert_eq!(statuses.as_array().unwrap().len(), 8);
    assert_eq!(statuses[7]["isFinal"], true);

    let (_, types) = send(&app, request("GET", "/api/v3/notification/type", None)).await;
    assert_eq!(types[3], "MYDASHBOARD");

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/v3/demandtype",
            Some(json!({"typeId": "T2", "label": "Second"}).to_string()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, demand_types) = send(&app, request("GET", "/api/v3/demandtype", None)).await;
    assert_eq!(demand_types.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn notification_list_and_erasure() {
    let harness = TestHarness::new().await.unwrap();
    let app = app(&harness);
    harness
        .ingest(fixtures::sms_notification("D1", CUSTOMER_A, 100))
        .await
        .unwrap();

    let uri = format!(
        "/api/v3/notification/list?idDemand=D1&idDemandType={}&customerId={CUSTOMER_A}",
        fixtures::DEMAND_TYPE
    );
    let (status, notifications) = send(&app, request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notifications.as_array().unwrap().len(), 1);

    let filtered = format!("{uri}&notificationType=MYDASHBOARD");
    let (_, none) = send(&app, request("GET", &filtered, None)).await;
    assert!(none.as_array().unwrap().is_empty());

    let (status, report) = send(
        &app,
        request("DELETE", &format!("/api/v3/demand/customer/{CUSTOMER_A}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["demands"], 1);
    assert_eq!(report["contents"], 1);

    let (_, after) = send(&app, request("GET", &uri, None)).await;
    assert!(after.as_array().unwrap().is_empty());
}
