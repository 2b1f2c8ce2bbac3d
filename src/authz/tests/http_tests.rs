//! HTTP API and route guard integration tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use shopdesk_authz::guard::ROLE_HEADER;
use shopdesk_authz::http::{create_router, AppState};
use shopdesk_authz::{AccessEngine, RouteGuardLayer, SessionRole};
use tower::ServiceExt;

fn app() -> Router {
    create_router(AppState::new(AccessEngine::builtin()))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ============================================================================
// DECISION API
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app(), get_request("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], shopdesk_authz::VERSION);
    assert_eq!(body["guarded_routes"], 16);
}

#[tokio::test]
async fn test_catalog_is_grouped() {
    let (status, body) = send(app(), get_request("/v1/catalog")).await;

    assert_eq!(status, StatusCode::OK);
    let categories = body["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 11);
    assert_eq!(categories[1]["category"], "sales");
    assert_eq!(categories[1]["label"], "Sales & POS");
    assert_eq!(categories[1]["permissions"][1]["permission"], "create_sale");
}

#[tokio::test]
async fn test_roles_listing() {
    let (status, body) = send(app(), get_request("/v1/roles")).await;

    assert_eq!(status, StatusCode::OK);
    let roles = body["roles"].as_array().unwrap();
    assert_eq!(roles.len(), 4);
    assert_eq!(roles[0]["key"], "admin");
    assert_eq!(roles[0]["label"], "Administrator");
    assert_eq!(roles[0]["permission_count"], 32);
}

#[tokio::test]
async fn test_role_permissions_for_known_role() {
    let (status, body) = send(app(), get_request("/v1/roles/cashier/permissions")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["known"], true);
    assert_eq!(body["permissions"][0], "view_dashboard");
    assert!(body["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .all(|p| p != "delete_product"));
    assert!(!body["groups"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_role_permissions_for_unknown_role() {
    let (status, body) = send(app(), get_request("/v1/roles/intern/permissions")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["known"], false);
    assert_eq!(body["role"], "intern");
    assert_eq!(body["permissions"], json!([]));
}

#[tokio::test]
async fn test_permission_check() {
    let (status, body) = send(
        app(),
        post_json("/v1/check", json!({"role": "accountant", "permission": "approve_expense"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], true);
    assert_eq!(body["reason"], "granted");

    let (_, body) = send(
        app(),
        post_json("/v1/check", json!({"role": "cashier", "permission": "delete_product"})),
    )
    .await;
    assert_eq!(body["allowed"], false);
    assert_eq!(body["reason"], "missing_permission");
}

#[tokio::test]
async fn test_permission_check_rejects_blank_permission() {
    let (status, body) = send(
        app(),
        post_json("/v1/check", json!({"role": "cashier", "permission": " "})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_permission_check_blank_role_is_unknown_role() {
    let (status, body) = send(
        app(),
        post_json("/v1/check", json!({"role": " ", "permission": "create_sale"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], false);
    assert_eq!(body["reason"], "unknown_role");
}

#[tokio::test]
async fn test_route_check() {
    let (status, body) = send(
        app(),
        post_json("/v1/routes/check", json!({"role": "cashier", "route": "/users/"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["route"], "/users");
    assert_eq!(body["allowed"], false);
    assert_eq!(body["required_permission"], "view_users");

    let (_, body) = send(
        app(),
        post_json("/v1/routes/check", json!({"role": "manager", "route": "/unknown-path"})),
    )
    .await;
    assert_eq!(body["allowed"], true);
    assert_eq!(body["reason"], "unguarded_route");
}

// ============================================================================
// ROUTE GUARD LAYER
// ============================================================================

fn back_office() -> Router {
    Router::new()
        .route("/", get(|| async { "home" }))
        .route("/users", get(|| async { "users" }))
        .route("/reports/financial", get(|| async { "financial" }))
        .layer(RouteGuardLayer::new(AccessEngine::builtin()))
}

fn page(uri: &str, role: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(role) = role {
        builder = builder.header(ROLE_HEADER, role);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_guarded_router_enforces_permissions() {
    let response = back_office().oneshot(page("/users", Some("admin"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = back_office().oneshot(page("/users", Some("cashier"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = back_office()
        .oneshot(page("/reports/financial", Some("accountant")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_guarded_router_public_page_needs_no_role() {
    let response = back_office().oneshot(page("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_guarded_router_uses_session_extension() {
    let mut request = page("/users", None);
    request.extensions_mut().insert(SessionRole("admin".to_string()));

    let response = back_office().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_guarded_router_denies_stale_role() {
    let (status, body) = send(back_office(), page("/users", Some("superuser"))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["required_permission"], "view_users");
    assert_eq!(body["message"], "unknown role has no permissions");
}
