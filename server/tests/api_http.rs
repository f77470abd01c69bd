//! HTTP-level API tests (router + middleware + handlers, in-memory database)
//!
//! Drives the assembled axum router with `tower::ServiceExt::oneshot`,
//! covering the public/authenticated split, role enforcement, the
//! response envelope and the guest ordering flow.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use qrmenu_server::core::{Config, ServerState, build_router};

fn test_config() -> Config {
    let mut config = Config::from_env();
    config.tax_rate = "0.10".parse().unwrap();
    config.admin_email = "admin@example.com".to_string();
    config.admin_password = "admin123".to_string();
    config.frontend_url = "http://localhost:3000".to_string();
    config
}

async fn test_app() -> Router {
    let state = ServerState::initialize_in_memory(&test_config()).await;
    build_router(state)
}

/// Fire one request and parse the JSON body
async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
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

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = call(
        app,
        send_json(
            "POST",
            "/api/auth/login",
            None,
            &json!({"email": email, "password": password}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn admin_token(app: &Router) -> String {
    login(app, "admin@example.com", "admin123").await
}

/// Seed category + item + table through the admin API, returning
/// (item_id, table_id)
async fn seed_catalog(app: &Router, token: &str) -> (String, String) {
    let (status, body) = call(
        app,
        send_json(
            "POST",
            "/api/menu/categories",
            Some(token),
            &json!({"name": "Mains", "display_order": 1}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "category create failed: {body}");
    let category_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        app,
        send_json(
            "POST",
            "/api/menu/items",
            Some(token),
            &json!({
                "name": "Burger",
                "description": "House burger",
                "price": 8.00,
                "category": category_id,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "item create failed: {body}");
    let item_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        app,
        send_json(
            "POST",
            "/api/tables",
            Some(token),
            &json!({"number": "T1", "capacity": 4}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "table create failed: {body}");
    let table_id = body["data"]["id"].as_str().unwrap().to_string();

    (item_id, table_id)
}

#[tokio::test]
async fn test_health_is_public() {
    let app = test_app().await;
    let (status, body) = call(&app, get("/api/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_menu_browse_is_public_but_management_is_not() {
    let app = test_app().await;

    let (status, body) = call(&app, get("/api/menu/categories", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = call(&app, get("/api/menu/items", None)).await;
    assert_eq!(status, StatusCode::OK);

    // Staff surface requires a token
    let (status, body) = call(&app, get("/api/orders", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = call(
        &app,
        send_json("POST", "/api/menu/categories", None, &json!({"name": "X", "display_order": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = test_app().await;
    let (status, _) = call(&app, get("/api/orders", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_validation_errors() {
    let app = test_app().await;
    let (status, body) = call(
        &app,
        send_json(
            "POST",
            "/api/auth/register",
            None,
            &json!({"name": "A", "email": "not-an-email", "password": "123"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Validation failed");
    let errors = body["errors"].as_array().unwrap();
    assert!(!errors.is_empty());
}

#[tokio::test]
async fn test_duplicate_email_conflict() {
    let app = test_app().await;
    let payload = json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "password": "secret123",
    });

    let (status, _) = call(&app, send_json("POST", "/api/auth/register", None, &payload)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, send_json("POST", "/api/auth/register", None, &payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_customer_role_cannot_access_staff_surface() {
    let app = test_app().await;

    let (status, _) = call(
        &app,
        send_json(
            "POST",
            "/api/auth/register",
            None,
            &json!({"name": "Jane Doe", "email": "jane@example.com", "password": "secret123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let token = login(&app, "jane@example.com", "secret123").await;

    let (status, _) = call(&app, get("/api/orders", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, get("/api/orders/analytics", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // But their own order surface works
    let (status, body) = call(&app, get("/api/orders/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_table_resolution_by_slug() {
    let app = test_app().await;
    let token = admin_token(&app).await;
    let (_item_id, _table_id) = seed_catalog(&app, &token).await;

    // Public resolution of the derived slug
    let (status, body) = call(&app, get("/api/tables/by-slug/table-t1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["number"], "T1");
    assert_eq!(body["data"]["qr_slug"], "table-t1");

    // Unknown slugs are indistinguishable from deactivated tables
    let (status, _) = call(&app, get("/api/tables/by-slug/table-nope", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_guest_order_flow_and_status_updates() {
    let app = test_app().await;
    let token = admin_token(&app).await;
    let (item_id, table_id) = seed_catalog(&app, &token).await;

    // Guest places an order without any token
    let (status, body) = call(
        &app,
        send_json(
            "POST",
            "/api/orders",
            None,
            &json!({
                "dining_table": table_id,
                "items": [{"menu_item": item_id, "quantity": 2}],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "order failed: {body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["order_number"], "ORD-000001");
    assert_eq!(body["data"]["status"], "placed");
    assert_eq!(body["data"]["subtotal"], 16.0);
    assert_eq!(body["data"]["tax"], 1.6);
    assert_eq!(body["data"]["total"], 17.6);
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    // Staff drives the lifecycle
    let (status, body) = call(
        &app,
        send_json(
            "PATCH",
            &format!("/api/orders/{order_id}/status"),
            Some(&token),
            &json!({"status": "preparing"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "preparing");

    // Illegal jump is a 400 with both statuses in the message
    let (status, body) = call(
        &app,
        send_json(
            "PATCH",
            &format!("/api/orders/{order_id}/status"),
            Some(&token),
            &json!({"status": "served"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("preparing") && message.contains("served"));

    // Analytics reflect the ledger
    let (status, body) = call(&app, get("/api/orders/analytics", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_orders"], 1);
    assert_eq!(body["data"]["top_items"][0]["name"], "Burger");
    assert_eq!(body["data"]["top_items"][0]["total_quantity"], 2);
}

#[tokio::test]
async fn test_order_rejects_unavailable_item() {
    let app = test_app().await;
    let token = admin_token(&app).await;
    let (item_id, table_id) = seed_catalog(&app, &token).await;

    // Disable the item (staff toggle)
    let (status, _) = call(
        &app,
        send_json(
            "PATCH",
            &format!("/api/menu/items/{item_id}/toggle-availability"),
            Some(&token),
            &json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app,
        send_json(
            "POST",
            "/api/orders",
            None,
            &json!({
                "dining_table": table_id,
                "items": [{"menu_item": item_id, "quantity": 1}],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Burger"));
}

#[tokio::test]
async fn test_qr_generation_returns_data_url() {
    let app = test_app().await;
    let token = admin_token(&app).await;
    let (_item_id, table_id) = seed_catalog(&app, &token).await;

    let (status, body) = call(&app, get(&format!("/api/tables/{table_id}/qr"), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["qr_url"], "http://localhost:3000/m/table-t1");
    assert!(
        body["data"]["qr_code"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,")
    );
}
