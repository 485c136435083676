//! End-to-end tests over the HTTP surface.
//!
//! Each test builds the full router over in-memory stores and drives it
//! with `tower::ServiceExt::oneshot`, asserting on status codes and JSON
//! body shapes the way a client would see them.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use shoplite_server::config::ServerConfig;
use shoplite_server::db::memory::{MemoryAccountStore, MemoryCatalogStore};
use shoplite_server::state::AppState;

fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from("mongodb://localhost:27017"),
        database_name: "shoplite-test".to_owned(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        jwt_secret: SecretString::from("kY8#mQ2$vL9@xR4!nT6^wZ1&pC3*uB5%"),
        token_ttl_secs: 3600,
    }
}

fn test_app() -> Router {
    let state = AppState::new(
        test_config(),
        Arc::new(MemoryAccountStore::new()),
        Arc::new(MemoryCatalogStore::new()),
    );
    shoplite_server::app(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn signup(app: &Router, username: &str, role: Option<&str>) -> (StatusCode, Value) {
    let mut body = json!({ "username": username, "password": "correct-horse" });
    if let Some(role) = role {
        body["role"] = json!(role);
    }
    send(app, "POST", "/auth/signup", None, Some(body)).await
}

async fn login(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": username, "password": "correct-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn test_health() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    // Memory stores are always reachable.
    let (status, _) = send(&app, "GET", "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_signup_returns_created_user_without_password() {
    let app = test_app();

    let (status, body) = signup(&app, "alice", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_signup_rejects_duplicate_username() {
    let app = test_app();
    signup(&app, "alice", None).await;

    let (status, body) = signup(&app, "alice", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User already exists");
}

#[tokio::test]
async fn test_signup_rejects_second_admin() {
    let app = test_app();
    let (status, _) = signup(&app, "alice", Some("admin")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = signup(&app, "bob", Some("admin")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "There can be only one admin");
}

#[tokio::test]
async fn test_login_success_and_failure() {
    let app = test_app();
    signup(&app, "alice", None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "correct-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert!(body["token"].as_str().is_some());

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_admin_routes_reject_anonymous_and_non_admin() {
    let app = test_app();
    signup(&app, "alice", Some("admin")).await;
    signup(&app, "bob", None).await;
    let user_token = login(&app, "bob").await;

    // No token at all.
    let (status, body) = send(&app, "GET", "/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Access denied");

    // Garbage token.
    let (status, body) = send(&app, "GET", "/users", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");

    // Valid token, wrong role.
    let (status, body) = send(&app, "GET", "/users", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access only");
}

#[tokio::test]
async fn test_product_lifecycle() {
    let app = test_app();
    signup(&app, "admin", Some("admin")).await;
    signup(&app, "alice", None).await;
    let admin_token = login(&app, "admin").await;
    let alice_token = login(&app, "alice").await;

    // Creation requires a token.
    let new_product = json!({ "name": "Lamp", "price": "19.99" });
    let (status, _) = send(&app, "POST", "/products", None, Some(new_product.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        "/products",
        Some(&alice_token),
        Some(new_product),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Product added successfully");
    assert_eq!(body["product"]["isApproved"], false);
    assert_eq!(body["product"]["visible"], true);
    let id = body["product"]["id"].as_str().unwrap().to_owned();

    // Unapproved products are absent from the public listing but present
    // in the admin listing.
    let (status, body) = send(&app, "GET", "/products", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalProducts"], 0);

    let (status, body) = send(&app, "GET", "/products/all", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalProducts"], 1);

    // Approval is admin-only.
    let approve_uri = format!("/products/{id}/approve");
    let (status, _) = send(&app, "PATCH", &approve_uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "PATCH", &approve_uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product approved");

    let (status, body) = send(&app, "GET", "/products", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalProducts"], 1);
    assert_eq!(body["message"], "Products retrieved successfully");
    assert_eq!(body["products"][0]["addedByUsername"], "alice");

    // Toggling visibility hides it again.
    let toggle_uri = format!("/products/{id}/visibility");
    let (status, body) = send(&app, "PATCH", &toggle_uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["visible"], false);

    let (_, body) = send(&app, "GET", "/products", None, None).await;
    assert_eq!(body["totalProducts"], 0);

    // Update and delete.
    let update_uri = format!("/products/{id}");
    let (status, body) = send(
        &app,
        "PUT",
        &update_uri,
        Some(&admin_token),
        Some(json!({ "price": "24.50" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["price"], "24.50");

    let (status, body) = send(&app, "DELETE", &update_uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted successfully");

    let (status, body) = send(&app, "PATCH", &approve_uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
async fn test_user_listing_pagination_shape() {
    let app = test_app();
    signup(&app, "admin", Some("admin")).await;
    for i in 0..14 {
        signup(&app, &format!("user-{i:02}"), None).await;
    }
    let token = login(&app, "admin").await;

    let (status, body) = send(&app, "GET", "/users?page=2&limit=10", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Users retrieved successfully");
    assert_eq!(body["totalCount"], 15);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["currentPage"], 2);
    assert_eq!(body["users"].as_array().unwrap().len(), 5);

    // Zero is not a valid page.
    let (status, _) = send(&app, "GET", "/users?page=0", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_lookup_update_and_delete() {
    let app = test_app();
    signup(&app, "admin", Some("admin")).await;
    let (_, body) = signup(&app, "bob", None).await;
    let bob_id = body["user"]["id"].as_str().unwrap().to_owned();
    let token = login(&app, "admin").await;

    let (status, body) = send(&app, "GET", "/users/bob", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "bob");

    let (status, body) = send(&app, "GET", "/users/nobody", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    // Promoting bob while an admin exists is refused.
    let uri = format!("/users/{bob_id}");
    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "There can only be one admin. Please assign the role as user."
    );

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "username": "robert" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User updated successfully");
    assert_eq!(body["user"]["username"], "robert");

    let (status, body) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");
}

#[tokio::test]
async fn test_sole_admin_cannot_be_demoted_or_deleted() {
    let app = test_app();
    let (_, body) = signup(&app, "admin", Some("admin")).await;
    let admin_id = body["user"]["id"].as_str().unwrap().to_owned();
    let token = login(&app, "admin").await;

    let uri = format!("/users/{admin_id}");
    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "role": "user" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "There must be at least one admin. You cannot change the only admin to user."
    );

    let (status, body) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "There must be at least one admin. You cannot delete the only admin."
    );
}
