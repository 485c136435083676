//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the database)
//!
//! # Auth
//! POST /auth/signup            - Register an account
//! POST /auth/login             - Login, returns a bearer token
//!
//! # Products
//! POST   /products                  - Create a product (requires auth)
//! GET    /products                  - Approved, visible products (public)
//! GET    /products/all              - All products (admin)
//! PATCH  /products/{id}/approve     - Approve a product (admin)
//! PATCH  /products/{id}/visibility  - Toggle visibility (admin)
//! PUT    /products/{id}             - Update a product (admin)
//! DELETE /products/{id}             - Delete a product (admin)
//!
//! # Users (admin)
//! GET    /users                - Paginated account listing
//! GET    /users/{username}     - Lookup by username
//! PUT    /users/{id}           - Partial update with invariant checks
//! DELETE /users/{id}           - Delete with invariant checks
//! ```

pub mod auth;
pub mod health;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(products::create).get(products::list))
        .route("/all", get(products::list_all))
        .route("/{id}/approve", patch(products::approve))
        .route("/{id}/visibility", patch(products::toggle_visibility))
        .route(
            "/{id}",
            put(products::update).delete(products::delete_product),
        )
}

/// Create the user administration routes router.
///
/// The single path parameter is a username for GET and an account ID for
/// PUT and DELETE.
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/", get(users::list)).route(
        "/{id}",
        get(users::find_by_username)
            .put(users::update)
            .delete(users::delete_user),
    )
}

/// Create the health routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::liveness))
        .route("/ready", get(health::readiness))
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/users", user_routes())
        .nest("/health", health_routes())
}
