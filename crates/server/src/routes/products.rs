//! Product catalog handlers.
//!
//! Creation requires any authenticated account; the public listing is
//! unauthenticated; everything else is admin-only.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

use shoplite_core::{Page, ProductId};

use crate::error::ApiError;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{Product, ProductListing};
use crate::routes::users::PaginationQuery;
use crate::services::{NewProductRequest, UpdateProductRequest};
use crate::state::AppState;

/// A product as rendered to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Decimal,
    pub added_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_by_username: Option<String>,
    pub is_approved: bool,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.into(),
            name: product.name,
            description: product.description,
            price: product.price,
            added_by: product.added_by.into(),
            added_by_username: None,
            is_approved: product.is_approved,
            visible: product.visible,
            created_at: product.created_at,
        }
    }
}

impl From<ProductListing> for ProductResponse {
    fn from(listing: ProductListing) -> Self {
        let mut response = Self::from(listing.product);
        response.added_by_username = listing.added_by_username;
        response
    }
}

fn listing_body(page: Page<ProductListing>) -> serde_json::Value {
    let products: Vec<ProductResponse> =
        page.items.into_iter().map(ProductResponse::from).collect();

    json!({
        "message": "Products retrieved successfully",
        "products": products,
        "totalPages": page.total_pages,
        "currentPage": page.current_page,
        "totalProducts": page.total_count,
    })
}

/// `POST /products`
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<NewProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.catalog().add(user.id, request).await?;

    tracing::info!(product_id = %product.id, "product created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Product added successfully",
            "product": ProductResponse::from(product),
        })),
    ))
}

/// `GET /products`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .catalog()
        .list_approved(query.to_page_request()?)
        .await?;

    Ok(Json(listing_body(page)))
}

/// `GET /products/all`
pub async fn list_all(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.catalog().list_all(query.to_page_request()?).await?;

    Ok(Json(listing_body(page)))
}

/// `PATCH /products/{id}/approve`
pub async fn approve(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.catalog().approve(&ProductId::new(id)).await?;

    Ok(Json(json!({
        "message": "Product approved",
        "product": ProductResponse::from(product),
    })))
}

/// `PATCH /products/{id}/visibility`
pub async fn toggle_visibility(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .catalog()
        .toggle_visibility(&ProductId::new(id))
        .await?;

    Ok(Json(json!({
        "message": "Product visibility updated",
        "product": ProductResponse::from(product),
    })))
}

/// `PUT /products/{id}`
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .catalog()
        .update(&ProductId::new(id), request)
        .await?;

    Ok(Json(json!({
        "message": "Product updated successfully",
        "product": ProductResponse::from(product),
    })))
}

/// `DELETE /products/{id}`
pub async fn delete_product(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.catalog().delete(&ProductId::new(id)).await?;

    Ok(Json(json!({ "message": "Product deleted successfully" })))
}
