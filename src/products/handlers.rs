use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::dto::{ListQuery, ListResponse, MessageResponse};
use super::repo_types::{Product, ProductFilter};
use super::validation::{validate_new, validate_patch};
use crate::{
    auth::ApiCaller,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[instrument(skip(state, query))]
pub async fn list_products(
    State(state): State<AppState>,
    caller: ApiCaller,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<ListResponse>> {
    let Query(q) = query.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let page = q.page()?;
    let filter = ProductFilter::new(q.category, q.search);

    let total = state
        .store
        .count(&filter)
        .await
        .map_err(|e| store_failure(&state, "count products", e))?;
    let data = state
        .store
        .find(&filter, page)
        .await
        .map_err(|e| store_failure(&state, "list products", e))?;

    Ok(Json(ListResponse {
        total,
        page: page.page,
        limit: page.limit,
        data,
    }))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    caller: ApiCaller,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    let id = parse_id(&id)?;
    state
        .store
        .find_by_id(id)
        .await
        .map_err(|e| store_failure(&state, "get product", e))?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[instrument(skip(state, body))]
pub async fn create_product(
    State(state): State<AppState>,
    caller: ApiCaller,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, [(header::HeaderName, String); 1], Json<Product>)> {
    let new = validate_new(&read_body(body)?)?;

    let product = state
        .store
        .create(new)
        .await
        .map_err(|e| write_failure(&state, "create product", e))?;

    info!(product_id = %product.id, %caller, "product created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/products/{}", product.id))],
        Json(product),
    ))
}

#[instrument(skip(state, body))]
pub async fn update_product(
    State(state): State<AppState>,
    caller: ApiCaller,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    let patch = validate_patch(&read_body(body)?)?;
    let id = parse_id(&id)?;

    let product = state
        .store
        .update_by_id(id, patch)
        .await
        .map_err(|e| write_failure(&state, "update product", e))?
        .ok_or(ApiError::NotFound)?;

    info!(product_id = %product.id, %caller, "product updated");
    Ok(Json(product))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    caller: ApiCaller,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;

    state
        .store
        .delete_by_id(id)
        .await
        .map_err(|e| store_failure(&state, "delete product", e))?
        .ok_or(ApiError::NotFound)?;

    info!(product_id = %id, %caller, "product deleted");
    Ok(Json(MessageResponse {
        message: "Product deleted successfully".into(),
    }))
}

/// Anything that isn't a UUID can't name a stored product.
fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

fn read_body(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    body.map(|Json(v)| v)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}

fn store_failure(state: &AppState, op: &'static str, e: anyhow::Error) -> ApiError {
    error!(error = %format!("{e:#}"), op, "store operation failed");
    ApiError::internal(format!("{e:#}"), state.config.expose_error_details)
}

fn write_failure(state: &AppState, op: &'static str, e: anyhow::Error) -> ApiError {
    error!(error = %format!("{e:#}"), op, "store rejected write");
    if state.config.expose_error_details {
        ApiError::BadRequest(format!("{e:#}"))
    } else {
        ApiError::BadRequest("Product could not be saved".into())
    }
}
