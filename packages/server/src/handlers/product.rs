use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::comment::CommentResponse;
use crate::models::product::*;
use crate::services::{ImageUpload, comment_service, product_service};
use crate::state::AppState;

pub fn product_upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(32 * 1024 * 1024) // 32 MB
}

fn product_location(id: i32) -> String {
    format!("/api/v1/products/{id}")
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "Products",
    operation_id = "listProducts",
    summary = "List products with paging and sorting",
    description = "Returns one page of products, each with its comments. Sorting by `name` \
        orders by name then count; `count` orders by count then name. Unknown sort keys \
        sort by name. Paging values are clamped (page >= 1, 1 <= size <= 100); a page past \
        the end returns an empty list.",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Page of products", body = Vec<ProductResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let (page, per_page, sort) = query.resolve();

    let products = product_service(&state)
        .list(page, per_page, sort)
        .await?;

    Ok(Json(products.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    tag = "Products",
    operation_id = "getProduct",
    summary = "Get a product by ID",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product with comments", body = ProductResponse),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductResponse>, AppError> {
    let detail = product_service(&state).get_by_id(id).await?;
    Ok(Json(detail.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "Products",
    operation_id = "createProduct",
    summary = "Create a product",
    description = "Creates a product from a multipart form. `name`, `width`, `height` and \
        `weight` are required, `count` defaults to 0 and the `image` file part is required. \
        The image is stored under `/uploads` with a generated name that keeps the original \
        extension.",
    request_body(content_type = "multipart/form-data", description = "Product fields and image file"),
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Missing image or invalid field (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (fields, image) = read_product_form(multipart).await?.into_parts()?;

    let detail = product_service(&state).create(fields, image).await?;
    let location = product_location(detail.product.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ProductResponse::from(detail)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    tag = "Products",
    operation_id = "updateProduct",
    summary = "Replace a product's fields",
    description = "Overwrites every scalar field of the product (no merge semantics). When an \
        `image` file part with content is supplied the image is replaced and the previous file \
        is deleted on a best-effort basis.",
    params(("id" = i32, Path, description = "Product ID")),
    request_body(content_type = "multipart/form-data", description = "Product fields and optional image file"),
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid field (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<ProductResponse>, AppError> {
    let (fields, image) = read_product_form(multipart).await?.into_parts()?;

    let detail = product_service(&state).update(id, fields, image).await?;
    Ok(Json(detail.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    tag = "Products",
    operation_id = "deleteProduct",
    summary = "Delete a product",
    description = "Deletes the product and all of its comments, then removes its image file \
        (a missing file is ignored).",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    product_service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/products/checkout",
    tag = "Products",
    operation_id = "checkout",
    summary = "Acknowledge a checkout",
    description = "Accepts a list of product/quantity pairs and acknowledges it. No stock is \
        reserved and nothing is charged.",
    request_body = Vec<CheckoutItem>,
    responses(
        (status = 200, description = "Checkout acknowledged"),
        (status = 400, description = "Malformed body (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, items))]
pub async fn checkout(
    State(state): State<AppState>,
    AppJson(items): AppJson<Vec<CheckoutItem>>,
) -> Result<impl IntoResponse, AppError> {
    let lines: Vec<(i32, i32)> = items
        .iter()
        .map(|item| (item.product_id, item.quantity))
        .collect();

    product_service(&state).checkout(&lines);
    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/comments",
    tag = "Comments",
    operation_id = "listProductComments",
    summary = "List the comments of a product",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Comments, oldest first", body = Vec<CommentResponse>),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_product_comments(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    let comments = comment_service(&state).list_for_product(id).await?;
    Ok(Json(comments.into_iter().map(Into::into).collect()))
}

/// Collect the text fields and the `image` file part of a product form.
async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm, AppError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let Some(name) = field.name().map(str::to_ascii_lowercase) else {
            continue;
        };

        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read image: {e}")))?;
            form.image = Some(ImageUpload {
                file_name,
                bytes: bytes.to_vec(),
            });
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))?;
            form.set_text(&name, text);
        }
    }

    Ok(form)
}
