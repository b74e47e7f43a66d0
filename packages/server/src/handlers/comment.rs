use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::comment::{CommentResponse, CreateCommentRequest};
use crate::services::comment_service;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/comments",
    tag = "Comments",
    operation_id = "addComment",
    summary = "Add a comment to a product",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Malformed body (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(product_id = payload.product_id))]
pub async fn add_comment(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let model = comment_service(&state)
        .add(payload.product_id, payload.description)
        .await?;
    let location = format!("/api/v1/comments/{}", model.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CommentResponse::from(model)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/comments/{id}",
    tag = "Comments",
    operation_id = "getComment",
    summary = "Get a comment by ID",
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment", body = CommentResponse),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CommentResponse>, AppError> {
    let model = comment_service(&state).get_by_id(id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    tag = "Comments",
    operation_id = "deleteComment",
    summary = "Delete a comment",
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    comment_service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
