use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/comments", comment_routes())
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::product::list_products).post(handlers::product::create_product),
        )
        .route("/checkout", post(handlers::product::checkout))
        .route(
            "/{id}",
            get(handlers::product::get_product)
                .put(handlers::product::update_product)
                .delete(handlers::product::delete_product),
        )
        .route(
            "/{id}/comments",
            get(handlers::product::list_product_comments),
        )
        .layer(handlers::product::product_upload_body_limit())
}

fn comment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::comment::add_comment))
        .route(
            "/{id}",
            get(handlers::comment::get_comment).delete(handlers::comment::delete_comment),
        )
}
