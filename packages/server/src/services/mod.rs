mod comment;
mod error;
mod product;

pub use comment::CommentService;
pub use error::ServiceError;
pub use product::{ImageUpload, ProductDetail, ProductFields, ProductService, ProductSort};

use sea_orm::DatabaseConnection;

use crate::state::AppState;

pub fn product_service(state: &AppState) -> ProductService<'_, DatabaseConnection> {
    ProductService::new(&state.db, state.images.as_ref())
}

pub fn comment_service(state: &AppState) -> CommentService<'_, DatabaseConnection> {
    CommentService::new(&state.db)
}
