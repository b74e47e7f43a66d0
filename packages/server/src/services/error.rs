use common::StorageError;
use sea_orm::DbErr;

/// Failure of a catalog service operation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Db(#[from] DbErr),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServiceError {
    pub fn product_not_found(id: i32) -> Self {
        Self::NotFound(format!("Product with ID {id} not found."))
    }

    pub fn comment_not_found(id: i32) -> Self {
        Self::NotFound(format!("Comment with ID {id} not found."))
    }
}
