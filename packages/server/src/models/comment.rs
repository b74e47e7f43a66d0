use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::comment;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCommentRequest {
    #[schema(example = 1)]
    pub product_id: i32,
    #[schema(example = "Arrived slightly scratched")]
    pub description: Option<String>,
}

/// Response DTO for a single comment.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CommentResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 1)]
    pub product_id: i32,
    pub description: Option<String>,
    /// Server-side creation time.
    pub created_at: DateTime<Utc>,
}

impl From<comment::Model> for CommentResponse {
    fn from(m: comment::Model) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            description: m.description,
            created_at: m.created_at,
        }
    }
}
