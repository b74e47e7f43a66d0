use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};
use tracing::info;

use super::error::ServiceError;
use crate::entity::{comment, product};

pub struct CommentService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> CommentService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Attach a comment to an existing product, stamped with the current time.
    pub async fn add(
        &self,
        product_id: i32,
        description: Option<String>,
    ) -> Result<comment::Model, ServiceError> {
        self.require_product(product_id).await?;

        let new_comment = comment::ActiveModel {
            product_id: Set(product_id),
            description: Set(description),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        match new_comment.insert(self.conn).await {
            Ok(model) => {
                info!(comment_id = model.id, product_id, "Comment added");
                Ok(model)
            }
            // The product was deleted between the lookup and the insert.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))) => {
                Err(ServiceError::product_not_found(product_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<comment::Model, ServiceError> {
        comment::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| ServiceError::comment_not_found(id))
    }

    /// Comments of a product, oldest first.
    pub async fn list_for_product(
        &self,
        product_id: i32,
    ) -> Result<Vec<comment::Model>, ServiceError> {
        self.require_product(product_id).await?;

        Ok(comment::Entity::find()
            .filter(comment::Column::ProductId.eq(product_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.conn)
            .await?)
    }

    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let result = comment::Entity::delete_by_id(id).exec(self.conn).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::comment_not_found(id));
        }

        info!(comment_id = id, "Comment deleted");
        Ok(())
    }

    async fn require_product(&self, product_id: i32) -> Result<(), ServiceError> {
        product::Entity::find_by_id(product_id)
            .one(self.conn)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::product_not_found(product_id))
    }
}
