use std::collections::HashMap;

use common::ImageStore;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set, TransactionSession, TransactionTrait,
};
use tracing::{info, warn};

use super::error::ServiceError;
use crate::entity::{comment, product};

/// Ordering applied when listing products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    /// Name, then count.
    #[default]
    Name,
    /// Count, then name.
    Count,
}

impl ProductSort {
    /// Parse a client-supplied sort key. Unknown keys fall back to [`ProductSort::Name`].
    pub fn from_key(key: &str) -> Self {
        if key.trim().eq_ignore_ascii_case("count") {
            Self::Count
        } else {
            Self::Name
        }
    }

    fn apply(self, select: Select<product::Entity>) -> Select<product::Entity> {
        let select = match self {
            Self::Name => select
                .order_by_asc(product::Column::Name)
                .order_by_asc(product::Column::Count),
            Self::Count => select
                .order_by_asc(product::Column::Count)
                .order_by_asc(product::Column::Name),
        };
        // Keeps pages stable when both sort keys tie.
        select.order_by_asc(product::Column::Id)
    }
}

/// Scalar product fields supplied on create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    pub count: i32,
}

/// An uploaded image file.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A product together with its comments.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub product: product::Model,
    pub comments: Vec<comment::Model>,
}

pub struct ProductService<'a, C: ConnectionTrait> {
    conn: &'a C,
    images: &'a dyn ImageStore,
}

impl<'a, C> ProductService<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a C, images: &'a dyn ImageStore) -> Self {
        Self { conn, images }
    }

    /// List one page of products with their comments attached.
    ///
    /// `page` is 1-based; a page past the end yields an empty list.
    pub async fn list(
        &self,
        page: u64,
        per_page: u64,
        sort: ProductSort,
    ) -> Result<Vec<ProductDetail>, ServiceError> {
        // Offsets the database cannot bind are past the end anyway.
        let Some(offset) = page_offset(page, per_page) else {
            return Ok(Vec::new());
        };

        let products = sort
            .apply(product::Entity::find())
            .offset(offset)
            .limit(per_page)
            .all(self.conn)
            .await?;

        Ok(self.attach_comments(products).await?)
    }

    /// Get a single product with its comments.
    pub async fn get_by_id(&self, id: i32) -> Result<ProductDetail, ServiceError> {
        let product = self.find(id).await?;
        let comments = self.comments_of(id).await?;
        Ok(ProductDetail { product, comments })
    }

    /// Store the image and persist a new product referencing it.
    pub async fn create(
        &self,
        fields: ProductFields,
        image: Option<ImageUpload>,
    ) -> Result<ProductDetail, ServiceError> {
        let image = image
            .filter(|i| !i.is_empty())
            .ok_or_else(|| ServiceError::Validation("Image is required.".into()))?;

        let image_url = self.images.save(&image.bytes, &image.file_name).await?;

        let new_product = product::ActiveModel {
            name: Set(fields.name),
            count: Set(fields.count),
            size_width: Set(fields.width),
            size_height: Set(fields.height),
            weight: Set(fields.weight),
            image_url: Set(Some(image_url.clone())),
            ..Default::default()
        };

        let model = match new_product.insert(self.conn).await {
            Ok(model) => model,
            Err(e) => {
                self.discard_image(&image_url).await;
                return Err(e.into());
            }
        };

        info!(product_id = model.id, %image_url, "Product created");

        Ok(ProductDetail {
            product: model,
            comments: Vec::new(),
        })
    }

    /// Overwrite every scalar field of a product, optionally replacing its image.
    ///
    /// An image part without bytes counts as "no new image".
    pub async fn update(
        &self,
        id: i32,
        fields: ProductFields,
        image: Option<ImageUpload>,
    ) -> Result<ProductDetail, ServiceError> {
        let existing = self.find(id).await?;
        let old_url = existing.image_url.clone();

        let new_url = match image.filter(|i| !i.is_empty()) {
            Some(image) => Some(self.images.save(&image.bytes, &image.file_name).await?),
            None => None,
        };

        let mut active: product::ActiveModel = existing.into();
        active.name = Set(fields.name);
        active.count = Set(fields.count);
        active.size_width = Set(fields.width);
        active.size_height = Set(fields.height);
        active.weight = Set(fields.weight);
        if let Some(ref url) = new_url {
            active.image_url = Set(Some(url.clone()));
        }

        let model = match active.update(self.conn).await {
            Ok(model) => model,
            Err(e) => {
                if let Some(ref url) = new_url {
                    self.discard_image(url).await;
                }
                return Err(match e {
                    DbErr::RecordNotUpdated => ServiceError::product_not_found(id),
                    other => other.into(),
                });
            }
        };

        if new_url.is_some()
            && let Some(old) = old_url
        {
            self.discard_image(&old).await;
        }

        let comments = self.comments_of(id).await?;
        Ok(ProductDetail {
            product: model,
            comments,
        })
    }

    /// Delete a product and its comments, then its image file.
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let txn = self.conn.begin().await?;

        let existing = product::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::product_not_found(id))?;

        let removed = comment::Entity::delete_many()
            .filter(comment::Column::ProductId.eq(id))
            .exec(&txn)
            .await?;
        product::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        info!(
            product_id = id,
            comments_removed = removed.rows_affected,
            "Product deleted"
        );

        if let Some(url) = existing.image_url {
            self.discard_image(&url).await;
        }

        Ok(())
    }

    /// Acknowledge a checkout request. Quantities are not reserved or charged.
    pub fn checkout(&self, lines: &[(i32, i32)]) {
        let units: i64 = lines.iter().map(|&(_, qty)| i64::from(qty)).sum();
        info!(lines = lines.len(), units, "Checkout acknowledged");
    }

    async fn find(&self, id: i32) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| ServiceError::product_not_found(id))
    }

    async fn comments_of(&self, product_id: i32) -> Result<Vec<comment::Model>, DbErr> {
        comment::Entity::find()
            .filter(comment::Column::ProductId.eq(product_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.conn)
            .await
    }

    async fn attach_comments(
        &self,
        products: Vec<product::Model>,
    ) -> Result<Vec<ProductDetail>, DbErr> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = products.iter().map(|p| p.id).collect();
        let comments = comment::Entity::find()
            .filter(comment::Column::ProductId.is_in(ids))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.conn)
            .await?;

        let mut by_product: HashMap<i32, Vec<comment::Model>> = HashMap::new();
        for c in comments {
            by_product.entry(c.product_id).or_default().push(c);
        }

        Ok(products
            .into_iter()
            .map(|product| {
                let comments = by_product.remove(&product.id).unwrap_or_default();
                ProductDetail { product, comments }
            })
            .collect())
    }

    /// Best-effort removal of a stored image; failures are logged and ignored.
    async fn discard_image(&self, url: &str) {
        match self.images.delete(url).await {
            Ok(true) => {}
            Ok(false) => warn!(%url, "Image file already absent"),
            Err(e) => warn!(%url, error = %e, "Failed to delete image file"),
        }
    }
}

/// Row offset of a 1-based page, or `None` when it does not fit in an `i64`.
fn page_offset(page: u64, per_page: u64) -> Option<u64> {
    page.saturating_sub(1)
        .checked_mul(per_page)
        .filter(|&offset| offset <= i64::MAX as u64)
}
