use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::{ImageUpload, ProductDetail, ProductFields, ProductSort};

use super::comment::CommentResponse;
use super::shared::{clamp_page, clamp_page_size, parse_decimal, validate_name};

/// Physical dimensions of a product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Size {
    #[schema(example = 1.0)]
    pub width: f64,
    #[schema(example = 2.0)]
    pub height: f64,
}

/// Response DTO for a product, comments included.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProductResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Widget")]
    pub name: String,
    #[schema(example = 3)]
    pub count: i32,
    pub size: Size,
    #[schema(example = 0.5)]
    pub weight: f64,
    /// Relative URL of the product image.
    #[schema(example = "/uploads/3f2c6a0e-8d7b-4a59-9b1e-6c2f4d1a7e90.png")]
    pub image_url: Option<String>,
    pub comments: Vec<CommentResponse>,
}

impl From<ProductDetail> for ProductResponse {
    fn from(detail: ProductDetail) -> Self {
        let p = detail.product;
        Self {
            id: p.id,
            name: p.name,
            count: p.count,
            size: Size {
                width: p.size_width,
                height: p.size_height,
            },
            weight: p.weight,
            image_url: p.image_url,
            comments: detail.comments.into_iter().map(Into::into).collect(),
        }
    }
}

/// Paging and ordering for the product list.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// 1-based page number. Values below 1 are treated as 1.
    #[serde(rename = "pageNumber", alias = "page_number")]
    pub page_number: Option<i64>,
    /// Items per page (1-100, default 10).
    #[serde(rename = "pageSize", alias = "page_size")]
    pub page_size: Option<i64>,
    /// `name` (default) or `count`. Unknown values sort by name.
    #[serde(rename = "sortBy", alias = "sort_by")]
    pub sort_by: Option<String>,
}

impl ProductListQuery {
    /// Resolve to `(page, per_page, sort)` with bounds applied.
    pub fn resolve(&self) -> (u64, u64, ProductSort) {
        let sort = self
            .sort_by
            .as_deref()
            .map(ProductSort::from_key)
            .unwrap_or_default();
        (
            clamp_page(self.page_number),
            clamp_page_size(self.page_size),
            sort,
        )
    }
}

/// Raw multipart fields of a product create/update form.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub count: Option<String>,
    pub image: Option<ImageUpload>,
}

impl ProductForm {
    /// Record a text field. Field names are matched case-insensitively and
    /// unknown names are ignored.
    pub fn set_text(&mut self, field: &str, value: String) {
        let slot = match field.to_ascii_lowercase().as_str() {
            "name" => &mut self.name,
            "width" => &mut self.width,
            "height" => &mut self.height,
            "weight" => &mut self.weight,
            "count" => &mut self.count,
            _ => return,
        };
        *slot = Some(value);
    }

    /// Validate the collected fields.
    pub fn into_parts(self) -> Result<(ProductFields, Option<ImageUpload>), AppError> {
        let name = self
            .name
            .ok_or_else(|| AppError::Validation("Field 'name' is required".into()))?;
        validate_name(&name)?;

        let width = parse_decimal("width", self.width.as_deref())?;
        let height = parse_decimal("height", self.height.as_deref())?;
        let weight = parse_decimal("weight", self.weight.as_deref())?;

        let count = match self.count.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(raw) => raw
                .parse::<i32>()
                .ok()
                .filter(|c| *c >= 0)
                .ok_or_else(|| {
                    AppError::Validation("Field 'count' must be a non-negative integer".into())
                })?,
        };

        Ok((
            ProductFields {
                name: name.trim().to_string(),
                width,
                height,
                weight,
                count,
            },
            self.image,
        ))
    }
}

/// One line of a checkout request.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CheckoutItem {
    #[schema(example = 1)]
    pub product_id: i32,
    #[schema(example = 2)]
    pub quantity: i32,
}
