use crate::error::AppError;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Clamp a 1-based page number; missing or non-positive values become 1.
pub fn clamp_page(page: Option<i64>) -> u64 {
    page.filter(|&p| p >= 1).map_or(1, |p| p as u64)
}

/// Clamp a page size into `1..=MAX_PAGE_SIZE`, defaulting to `DEFAULT_PAGE_SIZE`.
pub fn clamp_page_size(size: Option<i64>) -> u64 {
    match size {
        None => DEFAULT_PAGE_SIZE,
        Some(s) => s.clamp(1, MAX_PAGE_SIZE as i64) as u64,
    }
}

/// Validate a trimmed product name (1-256 Unicode characters).
pub fn validate_name(name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 256 {
        return Err(AppError::Validation("Name must be 1-256 characters".into()));
    }
    Ok(())
}

/// Parse a required decimal form field, rejecting NaN and infinities.
pub fn parse_decimal(field: &str, raw: Option<&str>) -> Result<f64, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(format!("Field '{field}' is required")))?;

    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::Validation(format!("Field '{field}' must be a number")))
}
