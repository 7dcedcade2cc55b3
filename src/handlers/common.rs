use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize, IntoParams)]
pub struct PaginationParams {
    #[param(default = 20, minimum = 1, maximum = 100)]
    pub limit: Option<i64>,
    #[param(default = 0, minimum = 0)]
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// `(limit, offset)` with defaults applied and limit clamped to 1..=100
    pub fn resolve(&self) -> (u64, u64) {
        let limit = self.limit.unwrap_or(20).clamp(1, 100) as u64;
        let offset = self.offset.unwrap_or(0).max(0) as u64;
        (limit, offset)
    }
}

/// Reject blank values and values longer than `max_len` characters
pub fn validate_required(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    if value.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(())
}

/// Length check for an optional value; empty strings are allowed
pub fn validate_optional(value: &Option<String>, field: &str, max_len: usize) -> AppResult<()> {
    match value {
        Some(v) if v.chars().count() > max_len => Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max_len
        ))),
        _ => Ok(()),
    }
}
