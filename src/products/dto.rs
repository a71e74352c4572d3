use serde::{Deserialize, Serialize};

use super::repo_types::{Page, Product};
use crate::error::ApiError;

/// Query string of `GET /api/products`. Paging values stay raw strings so
/// that bad input gets a proper 400 instead of a generic rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    pub fn page(&self) -> Result<Page, ApiError> {
        Ok(Page {
            page: positive("page", self.page.as_deref(), Page::DEFAULT_PAGE, u64::MAX)?,
            limit: positive("limit", self.limit.as_deref(), Page::DEFAULT_LIMIT, Page::MAX_LIMIT)?,
        })
    }
}

fn positive(name: &str, raw: Option<&str>, default: u64, max: u64) -> Result<u64, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };
    match raw.parse::<u64>() {
        Ok(v) if (1..=max).contains(&v) => Ok(v),
        Ok(_) if max < u64::MAX => Err(ApiError::Validation(format!(
            "{name} must be an integer between 1 and {max}"
        ))),
        _ => Err(ApiError::Validation(format!("{name} must be a positive integer"))),
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub data: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
