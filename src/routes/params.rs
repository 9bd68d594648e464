use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entity::sea_orm_active_enums::Category;

pub const DEFAULT_PAGE_SIZE: u64 = 12;
pub const MAX_PAGE_SIZE: u64 = 100;
pub const SEARCH_RESULT_CAP: u64 = 50;
const MAX_OFFSET: u64 = i64::MAX as u64;

/// Resolved `(page, limit, offset)` for a paged query.
pub fn normalize_page(page: Option<u64>, limit: Option<u64>) -> (u64, u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    // Databases reject OFFSET values beyond i64::MAX.
    let offset = (page - 1)
        .checked_mul(limit)
        .map_or(MAX_OFFSET, |offset| offset.min(MAX_OFFSET));
    (page, limit, offset)
}

/// Catalog filters shared by listing and search.
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub category: Option<Category>,
    pub farmer: Option<Uuid>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub organic: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub category: Option<Category>,
    pub farmer: Option<Uuid>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub organic: Option<bool>,
    /// Case-insensitive match against name, description and category.
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ProductQuery {
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            category: self.category,
            farmer: self.farmer,
            min_price: self.min_price,
            max_price: self.max_price,
            organic: self.organic,
        }
    }

    pub fn normalize(&self) -> (u64, u64, u64) {
        normalize_page(self.page, self.limit)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive match against name, description, category and tags.
    pub q: Option<String>,
    pub category: Option<Category>,
    pub farmer: Option<Uuid>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub organic: Option<bool>,
}

impl SearchQuery {
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            category: self.category,
            farmer: self.farmer,
            min_price: self.min_price,
            max_price: self.max_price,
            organic: self.organic,
        }
    }
}
