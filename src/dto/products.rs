use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::{
        products::{Location, ProductImage},
        sea_orm_active_enums::{Category, Unit},
    },
    models::{CategorySummary, Product},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub sub_category: Option<String>,
    pub unit: Unit,
    pub quantity: i32,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    pub location: Option<Location>,
    pub harvest_date: Option<NaiveDate>,
    #[serde(default)]
    pub organic: bool,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub min_order: Option<i32>,
    pub max_order: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<Category>,
    pub sub_category: Option<String>,
    pub unit: Option<Unit>,
    pub quantity: Option<i32>,
    pub images: Option<Vec<ProductImage>>,
    pub location: Option<Location>,
    pub harvest_date: Option<NaiveDate>,
    pub organic: Option<bool>,
    pub certifications: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub min_order: Option<i32>,
    pub max_order: Option<i32>,
    pub is_available: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<CategorySummary>)]
    pub items: Vec<CategorySummary>,
}
