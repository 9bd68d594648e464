use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    cart_items, order_items, orders,
    orders::ShippingAddress,
    products,
    products::{Location, ProductImage},
    sea_orm_active_enums::{Category, ListingStatus, OrderStatus, Role, Unit},
    users,
};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<users::Model> for UserSummary {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub farmer: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub sub_category: Option<String>,
    pub unit: Unit,
    pub quantity: i32,
    pub images: Vec<ProductImage>,
    pub location: Option<Location>,
    pub harvest_date: Option<NaiveDate>,
    pub organic: bool,
    pub certifications: Vec<String>,
    pub tags: Vec<String>,
    pub min_order: i32,
    pub max_order: Option<i32>,
    pub status: ListingStatus,
    pub is_available: bool,
    pub is_active: bool,
    pub rating: f64,
    pub num_reviews: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            farmer: model.farmer_id,
            name: model.name,
            description: model.description,
            price: model.price,
            category: model.category,
            sub_category: model.sub_category,
            unit: model.unit,
            quantity: model.quantity,
            images: model.images.0,
            location: model.location,
            harvest_date: model.harvest_date,
            organic: model.organic,
            certifications: model.certifications.0,
            tags: model.tags.0,
            min_order: model.min_order,
            max_order: model.max_order,
            status: model.status,
            is_available: model.status.is_available(),
            is_active: model.status.is_active(),
            rating: model.rating,
            num_reviews: model.num_reviews,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// Product fields joined into a cart line for display.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub images: Vec<ProductImage>,
    pub is_available: bool,
    pub quantity: i32,
}

impl From<&products::Model> for CartProduct {
    fn from(model: &products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            price: model.price,
            images: model.images.0.clone(),
            is_available: model.status.is_available(),
            quantity: model.quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: Uuid,
    pub product: Option<CartProduct>,
    pub quantity: i32,
    /// Price captured when the product was first added.
    pub price: Decimal,
}

impl CartLine {
    pub fn new(item: cart_items::Model, product: Option<&products::Model>) -> Self {
        Self {
            id: item.id,
            product: product.map(CartProduct::from),
            quantity: item.quantity,
            price: item.price,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: Uuid,
    pub user: Uuid,
    pub items: Vec<CartLine>,
    pub total_items: i64,
    pub total_amount: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product: Uuid,
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub image: String,
}

impl From<order_items::Model> for OrderLine {
    fn from(model: order_items::Model) -> Self {
        Self {
            product: model.product_id,
            name: model.name,
            quantity: model.quantity,
            price: model.price,
            image: model.image,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer: Option<UserSummary>,
    pub order_items: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub items_price: Decimal,
    pub tax_price: Decimal,
    pub shipping_price: Decimal,
    pub total_price: Decimal,
    pub order_status: OrderStatus,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn from_parts(
        model: orders::Model,
        items: Vec<order_items::Model>,
        buyer: Option<users::Model>,
    ) -> Self {
        Self {
            id: model.id,
            user: model.user_id,
            buyer: buyer.map(UserSummary::from),
            order_items: items.into_iter().map(OrderLine::from).collect(),
            shipping_address: model.shipping_address,
            payment_method: model.payment_method,
            items_price: model.items_price,
            tax_price: model.tax_price,
            shipping_price: model.shipping_price,
            total_price: model.total_price,
            order_status: model.order_status,
            is_delivered: model.is_delivered,
            delivered_at: model.delivered_at.map(|dt| dt.with_timezone(&Utc)),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub slug: Category,
    pub name: String,
    pub product_count: u64,
}
