#![allow(dead_code)]

use agroconnect_api::{
    db::run_migrations,
    dto::{cart::AddToCartRequest, orders::CreateOrderRequest},
    entity::{
        orders::ShippingAddress,
        products::{ActiveModel as ProductActive, Model as ProductModel, ProductImage, ProductImages, StringList},
        sea_orm_active_enums::{Category, ListingStatus, Role, Unit},
        users::ActiveModel as UserActive,
    },
    middleware::auth::AuthUser,
    services::cart_service,
    state::AppState,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, Set};
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret";

/// Fresh migrated database per test. Defaults to in-memory SQLite; point
/// `TEST_DATABASE_URL` at a scratch database to run against Postgres.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let url = std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".into());
    let mut opts = ConnectOptions::new(url);
    // An in-memory SQLite database lives and dies with its single connection.
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let orm = Database::connect(opts).await?;
    run_migrations(&orm).await?;
    Ok(AppState::new(orm, TEST_SECRET))
}

pub async fn create_user(state: &AppState, role: Role) -> anyhow::Result<AuthUser> {
    let id = Uuid::new_v4();
    UserActive {
        id: Set(id),
        name: Set(format!("{} {}", role.as_str(), &id.to_string()[..8])),
        email: Set(format!("{id}@agroconnect.test")),
        role: Set(role),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser { user_id: id, role })
}

pub async fn create_product(
    state: &AppState,
    farmer: &AuthUser,
    name: &str,
    price: Decimal,
    quantity: i32,
) -> anyhow::Result<ProductModel> {
    let now = Utc::now();
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        farmer_id: Set(farmer.user_id),
        name: Set(name.to_string()),
        description: Set(format!("Fresh {name} from the farm")),
        price: Set(price),
        category: Set(Category::Vegetables),
        sub_category: Set(None),
        unit: Set(Unit::Kg),
        quantity: Set(quantity),
        images: Set(ProductImages(vec![ProductImage {
            id: "img-1".into(),
            url: format!("https://images.agroconnect.test/{}.jpg", name.to_lowercase()),
        }])),
        location: Set(None),
        harvest_date: Set(None),
        organic: Set(false),
        certifications: Set(StringList::default()),
        tags: Set(StringList(vec!["fresh".into()])),
        min_order: Set(1),
        max_order: Set(None),
        status: Set(ListingStatus::Available),
        rating: Set(0.0),
        num_reviews: Set(0),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(product)
}

pub async fn add_to_cart(
    state: &AppState,
    buyer: &AuthUser,
    product_id: Uuid,
    quantity: i32,
) -> anyhow::Result<()> {
    cart_service::add_item(
        state,
        buyer,
        AddToCartRequest {
            product_id,
            quantity,
        },
    )
    .await?;
    Ok(())
}

pub fn checkout_request() -> CreateOrderRequest {
    CreateOrderRequest {
        shipping_address: ShippingAddress {
            address: "12 Market Road".into(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
            pincode: "411001".into(),
            phone: "9800000000".into(),
        },
        payment_method: "cod".into(),
    }
}

pub fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}
