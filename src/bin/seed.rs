use agroconnect_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::products::CreateProductRequest,
    entity::{
        products::{Column as ProdCol, Entity as Products, Location, ProductImage},
        sea_orm_active_enums::{Category, Role, Unit},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    middleware::auth::{AuthUser, encode_token},
    services::product_service,
    state::AppState,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let state = AppState::new(orm, config.jwt_secret.clone());

    let admin_id = ensure_user(&state, "Admin", "admin@agroconnect.test", Role::Admin).await?;
    let farmer_id = ensure_user(&state, "Ravi Farms", "farmer@agroconnect.test", Role::Farmer).await?;
    let buyer_id = ensure_user(&state, "Asha Buyer", "buyer@agroconnect.test", Role::Buyer).await?;

    seed_products(&state, farmer_id).await?;

    let ttl = chrono::Duration::days(7);
    for (label, id, role) in [
        ("admin", admin_id, Role::Admin),
        ("farmer", farmer_id, Role::Farmer),
        ("buyer", buyer_id, Role::Buyer),
    ] {
        let token = encode_token(&state.jwt_secret, id, role, ttl)?;
        println!("{label} {id}\n  Bearer {token}");
    }

    println!("Seed completed");
    Ok(())
}

async fn ensure_user(state: &AppState, name: &str, email: &str, role: Role) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(&state.orm)
        .await?
    {
        return Ok(existing.id);
    }

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        role: Set(role),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    println!("Ensured user {email} (role={})", role.as_str());
    Ok(user.id)
}

async fn seed_products(state: &AppState, farmer_id: Uuid) -> anyhow::Result<()> {
    let existing = Products::find()
        .filter(ProdCol::FarmerId.eq(farmer_id))
        .count(&state.orm)
        .await?;
    if existing > 0 {
        println!("Products already seeded");
        return Ok(());
    }

    let farmer = AuthUser {
        user_id: farmer_id,
        role: Role::Farmer,
    };
    let products = vec![
        ("Organic Tomatoes", "Vine ripened tomatoes picked this week", Decimal::new(4000, 2), Category::Vegetables, Unit::Kg, 120, true),
        ("Alphonso Mangoes", "Sweet mangoes from coastal orchards", Decimal::new(60000, 2), Category::Fruits, Unit::Dozen, 40, false),
        ("Basmati Rice", "Aged long grain rice", Decimal::new(9500, 2), Category::Grains, Unit::Kg, 500, false),
        ("Cow Milk", "Fresh full cream milk", Decimal::new(5600, 2), Category::Dairy, Unit::Litre, 80, true),
        ("Vermicompost", "Worm castings for healthy soil", Decimal::new(25000, 2), Category::Fertilizers, Unit::Packet, 60, true),
    ];

    for (name, description, price, category, unit, quantity, organic) in products {
        let payload = CreateProductRequest {
            name: name.to_string(),
            description: description.to_string(),
            price,
            category,
            sub_category: None,
            unit,
            quantity,
            images: vec![ProductImage {
                id: Uuid::new_v4().to_string(),
                url: format!("https://images.agroconnect.test/{}.jpg", name.to_lowercase().replace(' ', "-")),
            }],
            location: Some(Location {
                city: Some("Nashik".into()),
                state: Some("Maharashtra".into()),
                pincode: Some("422001".into()),
            }),
            harvest_date: None,
            organic,
            certifications: Vec::new(),
            tags: vec![category.as_str().to_string()],
            min_order: None,
            max_order: None,
        };
        product_service::create_product(state, &farmer, payload).await?;
    }

    println!("Seeded products");
    Ok(())
}
