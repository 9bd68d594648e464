use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Alias, Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{CategoryList, CreateProductRequest, ProductList, UpdateProductRequest},
    entity::{
        products::{
            ActiveModel, Column, Entity as Products, Model as ProductModel, ProductImages,
            StringList,
        },
        sea_orm_active_enums::{Category, ListingStatus, Role},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::{CategorySummary, Product},
    response::{ApiResponse, Meta},
    routes::params::{ProductFilter, ProductQuery, SEARCH_RESULT_CAP, SearchQuery},
    state::AppState,
};

const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 1000;

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.normalize();
    let mut condition = listed_condition(&query.filter());
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(text_match(search, false));
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await?;

    let items: Vec<Product> = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let count = items.len();
    Ok(ApiResponse::success(ProductList { items })
        .with_count(count)
        .with_page(total, Meta::new(page, limit, total)))
}

pub async fn search_products(
    state: &AppState,
    query: SearchQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let mut condition = listed_condition(&query.filter());
    if let Some(q) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(text_match(q, true));
    }

    let items: Vec<Product> = Products::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt)
        .limit(SEARCH_RESULT_CAP)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let count = items.len();
    Ok(ApiResponse::success(ProductList { items }).with_count(count))
}

/// Point lookup; deactivated products stay addressable for order history.
pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = find_product(&state.orm, id).await?;
    Ok(ApiResponse::success(Product::from(product)))
}

pub async fn farmer_products(
    state: &AppState,
    farmer_id: Uuid,
) -> AppResult<ApiResponse<ProductList>> {
    let items: Vec<Product> = Products::find()
        .filter(Column::FarmerId.eq(farmer_id))
        .filter(Column::Status.eq(ListingStatus::Available))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let count = items.len();
    Ok(ApiResponse::success(ProductList { items }).with_count(count))
}

pub async fn my_products(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ProductList>> {
    ensure_role(user, Role::Farmer)?;
    let items: Vec<Product> = Products::find()
        .filter(Column::FarmerId.eq(user.user_id))
        .filter(Column::Status.ne(ListingStatus::Deactivated))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let count = items.len();
    Ok(ApiResponse::success(ProductList { items }).with_count(count))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_role(user, Role::Farmer)?;
    let min_order = payload.min_order.unwrap_or(1);
    validate_name(&payload.name)?;
    validate_description(&payload.description)?;
    validate_stock_fields(payload.price, payload.quantity, min_order, payload.max_order)?;

    let now = Utc::now();
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        farmer_id: Set(user.user_id),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        price: Set(payload.price),
        category: Set(payload.category),
        sub_category: Set(payload.sub_category),
        unit: Set(payload.unit),
        quantity: Set(payload.quantity),
        images: Set(ProductImages(payload.images)),
        location: Set(payload.location),
        harvest_date: Set(payload.harvest_date),
        organic: Set(payload.organic),
        certifications: Set(StringList(payload.certifications)),
        tags: Set(StringList(payload.tags)),
        min_order: Set(min_order),
        max_order: Set(payload.max_order),
        status: Set(ListingStatus::Available),
        rating: Set(0.0),
        num_reviews: Set(0),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(product_id = %product.id, farmer_id = %user.user_id, "product created");
    audit::record(
        &state.orm,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(Product::from(product)))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_role(user, Role::Farmer)?;
    let existing = find_owned_product(&state.orm, user, id, "update").await?;

    let price = payload.price.unwrap_or(existing.price);
    let quantity = payload.quantity.unwrap_or(existing.quantity);
    let min_order = payload.min_order.unwrap_or(existing.min_order);
    let max_order = payload.max_order.or(existing.max_order);
    validate_stock_fields(price, quantity, min_order, max_order)?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        validate_name(&name)?;
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        validate_description(&description)?;
        active.description = Set(description);
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(sub_category) = payload.sub_category {
        active.sub_category = Set(Some(sub_category));
    }
    if let Some(unit) = payload.unit {
        active.unit = Set(unit);
    }
    if let Some(images) = payload.images {
        active.images = Set(ProductImages(images));
    }
    if let Some(location) = payload.location {
        active.location = Set(Some(location));
    }
    if let Some(harvest_date) = payload.harvest_date {
        active.harvest_date = Set(Some(harvest_date));
    }
    if let Some(organic) = payload.organic {
        active.organic = Set(organic);
    }
    if let Some(certifications) = payload.certifications {
        active.certifications = Set(StringList(certifications));
    }
    if let Some(tags) = payload.tags {
        active.tags = Set(StringList(tags));
    }
    if let Some(available) = payload.is_available {
        active.status = Set(if available {
            ListingStatus::Available
        } else {
            ListingStatus::Unavailable
        });
    }
    active.price = Set(price);
    active.quantity = Set(quantity);
    active.min_order = Set(min_order);
    active.max_order = Set(max_order);
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(Product::from(product)))
}

/// Soft delete: the row stays so historical orders can still resolve it.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_role(user, Role::Farmer)?;
    let existing = find_owned_product(&state.orm, user, id, "delete").await?;

    let mut active: ActiveModel = existing.into();
    active.status = Set(ListingStatus::Deactivated);
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    tracing::info!(product_id = %id, farmer_id = %user.user_id, "product deactivated");
    audit::record(
        &state.orm,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(serde_json::json!({})).with_message("Product deleted successfully"))
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let mut items = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        let product_count = Products::find()
            .filter(Column::Category.eq(category))
            .filter(Column::Status.eq(ListingStatus::Available))
            .count(&state.orm)
            .await?;
        items.push(CategorySummary {
            slug: category,
            name: category.display_name().to_string(),
            product_count,
        });
    }

    let count = items.len();
    Ok(ApiResponse::success(CategoryList { items }).with_count(count))
}

pub(crate) async fn find_product<C>(db: &C, id: Uuid) -> AppResult<ProductModel>
where
    C: ConnectionTrait,
{
    Products::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))
}

async fn find_owned_product<C>(
    db: &C,
    user: &AuthUser,
    id: Uuid,
    action: &str,
) -> AppResult<ProductModel>
where
    C: ConnectionTrait,
{
    let product = find_product(db, id).await?;
    if product.status == ListingStatus::Deactivated {
        return Err(AppError::not_found("Product"));
    }
    if product.farmer_id != user.user_id {
        return Err(AppError::Forbidden(format!(
            "Not authorized to {action} this product"
        )));
    }
    Ok(product)
}

/// Publicly listed products narrowed by the structured filters.
fn listed_condition(filter: &ProductFilter) -> Condition {
    let mut condition = Condition::all().add(Column::Status.eq(ListingStatus::Available));
    if let Some(category) = filter.category {
        condition = condition.add(Column::Category.eq(category));
    }
    if let Some(farmer) = filter.farmer {
        condition = condition.add(Column::FarmerId.eq(farmer));
    }
    if let Some(min_price) = filter.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }
    if let Some(max_price) = filter.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }
    if let Some(organic) = filter.organic {
        condition = condition.add(Column::Organic.eq(organic));
    }
    condition
}

const LIKE_ESCAPE: char = '\\';

/// Substring `LIKE` pattern with the term's wildcards taken literally.
fn like_pattern(term: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape(LIKE_ESCAPE)
}

fn text_match(term: &str, include_tags: bool) -> Condition {
    let pattern = like_pattern(term);
    let mut any = Condition::any()
        .add(Expr::expr(Func::lower(Expr::col(Column::Name))).like(pattern.clone()))
        .add(Expr::expr(Func::lower(Expr::col(Column::Description))).like(pattern.clone()));

    let categories = Category::matching(term);
    if !categories.is_empty() {
        any = any.add(Column::Category.is_in(categories));
    }
    if include_tags {
        let tags_text = Expr::col(Column::Tags).cast_as(Alias::new("text"));
        any = any.add(Expr::expr(Func::lower(tags_text)).like(pattern));
    }
    any
}

fn validate_name(name: &str) -> AppResult<()> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err(AppError::BadRequest("Please add a product name".into()));
    }
    if len > MAX_NAME_LEN {
        return Err(AppError::BadRequest(
            "Product name cannot be more than 100 characters".into(),
        ));
    }
    Ok(())
}

fn validate_description(description: &str) -> AppResult<()> {
    let len = description.trim().chars().count();
    if len == 0 {
        return Err(AppError::BadRequest("Please add a description".into()));
    }
    if len > MAX_DESCRIPTION_LEN {
        return Err(AppError::BadRequest(
            "Description cannot be more than 1000 characters".into(),
        ));
    }
    Ok(())
}

fn validate_stock_fields(
    price: Decimal,
    quantity: i32,
    min_order: i32,
    max_order: Option<i32>,
) -> AppResult<()> {
    if price.is_sign_negative() {
        return Err(AppError::BadRequest("Price cannot be negative".into()));
    }
    if quantity < 0 {
        return Err(AppError::BadRequest("Quantity cannot be negative".into()));
    }
    if min_order < 1 {
        return Err(AppError::BadRequest("Minimum order must be at least 1".into()));
    }
    if max_order.is_some_and(|max| max < min_order) {
        return Err(AppError::BadRequest(
            "Maximum order cannot be less than minimum order".into(),
        ));
    }
    Ok(())
}
