use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{AddToCartRequest, UpdateCartItemRequest},
    entity::{
        cart_items::{
            ActiveModel as CartItemActive, Column as CartItemCol, Entity as CartItems,
            Model as CartItemModel,
        },
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts, Model as CartModel},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
        sea_orm_active_enums::Role,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::{Cart, CartLine},
    response::ApiResponse,
    services::product_service::find_product,
    state::AppState,
};

/// Returns the buyer's cart, creating an empty one on first access.
pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Cart>> {
    ensure_role(user, Role::Buyer)?;
    let cart = get_or_create_cart(&state.orm, user.user_id).await?;
    let view = load_cart_view(&state.orm, cart).await?;
    Ok(ApiResponse::success(view))
}

pub async fn add_item(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<Cart>> {
    ensure_role(user, Role::Buyer)?;
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let product = find_product(&state.orm, payload.product_id).await?;
    if !product.status.is_available() {
        return Err(AppError::InvalidState("Product is not available".into()));
    }
    if product.quantity < payload.quantity {
        return Err(AppError::InsufficientStock(format!(
            "Insufficient quantity for {}",
            product.name
        )));
    }

    let cart = get_or_create_cart(&state.orm, user.user_id).await?;

    // A repeat add bumps the existing line; its add-time price is kept.
    let line = CartItemActive {
        id: Set(Uuid::new_v4()),
        cart_id: Set(cart.id),
        product_id: Set(product.id),
        quantity: Set(payload.quantity),
        price: Set(product.price),
        created_at: Set(Utc::now().into()),
    };
    CartItems::insert(line)
        .on_conflict(
            OnConflict::columns([CartItemCol::CartId, CartItemCol::ProductId])
                .value(
                    CartItemCol::Quantity,
                    Expr::col((CartItems, CartItemCol::Quantity)).add(payload.quantity),
                )
                .to_owned(),
        )
        .exec_without_returning(&state.orm)
        .await?;

    let cart = touch_cart(&state.orm, cart).await?;

    tracing::debug!(buyer_id = %user.user_id, product_id = %product.id, quantity = payload.quantity, "cart item added");
    audit::record(
        &state.orm,
        user.user_id,
        "cart_add",
        "cart_items",
        serde_json::json!({ "product_id": product.id, "quantity": payload.quantity }),
    )
    .await;

    let view = load_cart_view(&state.orm, cart).await?;
    Ok(ApiResponse::success(view))
}

/// Overwrites a line's quantity; zero or less drops the line. Stock is not
/// re-checked here, checkout does that.
pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<Cart>> {
    ensure_role(user, Role::Buyer)?;
    let cart = require_cart(&state.orm, user.user_id).await?;

    let item = CartItems::find_by_id(item_id)
        .filter(CartItemCol::CartId.eq(cart.id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Cart item"))?;

    if payload.quantity <= 0 {
        item.delete(&state.orm).await?;
    } else {
        let mut active: CartItemActive = item.into();
        active.quantity = Set(payload.quantity);
        active.update(&state.orm).await?;
    }

    let cart = touch_cart(&state.orm, cart).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "cart_update",
        "cart_items",
        serde_json::json!({ "item_id": item_id, "quantity": payload.quantity }),
    )
    .await;

    let view = load_cart_view(&state.orm, cart).await?;
    Ok(ApiResponse::success(view))
}

/// Removing an id that is not in the cart leaves the cart as it was.
pub async fn remove_item(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
) -> AppResult<ApiResponse<Cart>> {
    ensure_role(user, Role::Buyer)?;
    let cart = require_cart(&state.orm, user.user_id).await?;

    let result = CartItems::delete_many()
        .filter(CartItemCol::CartId.eq(cart.id))
        .filter(CartItemCol::Id.eq(item_id))
        .exec(&state.orm)
        .await?;

    let cart = if result.rows_affected > 0 {
        audit::record(
            &state.orm,
            user.user_id,
            "cart_remove",
            "cart_items",
            serde_json::json!({ "item_id": item_id }),
        )
        .await;
        touch_cart(&state.orm, cart).await?
    } else {
        cart
    };

    let view = load_cart_view(&state.orm, cart).await?;
    Ok(ApiResponse::success(view))
}

pub async fn clear_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Cart>> {
    ensure_role(user, Role::Buyer)?;
    let cart = require_cart(&state.orm, user.user_id).await?;

    empty_cart(&state.orm, cart.id).await?;
    let cart = touch_cart(&state.orm, cart).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "cart_clear",
        "carts",
        serde_json::json!({ "cart_id": cart.id }),
    )
    .await;

    let view = load_cart_view(&state.orm, cart).await?;
    Ok(ApiResponse::success(view))
}

pub(crate) async fn find_cart<C>(db: &C, user_id: Uuid) -> AppResult<Option<CartModel>>
where
    C: ConnectionTrait,
{
    Ok(Carts::find()
        .filter(CartCol::UserId.eq(user_id))
        .one(db)
        .await?)
}

async fn require_cart<C>(db: &C, user_id: Uuid) -> AppResult<CartModel>
where
    C: ConnectionTrait,
{
    find_cart(db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Cart"))
}

pub(crate) async fn get_or_create_cart<C>(db: &C, user_id: Uuid) -> AppResult<CartModel>
where
    C: ConnectionTrait,
{
    if let Some(cart) = find_cart(db, user_id).await? {
        return Ok(cart);
    }

    let now = Utc::now();
    let cart = CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    // Two first requests may race; the unique buyer key keeps one cart.
    Carts::insert(cart)
        .on_conflict(OnConflict::column(CartCol::UserId).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;

    find_cart(db, user_id)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("cart vanished after insert")))
}

pub(crate) async fn cart_lines<C>(db: &C, cart_id: Uuid) -> AppResult<Vec<CartItemModel>>
where
    C: ConnectionTrait,
{
    Ok(CartItems::find()
        .filter(CartItemCol::CartId.eq(cart_id))
        .order_by_asc(CartItemCol::CreatedAt)
        .order_by_asc(CartItemCol::Id)
        .all(db)
        .await?)
}

pub(crate) async fn empty_cart<C>(db: &C, cart_id: Uuid) -> AppResult<u64>
where
    C: ConnectionTrait,
{
    let result = CartItems::delete_many()
        .filter(CartItemCol::CartId.eq(cart_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

pub(crate) async fn products_by_id<C>(
    db: &C,
    ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, ProductModel>>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect())
}

async fn touch_cart<C>(db: &C, cart: CartModel) -> AppResult<CartModel>
where
    C: ConnectionTrait,
{
    let mut active: CartActive = cart.into();
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

/// Joins each line with its product's current display fields. The stored
/// line price is reported as-is.
async fn load_cart_view<C>(db: &C, cart: CartModel) -> AppResult<Cart>
where
    C: ConnectionTrait,
{
    let lines = cart_lines(db, cart.id).await?;
    let products = products_by_id(db, lines.iter().map(|l| l.product_id).collect()).await?;

    let (total_items, total_amount) = cart_totals(&lines);
    let items = lines
        .into_iter()
        .map(|line| {
            let product = products.get(&line.product_id);
            CartLine::new(line, product)
        })
        .collect();

    Ok(Cart {
        id: cart.id,
        user: cart.user_id,
        items,
        total_items,
        total_amount,
        updated_at: cart.updated_at.with_timezone(&Utc),
    })
}

fn cart_totals(lines: &[CartItemModel]) -> (i64, Decimal) {
    lines.iter().fold((0_i64, Decimal::ZERO), |(count, amount), line| {
        (
            count + i64::from(line.quantity),
            amount + line.price * Decimal::from(line.quantity),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32, price: Decimal) -> CartItemModel {
        CartItemModel {
            id: Uuid::new_v4(),
            cart_id: Uuid::nil(),
            product_id: Uuid::new_v4(),
            quantity,
            price,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn totals_use_stored_line_prices() {
        let lines = vec![
            line(2, Decimal::new(100, 0)),
            line(4, Decimal::new(1250, 2)),
        ];
        assert_eq!(cart_totals(&lines), (6, Decimal::new(250, 0)));
    }

    #[test]
    fn totals_of_empty_cart_are_zero() {
        assert_eq!(cart_totals(&[]), (0, Decimal::ZERO));
    }
}
