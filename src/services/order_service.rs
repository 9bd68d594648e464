use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{CreateOrderRequest, OrderList, UpdateOrderStatusRequest},
    entity::{
        cart_items::{Column as CartItemCol, Entity as CartItems},
        carts::ActiveModel as CartActive,
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
            ShippingAddress,
        },
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
        sea_orm_active_enums::{ListingStatus, OrderStatus, Role},
        users::{Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_any_role, ensure_role},
    models::Order,
    response::ApiResponse,
    services::cart_service::{empty_cart, find_cart},
    state::AppState,
};

/// 5% tax on the items subtotal.
pub const TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);
/// Orders strictly above this subtotal ship free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(500, 0, 0, false, 0);
pub const FLAT_SHIPPING_FEE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderPricing {
    pub items_price: Decimal,
    pub tax_price: Decimal,
    pub shipping_price: Decimal,
    pub total_price: Decimal,
}

impl OrderPricing {
    pub fn from_items_price(items_price: Decimal) -> Self {
        let tax_price = (items_price * TAX_RATE)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let shipping_price = if items_price > FREE_SHIPPING_THRESHOLD {
            Decimal::ZERO
        } else {
            FLAT_SHIPPING_FEE
        };
        Self {
            items_price,
            tax_price,
            shipping_price,
            total_price: items_price + tax_price + shipping_price,
        }
    }
}

/// One checked-out line, priced at the product's current price.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutLine {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub image: String,
}

impl CheckoutLine {
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

pub fn items_price(lines: &[CheckoutLine]) -> Decimal {
    lines.iter().map(CheckoutLine::subtotal).sum()
}

/// Turns cart lines into order lines, failing on the first product that was
/// deactivated or lacks stock.
pub fn build_checkout_lines(
    cart: &[(Uuid, i32)],
    products: &HashMap<Uuid, ProductModel>,
) -> AppResult<Vec<CheckoutLine>> {
    cart.iter()
        .map(|(product_id, quantity)| {
            let product = products
                .get(product_id)
                .ok_or_else(|| AppError::not_found("Product"))?;
            if product.status == ListingStatus::Deactivated {
                return Err(AppError::InvalidState(format!(
                    "{} is no longer available",
                    product.name
                )));
            }
            if product.quantity < *quantity {
                return Err(AppError::InsufficientStock(format!(
                    "Insufficient quantity for {}",
                    product.name
                )));
            }
            Ok(CheckoutLine {
                product_id: product.id,
                name: product.name.clone(),
                quantity: *quantity,
                price: product.price,
                image: product.images.first_url(),
            })
        })
        .collect()
}

pub fn validate_checkout(payload: &CreateOrderRequest) -> AppResult<()> {
    let ShippingAddress {
        address,
        city,
        state,
        pincode,
        phone,
    } = &payload.shipping_address;
    let fields = [
        ("address", address),
        ("city", city),
        ("state", state),
        ("pincode", pincode),
        ("phone", phone),
    ];
    if let Some((field, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(AppError::BadRequest(format!(
            "Shipping address {field} is required"
        )));
    }
    if payload.payment_method.trim().is_empty() {
        return Err(AppError::BadRequest("Payment method is required".into()));
    }
    Ok(())
}

/// Converts the buyer's cart into an order. Validation, order insert, stock
/// decrements and cart clearing commit together or not at all.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_role(user, Role::Buyer)?;
    validate_checkout(&payload)?;

    let txn = state.orm.begin().await?;

    let cart = find_cart(&txn, user.user_id)
        .await?
        .ok_or_else(|| AppError::InvalidState("Cart is empty".into()))?;

    let cart_lines = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .order_by_asc(CartItemCol::CreatedAt)
        .order_by_asc(CartItemCol::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?;
    if cart_lines.is_empty() {
        return Err(AppError::InvalidState("Cart is empty".into()));
    }

    let product_ids: Vec<Uuid> = cart_lines.iter().map(|l| l.product_id).collect();
    let products: HashMap<Uuid, ProductModel> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        // Fixed lock order so overlapping checkouts cannot deadlock.
        .order_by_asc(ProdCol::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let requested: Vec<(Uuid, i32)> = cart_lines
        .iter()
        .map(|l| (l.product_id, l.quantity))
        .collect();
    let lines = build_checkout_lines(&requested, &products)?;
    let pricing = OrderPricing::from_items_price(items_price(&lines));

    let now = Utc::now();
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        shipping_address: Set(payload.shipping_address),
        payment_method: Set(payload.payment_method.trim().to_string()),
        items_price: Set(pricing.items_price),
        tax_price: Set(pricing.tax_price),
        shipping_price: Set(pricing.shipping_price),
        total_price: Set(pricing.total_price),
        order_status: Set(OrderStatus::Pending),
        is_delivered: Set(false),
        delivered_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut order_items = Vec::with_capacity(lines.len());
    for (position, line) in lines.iter().enumerate() {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            position: Set(position as i32),
            name: Set(line.name.clone()),
            quantity: Set(line.quantity),
            price: Set(line.price),
            image: Set(line.image.clone()),
        }
        .insert(&txn)
        .await?;
        order_items.push(item);

        // Conditional decrement: a concurrent checkout that drained the stock
        // leaves zero rows matched and the whole order rolls back.
        let result = Products::update_many()
            .col_expr(ProdCol::Quantity, Expr::col(ProdCol::Quantity).sub(line.quantity))
            .col_expr(ProdCol::UpdatedAt, Expr::value(now.fixed_offset()))
            .filter(ProdCol::Id.eq(line.product_id))
            .filter(ProdCol::Quantity.gte(line.quantity))
            .exec(&txn)
            .await?;
        if result.rows_affected != 1 {
            return Err(AppError::InsufficientStock(format!(
                "Insufficient quantity for {}",
                line.name
            )));
        }
    }

    empty_cart(&txn, cart.id).await?;
    let mut cart_active: CartActive = cart.into();
    cart_active.updated_at = Set(now.into());
    cart_active.update(&txn).await?;

    let buyer = Users::find_by_id(user.user_id).one(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        buyer_id = %user.user_id,
        lines = order_items.len(),
        total = %order.total_price,
        "order created"
    );
    audit::record(
        &state.orm,
        user.user_id,
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id, "total_price": order.total_price.to_string() }),
    )
    .await;

    Ok(ApiResponse::success(Order::from_parts(order, order_items, buyer)))
}

/// The caller's own orders, newest first.
pub async fn list_my_orders(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    ensure_role(user, Role::Buyer)?;
    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let items = assemble_orders(&state.orm, orders, false).await?;
    let count = items.len();
    Ok(ApiResponse::success(OrderList { items }).with_count(count))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let orders = Orders::find()
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let items = assemble_orders(&state.orm, orders, true).await?;
    let count = items.len();
    Ok(ApiResponse::success(OrderList { items }).with_count(count))
}

/// Readable by the buyer who placed it or by an admin.
pub async fn get_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<Order>> {
    let order = find_order(&state.orm, id).await?;
    if order.user_id != user.user_id && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to access this order".into(),
        ));
    }

    let data = assemble_order(&state.orm, order).await?;
    Ok(ApiResponse::success(data))
}

pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_any_role(user, &[Role::Admin, Role::Farmer])?;
    let existing = find_order(&state.orm, id).await?;

    let current = existing.order_status;
    let next = payload.order_status;
    if !current.can_transition_to(next) {
        return Err(AppError::InvalidState(format!(
            "Cannot change order status from {} to {}",
            current.as_str(),
            next.as_str()
        )));
    }

    let now = Utc::now();
    let mut active: OrderActive = existing.into();
    active.order_status = Set(next);
    if next == OrderStatus::Delivered {
        active.is_delivered = Set(true);
        active.delivered_at = Set(Some(now.into()));
    }
    active.updated_at = Set(now.into());
    let order = active.update(&state.orm).await?;

    tracing::info!(
        order_id = %order.id,
        from = current.as_str(),
        to = next.as_str(),
        "order status updated"
    );
    audit::record(
        &state.orm,
        user.user_id,
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "status": next.as_str() }),
    )
    .await;

    let data = assemble_order(&state.orm, order).await?;
    Ok(ApiResponse::success(data))
}

async fn find_order<C>(db: &C, id: Uuid) -> AppResult<OrderModel>
where
    C: ConnectionTrait,
{
    Orders::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))
}

async fn assemble_order<C>(db: &C, order: OrderModel) -> AppResult<Order>
where
    C: ConnectionTrait,
{
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::Position)
        .all(db)
        .await?;
    let buyer = Users::find_by_id(order.user_id).one(db).await?;
    Ok(Order::from_parts(order, items, buyer))
}

async fn assemble_orders<C>(db: &C, orders: Vec<OrderModel>, with_buyers: bool) -> AppResult<Vec<Order>>
where
    C: ConnectionTrait,
{
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut items_by_order: HashMap<Uuid, Vec<OrderItemModel>> = HashMap::new();
    for item in OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .order_by_asc(OrderItemCol::Position)
        .all(db)
        .await?
    {
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    let mut buyers: HashMap<Uuid, UserModel> = HashMap::new();
    if with_buyers {
        let mut buyer_ids: Vec<Uuid> = orders.iter().map(|o| o.user_id).collect();
        buyer_ids.sort();
        buyer_ids.dedup();
        buyers = Users::find()
            .filter(UserCol::Id.is_in(buyer_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            let buyer = buyers.get(&order.user_id).cloned();
            Order::from_parts(order, items, buyer)
        })
        .collect())
}
