mod common;

use agroconnect_api::{
    dto::products::UpdateProductRequest,
    entity::sea_orm_active_enums::{OrderStatus, Role},
    error::AppError,
    services::{cart_service, order_service, product_service},
};
use common::{add_to_cart, checkout_request, create_product, create_user, dec, setup_state};

#[tokio::test]
async fn checkout_prices_order_and_drains_cart_and_stock() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let farmer = create_user(&state, Role::Farmer).await?;
    let buyer = create_user(&state, Role::Buyer).await?;
    let potatoes = create_product(&state, &farmer, "Potatoes", dec(100), 10).await?;
    let onions = create_product(&state, &farmer, "Onions", dec(50), 10).await?;

    add_to_cart(&state, &buyer, potatoes.id, 2).await?;
    add_to_cart(&state, &buyer, onions.id, 4).await?;

    let order = order_service::create_order(&state, &buyer, checkout_request())
        .await?
        .data
        .expect("order");

    assert_eq!(order.user, buyer.user_id);
    assert_eq!(order.order_status, OrderStatus::Pending);
    assert!(!order.is_delivered);
    assert_eq!(order.items_price, dec(400));
    assert_eq!(order.tax_price, dec(20));
    assert_eq!(order.shipping_price, dec(50));
    assert_eq!(order.total_price, dec(470));
    assert_eq!(order.order_items.len(), 2);
    let potato_line = order
        .order_items
        .iter()
        .find(|line| line.product == potatoes.id)
        .expect("potato line");
    assert_eq!(potato_line.name, "Potatoes");
    assert_eq!(potato_line.quantity, 2);
    assert_eq!(potato_line.image, "https://images.agroconnect.test/potatoes.jpg");

    let stock = product_service::get_product(&state, potatoes.id).await?.data.expect("product");
    assert_eq!(stock.quantity, 8);
    let stock = product_service::get_product(&state, onions.id).await?.data.expect("product");
    assert_eq!(stock.quantity, 6);

    let cart = cart_service::get_cart(&state, &buyer).await?.data.expect("cart");
    assert!(cart.items.is_empty());
    assert_eq!(cart.total_items, 0);

    Ok(())
}

#[tokio::test]
async fn shipping_is_free_only_above_the_threshold() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let farmer = create_user(&state, Role::Farmer).await?;
    let buyer = create_user(&state, Role::Buyer).await?;
    let apples = create_product(&state, &farmer, "Apples", dec(100), 20).await?;

    add_to_cart(&state, &buyer, apples.id, 6).await?;
    let order = order_service::create_order(&state, &buyer, checkout_request())
        .await?
        .data
        .expect("order");
    assert_eq!(order.items_price, dec(600));
    assert_eq!(order.tax_price, dec(30));
    assert_eq!(order.shipping_price, dec(0));
    assert_eq!(order.total_price, dec(630));

    add_to_cart(&state, &buyer, apples.id, 5).await?;
    let order = order_service::create_order(&state, &buyer, checkout_request())
        .await?
        .data
        .expect("order");
    assert_eq!(order.items_price, dec(500));
    assert_eq!(order.shipping_price, dec(50));
    assert_eq!(order.total_price, dec(575));

    Ok(())
}

#[tokio::test]
async fn order_lines_use_the_price_at_checkout() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let farmer = create_user(&state, Role::Farmer).await?;
    let buyer = create_user(&state, Role::Buyer).await?;
    let pumpkin = create_product(&state, &farmer, "Pumpkin", dec(100), 10).await?;

    add_to_cart(&state, &buyer, pumpkin.id, 2).await?;
    product_service::update_product(
        &state,
        &farmer,
        pumpkin.id,
        UpdateProductRequest {
            price: Some(dec(150)),
            ..Default::default()
        },
    )
    .await?;

    let cart = cart_service::get_cart(&state, &buyer).await?.data.expect("cart");
    assert_eq!(cart.total_amount, dec(200));

    let order = order_service::create_order(&state, &buyer, checkout_request())
        .await?
        .data
        .expect("order");
    assert_eq!(order.order_items[0].price, dec(150));
    assert_eq!(order.items_price, dec(300));

    Ok(())
}

#[tokio::test]
async fn empty_cart_cannot_be_checked_out() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let buyer = create_user(&state, Role::Buyer).await?;

    let err = order_service::create_order(&state, &buyer, checkout_request())
        .await
        .expect_err("no cart yet");
    assert!(matches!(err, AppError::InvalidState(ref msg) if msg == "Cart is empty"));

    cart_service::get_cart(&state, &buyer).await?;
    let err = order_service::create_order(&state, &buyer, checkout_request())
        .await
        .expect_err("cart has no lines");
    assert!(matches!(err, AppError::InvalidState(_)));

    let orders = order_service::list_my_orders(&state, &buyer).await?;
    assert_eq!(orders.count, Some(0));

    Ok(())
}

#[tokio::test]
async fn stock_shortfall_at_checkout_rolls_everything_back() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let farmer = create_user(&state, Role::Farmer).await?;
    let buyer = create_user(&state, Role::Buyer).await?;
    let lettuce = create_product(&state, &farmer, "Lettuce", dec(50), 10).await?;
    let radish = create_product(&state, &farmer, "Radish", dec(20), 10).await?;

    add_to_cart(&state, &buyer, lettuce.id, 2).await?;
    add_to_cart(&state, &buyer, radish.id, 5).await?;

    // Stock drops below the carted quantity after the add.
    product_service::update_product(
        &state,
        &farmer,
        radish.id,
        UpdateProductRequest {
            quantity: Some(3),
            ..Default::default()
        },
    )
    .await?;

    let err = order_service::create_order(&state, &buyer, checkout_request())
        .await
        .expect_err("radish short");
    assert!(matches!(err, AppError::InsufficientStock(ref msg) if msg == "Insufficient quantity for Radish"));

    let lettuce_now = product_service::get_product(&state, lettuce.id).await?.data.expect("product");
    assert_eq!(lettuce_now.quantity, 10);
    let radish_now = product_service::get_product(&state, radish.id).await?.data.expect("product");
    assert_eq!(radish_now.quantity, 3);

    let cart = cart_service::get_cart(&state, &buyer).await?.data.expect("cart");
    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.total_items, 7);

    let orders = order_service::list_my_orders(&state, &buyer).await?;
    assert_eq!(orders.count, Some(0));

    Ok(())
}

#[tokio::test]
async fn checkout_requires_a_complete_shipping_address() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let farmer = create_user(&state, Role::Farmer).await?;
    let buyer = create_user(&state, Role::Buyer).await?;
    let okra = create_product(&state, &farmer, "Okra", dec(70), 10).await?;
    add_to_cart(&state, &buyer, okra.id, 1).await?;

    let mut request = checkout_request();
    request.shipping_address.pincode = "  ".into();
    let err = order_service::create_order(&state, &buyer, request)
        .await
        .expect_err("missing pincode");
    assert!(matches!(err, AppError::BadRequest(ref msg) if msg.contains("pincode")));

    let cart = cart_service::get_cart(&state, &buyer).await?.data.expect("cart");
    assert_eq!(cart.items.len(), 1);

    Ok(())
}

#[tokio::test]
async fn deactivated_products_block_checkout() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let farmer = create_user(&state, Role::Farmer).await?;
    let buyer = create_user(&state, Role::Buyer).await?;
    let kale = create_product(&state, &farmer, "Kale", dec(90), 10).await?;

    add_to_cart(&state, &buyer, kale.id, 2).await?;
    product_service::delete_product(&state, &farmer, kale.id).await?;

    let err = order_service::create_order(&state, &buyer, checkout_request())
        .await
        .expect_err("kale was withdrawn");
    assert!(matches!(err, AppError::InvalidState(ref msg) if msg == "Kale is no longer available"));

    let kale_now = product_service::get_product(&state, kale.id).await?.data.expect("product");
    assert_eq!(kale_now.quantity, 10);
    let cart = cart_service::get_cart(&state, &buyer).await?.data.expect("cart");
    assert_eq!(cart.items.len(), 1);

    Ok(())
}
