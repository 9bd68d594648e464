mod common;

use agroconnect_api::{
    dto::{cart::{AddToCartRequest, UpdateCartItemRequest}, products::UpdateProductRequest},
    entity::sea_orm_active_enums::Role,
    error::AppError,
    services::{cart_service, product_service},
};
use common::{add_to_cart, create_product, create_user, dec, setup_state};
use uuid::Uuid;

#[tokio::test]
async fn repeat_adds_merge_into_one_line_at_the_first_price() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let farmer = create_user(&state, Role::Farmer).await?;
    let buyer = create_user(&state, Role::Buyer).await?;
    let carrots = create_product(&state, &farmer, "Carrots", dec(100), 10).await?;

    add_to_cart(&state, &buyer, carrots.id, 3).await?;

    // A later price change must not touch the stored line price.
    product_service::update_product(
        &state,
        &farmer,
        carrots.id,
        UpdateProductRequest {
            price: Some(dec(150)),
            ..Default::default()
        },
    )
    .await?;
    add_to_cart(&state, &buyer, carrots.id, 2).await?;

    let cart = cart_service::get_cart(&state, &buyer).await?.data.expect("cart");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 5);
    assert_eq!(cart.items[0].price, dec(100));
    assert_eq!(cart.total_items, 5);
    assert_eq!(cart.total_amount, dec(500));
    let product = cart.items[0].product.as_ref().expect("product joined");
    assert_eq!(product.price, dec(150));

    Ok(())
}

#[tokio::test]
async fn adding_more_than_stock_leaves_cart_untouched() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let farmer = create_user(&state, Role::Farmer).await?;
    let buyer = create_user(&state, Role::Buyer).await?;
    let onions = create_product(&state, &farmer, "Onions", dec(40), 4).await?;

    add_to_cart(&state, &buyer, onions.id, 2).await?;
    let err = cart_service::add_item(
        &state,
        &buyer,
        AddToCartRequest {
            product_id: onions.id,
            quantity: 5,
        },
    )
    .await
    .expect_err("over stock");
    assert!(matches!(err, AppError::InsufficientStock(ref msg) if msg == "Insufficient quantity for Onions"));

    let cart = cart_service::get_cart(&state, &buyer).await?.data.expect("cart");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 2);

    Ok(())
}

#[tokio::test]
async fn add_rejects_bad_quantity_unknown_and_unavailable_products() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let farmer = create_user(&state, Role::Farmer).await?;
    let buyer = create_user(&state, Role::Buyer).await?;
    let spinach = create_product(&state, &farmer, "Spinach", dec(30), 10).await?;

    let err = cart_service::add_item(
        &state,
        &buyer,
        AddToCartRequest {
            product_id: spinach.id,
            quantity: 0,
        },
    )
    .await
    .expect_err("zero quantity");
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = cart_service::add_item(
        &state,
        &buyer,
        AddToCartRequest {
            product_id: Uuid::new_v4(),
            quantity: 1,
        },
    )
    .await
    .expect_err("unknown product");
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Product not found"));

    product_service::update_product(
        &state,
        &farmer,
        spinach.id,
        UpdateProductRequest {
            is_available: Some(false),
            ..Default::default()
        },
    )
    .await?;
    let err = cart_service::add_item(
        &state,
        &buyer,
        AddToCartRequest {
            product_id: spinach.id,
            quantity: 1,
        },
    )
    .await
    .expect_err("unavailable product");
    assert!(matches!(err, AppError::InvalidState(_)));

    Ok(())
}

#[tokio::test]
async fn update_to_zero_removes_the_line() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let farmer = create_user(&state, Role::Farmer).await?;
    let buyer = create_user(&state, Role::Buyer).await?;
    let beans = create_product(&state, &farmer, "Beans", dec(60), 20).await?;
    let peas = create_product(&state, &farmer, "Peas", dec(80), 20).await?;

    add_to_cart(&state, &buyer, beans.id, 2).await?;
    add_to_cart(&state, &buyer, peas.id, 1).await?;
    let cart = cart_service::get_cart(&state, &buyer).await?.data.expect("cart");
    let beans_line = cart
        .items
        .iter()
        .find(|line| line.product.as_ref().is_some_and(|p| p.id == beans.id))
        .expect("beans line")
        .id;

    // Quantity updates skip the stock check.
    let cart = cart_service::update_item(
        &state,
        &buyer,
        beans_line,
        UpdateCartItemRequest { quantity: 50 },
    )
    .await?
    .data
    .expect("cart");
    assert_eq!(cart.total_items, 51);

    let cart = cart_service::update_item(&state, &buyer, beans_line, UpdateCartItemRequest { quantity: 0 })
        .await?
        .data
        .expect("cart");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.total_amount, dec(80));

    let err = cart_service::update_item(&state, &buyer, beans_line, UpdateCartItemRequest { quantity: 1 })
        .await
        .expect_err("line is gone");
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}

#[tokio::test]
async fn removing_unknown_line_is_a_no_op() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let farmer = create_user(&state, Role::Farmer).await?;
    let buyer = create_user(&state, Role::Buyer).await?;
    let garlic = create_product(&state, &farmer, "Garlic", dec(120), 20).await?;

    add_to_cart(&state, &buyer, garlic.id, 1).await?;
    let cart = cart_service::remove_item(&state, &buyer, Uuid::new_v4())
        .await?
        .data
        .expect("cart");
    assert_eq!(cart.items.len(), 1);

    let line = cart.items[0].id;
    let cart = cart_service::remove_item(&state, &buyer, line).await?.data.expect("cart");
    assert!(cart.items.is_empty());
    assert_eq!(cart.total_amount, dec(0));

    Ok(())
}

#[tokio::test]
async fn mutations_without_a_cart_are_not_found() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let buyer = create_user(&state, Role::Buyer).await?;

    let err = cart_service::clear_cart(&state, &buyer).await.expect_err("no cart");
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Cart not found"));

    let err = cart_service::remove_item(&state, &buyer, Uuid::new_v4())
        .await
        .expect_err("no cart");
    assert!(matches!(err, AppError::NotFound(_)));

    let err = cart_service::update_item(&state, &buyer, Uuid::new_v4(), UpdateCartItemRequest { quantity: 1 })
        .await
        .expect_err("no cart");
    assert!(matches!(err, AppError::NotFound(_)));

    // Reading creates the empty cart, after which clearing succeeds.
    let cart = cart_service::get_cart(&state, &buyer).await?.data.expect("cart");
    assert!(cart.items.is_empty());
    let cleared = cart_service::clear_cart(&state, &buyer).await?.data.expect("cart");
    assert_eq!(cleared.id, cart.id);

    Ok(())
}

#[tokio::test]
async fn cart_is_buyer_only() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let farmer = create_user(&state, Role::Farmer).await?;

    let err = cart_service::get_cart(&state, &farmer).await.expect_err("farmer has no cart");
    assert!(matches!(err, AppError::Forbidden(_)));

    Ok(())
}
