use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{AddToCartRequest, UpdateCartItemRequest},
        orders::{CreateOrderRequest, OrderList, UpdateOrderStatusRequest},
        products::{CategoryList, CreateProductRequest, ProductList, UpdateProductRequest},
    },
    entity::{
        orders::ShippingAddress,
        products::{Location, ProductImage},
        sea_orm_active_enums::{Category, ListingStatus, OrderStatus, Role, Unit},
    },
    models::{Cart, CartLine, CartProduct, CategorySummary, Order, OrderLine, Product, UserSummary},
    response::{ApiResponse, Meta},
    routes::{cart, categories, health, orders, products as product_routes},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        product_routes::list_products,
        product_routes::search_products,
        product_routes::get_product,
        product_routes::farmer_products,
        product_routes::my_products,
        product_routes::create_product,
        product_routes::update_product,
        product_routes::delete_product,
        categories::list_categories,
        cart::get_cart,
        cart::add_item,
        cart::update_item,
        cart::remove_item,
        cart::clear_cart,
        orders::create_order,
        orders::list_my_orders,
        orders::list_all_orders,
        orders::get_order,
        orders::update_order_status
    ),
    components(
        schemas(
            Role,
            Category,
            Unit,
            ListingStatus,
            OrderStatus,
            ProductImage,
            Location,
            ShippingAddress,
            UserSummary,
            Product,
            CartProduct,
            CartLine,
            Cart,
            OrderLine,
            Order,
            CategorySummary,
            CreateProductRequest,
            UpdateProductRequest,
            AddToCartRequest,
            UpdateCartItemRequest,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            ProductList,
            CategoryList,
            OrderList,
            health::HealthData,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CategoryList>,
            ApiResponse<Cart>,
            ApiResponse<Order>,
            ApiResponse<OrderList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Categories", description = "Category listing"),
        (name = "Cart", description = "Buyer cart endpoints"),
        (name = "Orders", description = "Checkout and order endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
