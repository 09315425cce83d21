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
        cart::{AddToCartRequest, CartView, SetQuantityRequest},
        orders::{
            AdminOrderEntry, AdminOrderList, OrderDetail, OrderList, OrderUser, OrderWithItems,
            PlaceOrderRequest, UpdateOrderStatusRequest,
        },
        products::{CategoryList, CreateProductRequest, ProductList, UpdateProductRequest},
    },
    models::{CartLine, Category, Order, OrderItem, OrderStatus, Product, ShippingAddress, UserPublic},
    response::{ApiResponse, Meta},
    routes::{auth, cart, health, orders, params, products},
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
        auth::register,
        auth::login,
        auth::me,
        products::list_products,
        products::list_categories,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        cart::get_cart,
        cart::add_to_cart,
        cart::set_quantity,
        cart::remove_from_cart,
        cart::clear_cart,
        orders::place_order,
        orders::my_orders,
        orders::all_orders,
        orders::get_order,
        orders::update_status,
        orders::delete_order,
    ),
    components(
        schemas(
            UserPublic,
            Product,
            Category,
            CartLine,
            Order,
            OrderItem,
            OrderStatus,
            ShippingAddress,
            AddToCartRequest,
            SetQuantityRequest,
            CartView,
            PlaceOrderRequest,
            UpdateOrderStatusRequest,
            OrderUser,
            OrderWithItems,
            OrderDetail,
            OrderList,
            AdminOrderEntry,
            AdminOrderList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CategoryList,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderDetail>,
            ApiResponse<OrderList>,
            ApiResponse<AdminOrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Cart", description = "Session cart endpoints"),
        (name = "Orders", description = "Order workflow endpoints"),
        (name = "Auth", description = "Authentication endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
