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
        orders::{
            AssignOrderRequest, CreateOrderRequest, OrderItemRequest, OrderList,
            UpdateOrderStatusRequest,
        },
        products::{CreateProductRequest, ProductList},
        profiles::ProfileList,
    },
    middleware::auth::AuthUser,
    models::{OrderDetail, OrderItemDetail, OrderStatus, Product, Profile, Role},
    response::{ApiResponse, Meta},
    routes::{auth, health, orders, products, profiles},
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
        auth::me,
        products::list_products,
        products::create_product,
        profiles::list_profiles,
        orders::list_orders,
        orders::get_order,
        orders::create_order,
        orders::assign_order,
        orders::update_order_status
    ),
    components(
        schemas(
            Role,
            OrderStatus,
            Profile,
            Product,
            OrderDetail,
            OrderItemDetail,
            AuthUser,
            CreateProductRequest,
            CreateOrderRequest,
            OrderItemRequest,
            AssignOrderRequest,
            UpdateOrderStatusRequest,
            ProductList,
            ProfileList,
            OrderList,
            health::HealthData,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<ProfileList>,
            ApiResponse<OrderDetail>,
            ApiResponse<OrderList>,
            ApiResponse<AuthUser>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Caller identity"),
        (name = "Products", description = "Menu catalog"),
        (name = "Profiles", description = "Staff profiles"),
        (name = "Orders", description = "Order lifecycle"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
