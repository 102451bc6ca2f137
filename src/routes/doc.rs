use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        address::{District, Province, Ward},
        auth::{
            ChangePasswordRequest, LoginRequest, LoginResponse, PortalChangePasswordRequest,
            PortalLoginRequest, PortalRole, RegisterRequest,
        },
        cart::{AddCartItemRequest, CartLine, CartView, RemoveCartItemsRequest, SetCartItemRequest},
        comments::{AddCommentRequest, CommentView, CommentsResponse},
        orders::{
            NewAddress, OrderConfirmation, OrderLine, OrderView, OrderViewList, PaymentMethod,
            PlaceOrderRequest, ShippingInfo, StaffOrderList, StaffOrderView,
        },
        products::{ProductDetail, ProductList, StaffProductList, StaffProductRow},
        profile::UpdateProfileRequest,
    },
    middleware::auth::SESSION_COOKIE,
    models::{Account, Brand, Category, Comment, Order, OrderItem, Product, Profile},
    response::{ApiResponse, Meta},
    routes::{
        address, admin, auth, cart, comments, health, orders, params, products as product_routes,
        profile, seller,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "cookie_auth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
        );
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
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
        auth::change_password,
        auth::portal_login,
        auth::portal_change_password,
        product_routes::list_products,
        product_routes::get_product,
        product_routes::list_categories,
        product_routes::list_brands,
        comments::list_comments,
        comments::add_comment,
        cart::view_cart,
        cart::add_item,
        cart::set_item,
        cart::remove_item,
        cart::remove_items,
        orders::place_order,
        orders::list_orders,
        orders::get_order,
        profile::get_profile,
        profile::update_profile,
        address::list_provinces,
        address::list_districts,
        address::list_wards,
        admin::list_accounts,
        admin::create_account,
        admin::update_account,
        admin::delete_account,
        admin::list_customers,
        admin::list_products,
        admin::create_product,
        admin::update_product,
        admin::delete_product,
        admin::list_orders,
        admin::get_order,
        admin::sales_stats,
        admin::product_stats,
        admin::customer_stats,
        seller::list_products,
        seller::set_product_status,
        seller::set_product_hot,
        seller::list_orders,
        seller::update_order_status
    ),
    components(
        schemas(
            Account,
            Profile,
            Category,
            Brand,
            Product,
            Order,
            OrderItem,
            Comment,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            PortalRole,
            PortalLoginRequest,
            PortalChangePasswordRequest,
            ChangePasswordRequest,
            ProductList,
            ProductDetail,
            StaffProductRow,
            StaffProductList,
            AddCartItemRequest,
            SetCartItemRequest,
            RemoveCartItemsRequest,
            CartLine,
            CartView,
            PaymentMethod,
            NewAddress,
            PlaceOrderRequest,
            ShippingInfo,
            OrderConfirmation,
            OrderLine,
            OrderView,
            OrderViewList,
            StaffOrderView,
            StaffOrderList,
            UpdateProfileRequest,
            AddCommentRequest,
            CommentView,
            CommentsResponse,
            Province,
            District,
            Ward,
            health::HealthData,
            admin::CreateAccountRequest,
            admin::UpdateAccountRequest,
            admin::AccountWithRole,
            admin::AccountList,
            admin::CustomerList,
            admin::CreateProductRequest,
            admin::UpdateProductRequest,
            admin::SalesDay,
            admin::SalesStatsResponse,
            admin::ProductStatsRow,
            admin::ProductStatsResponse,
            admin::CustomerSpend,
            admin::CustomerStatsResponse,
            seller::SetProductStatusRequest,
            seller::SetProductHotRequest,
            seller::UpdateOrderStatusRequest,
            params::Pagination,
            params::ProductQuery,
            params::StaffProductQuery,
            params::OrderListQuery,
            params::SalesStatsQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<ProductDetail>,
            ApiResponse<CartView>,
            ApiResponse<OrderConfirmation>,
            ApiResponse<OrderViewList>,
            ApiResponse<StaffOrderList>,
            ApiResponse<StaffProductList>,
            ApiResponse<LoginResponse>
        )
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and password endpoints"),
        (name = "Products", description = "Storefront catalog endpoints"),
        (name = "Comments", description = "Product review endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Checkout and purchase history endpoints"),
        (name = "Profile", description = "Customer profile endpoints"),
        (name = "Address", description = "Vietnamese administrative-unit lookups"),
        (name = "Admin", description = "Admin portal endpoints"),
        (name = "Seller", description = "Seller portal endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
