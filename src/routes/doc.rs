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
        admin::{ApprovalRequest, OrderStatusRequest},
        auth::{
            AccessTokenResponse, LoginRequest, RefreshRequest, RegisterRequest,
            TokenPairResponse, UserResponse,
        },
        cart::{CartLineResponse, CartUpdateRequest, ProductSnapshot},
        orders::{
            CheckoutRequest, OrderDetailResponse, OrderItemDetail, OrderSummaryResponse,
            ShippingSnapshot,
        },
        products::{
            CategoryProductsResponse, CategoryRequest, CategoryResponse, ProductCreateRequest,
            ProductDetailResponse, ProductResponse, ProductUpdateRequest,
        },
        profile::{ShippingAddressRequest, ShippingAddressResponse, UpdateProfileRequest},
        reviews::{ReviewRequest, ReviewResponse},
        sellers::{SellerApplyRequest, SellerBrief, SellerResponse},
    },
    response::{ApiResponse, Meta},
    routes::{accounts, admin, health, params, profile, reviews, sellers, shop},
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
        accounts::register,
        accounts::token,
        accounts::token_refresh,
        profile::get_profile,
        profile::update_profile,
        profile::deactivate,
        profile::list_addresses,
        profile::create_address,
        profile::get_address,
        profile::update_address,
        profile::delete_address,
        profile::list_orders,
        profile::get_order,
        sellers::apply,
        sellers::list_products,
        sellers::create_product,
        sellers::update_product,
        sellers::delete_product,
        sellers::list_orders,
        sellers::get_order,
        shop::list_categories,
        shop::create_category,
        shop::category_products,
        shop::list_products,
        shop::product_detail,
        shop::seller_products,
        shop::cart_list,
        shop::cart_update,
        shop::checkout,
        reviews::list_reviews,
        reviews::upsert_review,
        reviews::delete_review,
        admin::list_sellers,
        admin::set_seller_approval,
        admin::list_all_orders,
        admin::update_order_status
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            TokenPairResponse,
            AccessTokenResponse,
            UserResponse,
            UpdateProfileRequest,
            ShippingAddressRequest,
            ShippingAddressResponse,
            SellerApplyRequest,
            SellerResponse,
            SellerBrief,
            CategoryRequest,
            CategoryResponse,
            CategoryProductsResponse,
            ProductCreateRequest,
            ProductUpdateRequest,
            ProductResponse,
            ProductDetailResponse,
            ProductSnapshot,
            CartUpdateRequest,
            CartLineResponse,
            CheckoutRequest,
            ShippingSnapshot,
            OrderItemDetail,
            OrderDetailResponse,
            OrderSummaryResponse,
            ReviewRequest,
            ReviewResponse,
            ApprovalRequest,
            OrderStatusRequest,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            params::SellerListQuery,
            params::ReviewQuery,
            Meta,
            ApiResponse<UserResponse>,
            ApiResponse<TokenPairResponse>,
            ApiResponse<SellerResponse>,
            ApiResponse<ProductDetailResponse>,
            ApiResponse<CartLineResponse>,
            ApiResponse<OrderDetailResponse>,
            ApiResponse<ReviewResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Accounts", description = "Registration and token endpoints"),
        (name = "Profiles", description = "Profile, shipping address and order history endpoints"),
        (name = "Sellers", description = "Seller application and product management endpoints"),
        (name = "Shop", description = "Catalog, cart and checkout endpoints"),
        (name = "Reviews", description = "Product review endpoints"),
        (name = "Admin", description = "Staff-only management endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
