//! services/api/src/web/docs.rs
//!
//! The master definition for the OpenAPI specification.

use utoipa::OpenApi;

use crate::web::{auth, cart, favorites, products};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::profile_handler,
        cart::get_cart_handler,
        cart::add_cart_item_handler,
        cart::change_quantity_handler,
        cart::remove_cart_item_handler,
        cart::clear_cart_handler,
        favorites::list_favorites_handler,
        favorites::toggle_favorite_handler,
        favorites::remove_favorite_handler,
        products::list_products_handler,
        products::get_product_handler,
        products::create_product_handler,
        products::delete_product_handler,
        products::list_categories_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            auth::ProfileResponse,
            cart::CartDto,
            cart::CartLineDto,
            cart::CartProductDto,
            cart::CartItemDto,
            cart::AddCartItemRequest,
            cart::AddCartItemResponse,
            cart::ChangeQuantityRequest,
            cart::ChangeQuantityResponse,
            cart::RemoveCartItemRequest,
            cart::RemoveCartItemResponse,
            cart::ClearCartResponse,
            favorites::FavoriteProductDto,
            favorites::FavoriteRequest,
            favorites::FavoriteResponse,
            products::ProductDto,
            products::ProductDetailDto,
            products::CategoryDto,
            products::DeleteProductRequest,
            products::DeleteProductResponse,
        )
    ),
    tags(
        (name = "Storefront API", description = "API endpoints for the storefront: catalog, cart, favorites, and auth.")
    )
)]
pub struct ApiDoc;
