//! crates/storefront_core/src/ports.rs
//!
//! Defines the service contract (trait) for the external catalog/identity
//! store. This trait forms the boundary of the hexagonal architecture,
//! allowing the core cart and favorites logic to be independent of the
//! concrete database implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    AuthUser, Cart, CartItem, CartLine, Category, Product, User, UserCredentials, UserFavorite,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the external store.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Filters
//=========================================================================================

/// Filtering and paging options for product listings.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
    pub skip: i64,
    pub take: i64,
}

//=========================================================================================
// The Store Port (Trait)
//=========================================================================================

/// The catalog/identity store collaborator. Row-level operations only; all
/// consistency logic (aggregates, empty-cart deletion, toggle idempotency)
/// lives in the services built on top of this trait.
#[async_trait]
pub trait StorefrontStore: Send + Sync {
    // --- Identity ---
    async fn create_user(
        &self,
        email: &str,
        name: Option<&str>,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user(&self, user_id: Uuid) -> PortResult<User>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Resolves a session id to its user, rejecting expired sessions.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AuthUser>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Catalog ---
    async fn list_products(&self, filter: &ProductFilter) -> PortResult<Vec<Product>>;

    async fn get_product(&self, product_id: Uuid) -> PortResult<Option<Product>>;

    async fn find_product_price(&self, product_id: Uuid) -> PortResult<Option<Decimal>>;

    async fn create_product(
        &self,
        name: &str,
        description: &str,
        price: Decimal,
        image_url: Option<&str>,
        category_id: Option<Uuid>,
    ) -> PortResult<Product>;

    async fn delete_product(&self, product_id: Uuid) -> PortResult<Option<Product>>;

    /// Whether any cart, belonging to any user, currently holds this product.
    async fn product_in_any_cart(&self, product_id: Uuid) -> PortResult<bool>;

    async fn list_categories(&self) -> PortResult<Vec<Category>>;

    async fn get_category(&self, category_id: Uuid) -> PortResult<Option<Category>>;

    // --- Cart ---
    async fn find_cart_by_user(&self, user_id: Uuid) -> PortResult<Option<Cart>>;

    async fn create_cart(&self, user_id: Uuid) -> PortResult<Cart>;

    async fn update_cart_totals(
        &self,
        cart_id: Uuid,
        total_price: Decimal,
        total_quantity: i32,
    ) -> PortResult<()>;

    /// Deletes the cart row. Its items go with it (cascade).
    async fn delete_cart(&self, cart_id: Uuid) -> PortResult<()>;

    /// All lines of a cart joined with their product summaries, in insertion
    /// order.
    async fn list_cart_lines(&self, cart_id: Uuid) -> PortResult<Vec<CartLine>>;

    async fn find_cart_item(&self, cart_id: Uuid, product_id: Uuid)
        -> PortResult<Option<CartItem>>;

    async fn get_cart_item(&self, cart_item_id: Uuid) -> PortResult<Option<CartItem>>;

    async fn insert_cart_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> PortResult<CartItem>;

    async fn set_cart_item_quantity(&self, cart_item_id: Uuid, quantity: i32) -> PortResult<()>;

    async fn delete_cart_item(&self, cart_item_id: Uuid) -> PortResult<()>;

    async fn delete_cart_items(&self, cart_id: Uuid) -> PortResult<()>;

    // --- Favorites ---
    async fn list_favorites_with_products(
        &self,
        user_id: Uuid,
    ) -> PortResult<Vec<(UserFavorite, Product)>>;

    async fn find_favorite(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> PortResult<Option<UserFavorite>>;

    async fn insert_favorite(&self, user_id: Uuid, product_id: Uuid) -> PortResult<UserFavorite>;

    async fn delete_favorite(&self, favorite_id: Uuid) -> PortResult<()>;
}
