//! crates/storefront_core/src/domain.rs
//!
//! Defines the pure, core data structures for the storefront.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// The access level attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

// Represents a user - used throughout the app
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub role: Role,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// The authenticated identity resolved once at the request boundary and
/// passed explicitly into every service operation.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

/// A product category.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

/// A catalog product.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// The subset of product fields joined onto cart lines.
#[derive(Debug, Clone)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub image_url: Option<String>,
}

/// A user's active cart. `total_price` and `total_quantity` are derived and
/// kept equal to the sums over the cart's current items.
#[derive(Debug, Clone)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_price: Decimal,
    pub total_quantity: i32,
}

/// One line of a cart: a (cart, product) pair with a quantity >= 1.
#[derive(Debug, Clone)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A cart item joined with its product summary, as read back for responses
/// and for aggregate recomputation.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub product: ProductSummary,
}

/// The full view of a user's cart returned by every cart operation.
///
/// `id` is `None` when the user has no cart row, either because one was
/// never created or because it was deleted after emptying out.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    pub id: Option<Uuid>,
    pub items: Vec<CartLine>,
    pub total_price: Decimal,
    pub total_quantity: i32,
}

impl CartSnapshot {
    /// The snapshot of a user with no cart: no items, zero totals.
    pub fn empty() -> Self {
        Self {
            id: None,
            items: Vec::new(),
            total_price: Decimal::ZERO,
            total_quantity: 0,
        }
    }
}

/// One row of the favorites relation.
#[derive(Debug, Clone)]
pub struct UserFavorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
}

/// A favorited product enriched with the viewer's cart state, so the card
/// view can render "add to cart" vs "remove from cart" without a second
/// round trip. `is_product_favorited` is always true in this listing.
#[derive(Debug, Clone)]
pub struct FavoriteProduct {
    pub product: Product,
    pub is_in_cart: bool,
    pub cart_item_id: Option<Uuid>,
    pub is_product_favorited: bool,
}
