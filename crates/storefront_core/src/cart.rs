//! crates/storefront_core/src/cart.rs
//!
//! The cart service: owns the mapping from an authenticated user to a single
//! active cart and its line items, and keeps the cart's derived aggregates
//! (`total_price`, `total_quantity`) consistent with the item set after
//! every mutation.
//!
//! Consistency rules enforced here:
//! - at most one cart per user, created lazily on first add
//! - at most one line per (cart, product); adding again increments
//! - a line reaching quantity 0 is deleted, never stored
//! - a cart whose item set empties out is deleted, never left empty
//! - totals are recomputed from the current item set, using the live joined
//!   product price (no price snapshot at add time)

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{CartItem, CartLine, CartSnapshot};
use crate::ports::{PortError, PortResult, StorefrontStore};

/// The direction of a quantity change on an existing cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityAction {
    Increase,
    Decrease,
}

impl std::str::FromStr for QuantityAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increase" => Ok(QuantityAction::Increase),
            "decrease" => Ok(QuantityAction::Decrease),
            other => Err(format!("unknown action '{}'", other)),
        }
    }
}

/// The result of clearing a cart. Clearing is idempotent; a user with no
/// cart gets `AlreadyEmpty` rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared,
    AlreadyEmpty,
}

/// Sums quantity and quantity x live price over a set of cart lines.
pub fn compute_totals(lines: &[CartLine]) -> (Decimal, i32) {
    let total_quantity: i32 = lines.iter().map(|l| l.quantity).sum();
    let total_price: Decimal = lines
        .iter()
        .map(|l| l.product.price * Decimal::from(l.quantity))
        .sum();
    (total_price, total_quantity)
}

/// Stateless per-request service over the store port. Every operation takes
/// the authenticated user id explicitly.
#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn StorefrontStore>,
}

impl CartService {
    pub fn new(store: Arc<dyn StorefrontStore>) -> Self {
        Self { store }
    }

    /// Returns the user's cart with joined product summaries, or an empty
    /// snapshot (no row created) when the user has no cart.
    pub async fn get_cart(&self, user_id: Uuid) -> PortResult<CartSnapshot> {
        let Some(cart) = self.store.find_cart_by_user(user_id).await? else {
            return Ok(CartSnapshot::empty());
        };

        let items = self.store.list_cart_lines(cart.id).await?;
        let (total_price, total_quantity) = compute_totals(&items);

        Ok(CartSnapshot {
            id: Some(cart.id),
            items,
            total_price,
            total_quantity,
        })
    }

    /// Adds one unit of a product to the user's cart, creating the cart
    /// lazily. If a line for the product already exists its quantity is
    /// incremented; a second line is never created.
    pub async fn add_item(&self, user_id: Uuid, product_id: Uuid) -> PortResult<CartItem> {
        if self.store.find_product_price(product_id).await?.is_none() {
            return Err(PortError::NotFound(format!(
                "Product {} not found",
                product_id
            )));
        }

        let cart = match self.store.find_cart_by_user(user_id).await? {
            Some(cart) => cart,
            None => self.store.create_cart(user_id).await?,
        };

        let item = match self.store.find_cart_item(cart.id, product_id).await? {
            Some(existing) => {
                let quantity = existing.quantity + 1;
                self.store
                    .set_cart_item_quantity(existing.id, quantity)
                    .await?;
                CartItem {
                    quantity,
                    ..existing
                }
            }
            None => self.store.insert_cart_item(cart.id, product_id, 1).await?,
        };

        self.refresh_totals(cart.id).await?;
        Ok(item)
    }

    /// Increments or decrements the quantity of an existing line. A line
    /// decremented to zero is deleted; a cart whose recomputed quantity is
    /// zero is deleted too, and a zeroed snapshot is returned.
    pub async fn change_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        action: QuantityAction,
    ) -> PortResult<CartSnapshot> {
        let cart = self
            .store
            .find_cart_by_user(user_id)
            .await?
            .ok_or_else(|| PortError::NotFound("Cart not found".to_string()))?;

        let item = self
            .store
            .find_cart_item(cart.id, product_id)
            .await?
            .ok_or_else(|| PortError::NotFound("Product not in cart".to_string()))?;

        let new_quantity = match action {
            QuantityAction::Increase => item.quantity + 1,
            QuantityAction::Decrease => item.quantity - 1,
        };

        if new_quantity <= 0 {
            self.store.delete_cart_item(item.id).await?;
        } else {
            self.store
                .set_cart_item_quantity(item.id, new_quantity)
                .await?;
        }

        self.refresh_totals(cart.id).await
    }

    /// Removes a line by its item id after verifying it belongs to the
    /// requesting user's cart. An emptied cart is deleted.
    pub async fn remove_item(&self, user_id: Uuid, cart_item_id: Uuid) -> PortResult<CartSnapshot> {
        let cart = self
            .store
            .find_cart_by_user(user_id)
            .await?
            .ok_or_else(|| PortError::NotFound("Cart not found".to_string()))?;

        let item = self
            .store
            .get_cart_item(cart_item_id)
            .await?
            .filter(|item| item.cart_id == cart.id)
            .ok_or_else(|| PortError::NotFound("Cart item not found".to_string()))?;

        self.store.delete_cart_item(item.id).await?;
        self.refresh_totals(cart.id).await
    }

    /// Deletes all of the user's cart items and the cart row itself.
    /// Idempotent: clearing a nonexistent cart reports `AlreadyEmpty`.
    pub async fn clear_cart(&self, user_id: Uuid) -> PortResult<ClearOutcome> {
        let Some(cart) = self.store.find_cart_by_user(user_id).await? else {
            return Ok(ClearOutcome::AlreadyEmpty);
        };

        self.store.delete_cart_items(cart.id).await?;
        self.store.delete_cart(cart.id).await?;
        Ok(ClearOutcome::Cleared)
    }

    /// Recomputes aggregates from the current item set and persists them, or
    /// deletes the cart when nothing remains. Returns the resulting snapshot.
    async fn refresh_totals(&self, cart_id: Uuid) -> PortResult<CartSnapshot> {
        let items = self.store.list_cart_lines(cart_id).await?;
        let (total_price, total_quantity) = compute_totals(&items);

        if total_quantity == 0 {
            self.store.delete_cart(cart_id).await?;
            return Ok(CartSnapshot::empty());
        }

        self.store
            .update_cart_totals(cart_id, total_price, total_quantity)
            .await?;

        Ok(CartSnapshot {
            id: Some(cart_id),
            items,
            total_price,
            total_quantity,
        })
    }
}
