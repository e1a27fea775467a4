//! crates/storefront_core/src/memory_store.rs
//!
//! A fully in-memory `StorefrontStore` used by the service unit tests.
//! Mirrors the row-level semantics of the real store: plain reads and
//! writes, no transactions, cascade delete of cart items with their cart.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    AuthUser, Cart, CartItem, CartLine, Category, Product, ProductSummary, Role, User,
    UserCredentials, UserFavorite,
};
use crate::ports::{PortError, PortResult, ProductFilter, StorefrontStore};

#[derive(Default)]
struct Inner {
    users: Vec<UserCredentials>,
    user_names: HashMap<Uuid, Option<String>>,
    sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    categories: Vec<Category>,
    products: Vec<Product>,
    carts: Vec<Cart>,
    cart_items: Vec<CartItem>,
    favorites: Vec<UserFavorite>,
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Inserts a product directly, returning its id.
    pub fn seed_product(&self, name: &str, price: Decimal) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().products.push(Product {
            id,
            name: name.to_string(),
            description: String::new(),
            price,
            image_url: None,
            category_id: None,
            is_active: true,
            created_at: Utc::now(),
        });
        id
    }

    /// Changes a seeded product's catalog price in place.
    pub fn set_price(&self, product_id: Uuid, price: Decimal) {
        let mut inner = self.lock();
        if let Some(product) = inner.products.iter_mut().find(|p| p.id == product_id) {
            product.price = price;
        }
    }

    pub fn cart_count(&self) -> usize {
        self.lock().carts.len()
    }
}

#[async_trait]
impl StorefrontStore for MemoryStore {
    async fn create_user(
        &self,
        email: &str,
        name: Option<&str>,
        hashed_password: &str,
    ) -> PortResult<User> {
        let mut inner = self.lock();
        if inner.users.iter().any(|u| u.email == email) {
            return Err(PortError::Unexpected(format!(
                "email {} already registered",
                email
            )));
        }
        let user_id = Uuid::new_v4();
        inner.users.push(UserCredentials {
            user_id,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            role: Role::Customer,
        });
        inner
            .user_names
            .insert(user_id, name.map(|n| n.to_string()));
        Ok(User {
            id: user_id,
            email: email.to_string(),
            name: name.map(|n| n.to_string()),
            role: Role::Customer,
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.lock()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        let inner = self.lock();
        let creds = inner
            .users
            .iter()
            .find(|u| u.user_id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        Ok(User {
            id: creds.user_id,
            email: creds.email.clone(),
            name: inner.user_names.get(&user_id).cloned().flatten(),
            role: creds.role,
        })
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.lock()
            .sessions
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AuthUser> {
        let inner = self.lock();
        let (user_id, expires_at) = inner
            .sessions
            .get(session_id)
            .ok_or_else(|| PortError::NotFound("session not found".to_string()))?;
        if *expires_at <= Utc::now() {
            return Err(PortError::NotFound("session expired".to_string()));
        }
        let role = inner
            .users
            .iter()
            .find(|u| u.user_id == *user_id)
            .map(|u| u.role)
            .unwrap_or(Role::Customer);
        Ok(AuthUser {
            user_id: *user_id,
            role,
        })
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.lock().sessions.remove(session_id);
        Ok(())
    }

    async fn list_products(&self, filter: &ProductFilter) -> PortResult<Vec<Product>> {
        let inner = self.lock();
        let mut products: Vec<Product> = inner
            .products
            .iter()
            .filter(|p| {
                filter
                    .category_id
                    .map_or(true, |c| p.category_id == Some(c))
            })
            .filter(|p| {
                filter.search.as_ref().map_or(true, |s| {
                    p.name.to_lowercase().contains(&s.to_lowercase())
                })
            })
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products
            .into_iter()
            .skip(filter.skip.max(0) as usize)
            .take(filter.take.max(0) as usize)
            .collect())
    }

    async fn get_product(&self, product_id: Uuid) -> PortResult<Option<Product>> {
        Ok(self
            .lock()
            .products
            .iter()
            .find(|p| p.id == product_id)
            .cloned())
    }

    async fn find_product_price(&self, product_id: Uuid) -> PortResult<Option<Decimal>> {
        Ok(self
            .lock()
            .products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.price))
    }

    async fn create_product(
        &self,
        name: &str,
        description: &str,
        price: Decimal,
        image_url: Option<&str>,
        category_id: Option<Uuid>,
    ) -> PortResult<Product> {
        let product = Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            price,
            image_url: image_url.map(|u| u.to_string()),
            category_id,
            is_active: true,
            created_at: Utc::now(),
        };
        self.lock().products.push(product.clone());
        Ok(product)
    }

    async fn delete_product(&self, product_id: Uuid) -> PortResult<Option<Product>> {
        let mut inner = self.lock();
        let position = inner.products.iter().position(|p| p.id == product_id);
        Ok(position.map(|i| inner.products.remove(i)))
    }

    async fn product_in_any_cart(&self, product_id: Uuid) -> PortResult<bool> {
        Ok(self
            .lock()
            .cart_items
            .iter()
            .any(|i| i.product_id == product_id))
    }

    async fn list_categories(&self) -> PortResult<Vec<Category>> {
        let mut categories = self.lock().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_category(&self, category_id: Uuid) -> PortResult<Option<Category>> {
        Ok(self
            .lock()
            .categories
            .iter()
            .find(|c| c.id == category_id)
            .cloned())
    }

    async fn find_cart_by_user(&self, user_id: Uuid) -> PortResult<Option<Cart>> {
        Ok(self
            .lock()
            .carts
            .iter()
            .find(|c| c.user_id == user_id)
            .cloned())
    }

    async fn create_cart(&self, user_id: Uuid) -> PortResult<Cart> {
        let mut inner = self.lock();
        if inner.carts.iter().any(|c| c.user_id == user_id) {
            return Err(PortError::Unexpected(
                "user already has a cart".to_string(),
            ));
        }
        let cart = Cart {
            id: Uuid::new_v4(),
            user_id,
            total_price: Decimal::ZERO,
            total_quantity: 0,
        };
        inner.carts.push(cart.clone());
        Ok(cart)
    }

    async fn update_cart_totals(
        &self,
        cart_id: Uuid,
        total_price: Decimal,
        total_quantity: i32,
    ) -> PortResult<()> {
        let mut inner = self.lock();
        let cart = inner
            .carts
            .iter_mut()
            .find(|c| c.id == cart_id)
            .ok_or_else(|| PortError::NotFound(format!("Cart {} not found", cart_id)))?;
        cart.total_price = total_price;
        cart.total_quantity = total_quantity;
        Ok(())
    }

    async fn delete_cart(&self, cart_id: Uuid) -> PortResult<()> {
        let mut inner = self.lock();
        inner.carts.retain(|c| c.id != cart_id);
        // Cascade, as the schema's ON DELETE CASCADE would.
        inner.cart_items.retain(|i| i.cart_id != cart_id);
        Ok(())
    }

    async fn list_cart_lines(&self, cart_id: Uuid) -> PortResult<Vec<CartLine>> {
        let inner = self.lock();
        inner
            .cart_items
            .iter()
            .filter(|i| i.cart_id == cart_id)
            .map(|item| {
                let product = inner
                    .products
                    .iter()
                    .find(|p| p.id == item.product_id)
                    .ok_or_else(|| {
                        PortError::Unexpected(format!(
                            "cart item {} references missing product",
                            item.id
                        ))
                    })?;
                Ok(CartLine {
                    id: item.id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    product: ProductSummary {
                        id: product.id,
                        name: product.name.clone(),
                        price: product.price,
                        image_url: product.image_url.clone(),
                    },
                })
            })
            .collect()
    }

    async fn find_cart_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> PortResult<Option<CartItem>> {
        Ok(self
            .lock()
            .cart_items
            .iter()
            .find(|i| i.cart_id == cart_id && i.product_id == product_id)
            .cloned())
    }

    async fn get_cart_item(&self, cart_item_id: Uuid) -> PortResult<Option<CartItem>> {
        Ok(self
            .lock()
            .cart_items
            .iter()
            .find(|i| i.id == cart_item_id)
            .cloned())
    }

    async fn insert_cart_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> PortResult<CartItem> {
        let mut inner = self.lock();
        if inner
            .cart_items
            .iter()
            .any(|i| i.cart_id == cart_id && i.product_id == product_id)
        {
            return Err(PortError::Unexpected(
                "duplicate (cart, product) line".to_string(),
            ));
        }
        let item = CartItem {
            id: Uuid::new_v4(),
            cart_id,
            product_id,
            quantity,
        };
        inner.cart_items.push(item.clone());
        Ok(item)
    }

    async fn set_cart_item_quantity(&self, cart_item_id: Uuid, quantity: i32) -> PortResult<()> {
        let mut inner = self.lock();
        let item = inner
            .cart_items
            .iter_mut()
            .find(|i| i.id == cart_item_id)
            .ok_or_else(|| PortError::NotFound(format!("Cart item {} not found", cart_item_id)))?;
        item.quantity = quantity;
        Ok(())
    }

    async fn delete_cart_item(&self, cart_item_id: Uuid) -> PortResult<()> {
        self.lock().cart_items.retain(|i| i.id != cart_item_id);
        Ok(())
    }

    async fn delete_cart_items(&self, cart_id: Uuid) -> PortResult<()> {
        self.lock().cart_items.retain(|i| i.cart_id != cart_id);
        Ok(())
    }

    async fn list_favorites_with_products(
        &self,
        user_id: Uuid,
    ) -> PortResult<Vec<(UserFavorite, Product)>> {
        let inner = self.lock();
        inner
            .favorites
            .iter()
            .filter(|f| f.user_id == user_id)
            .map(|fav| {
                let product = inner
                    .products
                    .iter()
                    .find(|p| p.id == fav.product_id)
                    .ok_or_else(|| {
                        PortError::Unexpected(format!(
                            "favorite {} references missing product",
                            fav.id
                        ))
                    })?;
                Ok((fav.clone(), product.clone()))
            })
            .collect()
    }

    async fn find_favorite(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> PortResult<Option<UserFavorite>> {
        Ok(self
            .lock()
            .favorites
            .iter()
            .find(|f| f.user_id == user_id && f.product_id == product_id)
            .cloned())
    }

    async fn insert_favorite(&self, user_id: Uuid, product_id: Uuid) -> PortResult<UserFavorite> {
        let mut inner = self.lock();
        if inner
            .favorites
            .iter()
            .any(|f| f.user_id == user_id && f.product_id == product_id)
        {
            return Err(PortError::Unexpected(
                "duplicate (user, product) favorite".to_string(),
            ));
        }
        let favorite = UserFavorite {
            id: Uuid::new_v4(),
            user_id,
            product_id,
        };
        inner.favorites.push(favorite.clone());
        Ok(favorite)
    }

    async fn delete_favorite(&self, favorite_id: Uuid) -> PortResult<()> {
        self.lock().favorites.retain(|f| f.id != favorite_id);
        Ok(())
    }
}
