//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `StorefrontStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use storefront_core::domain::{
    AuthUser, Cart, CartItem, CartLine, Category, Product, ProductSummary, Role, User,
    UserCredentials, UserFavorite,
};
use storefront_core::ports::{PortError, PortResult, ProductFilter, StorefrontStore};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `StorefrontStore` port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn parse_role(raw: &str) -> Role {
    raw.parse().unwrap_or(Role::Customer)
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    name: Option<String>,
    role: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: self.name,
            role: parse_role(&self.role),
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    email: String,
    hashed_password: String,
    role: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.id,
            email: self.email,
            hashed_password: self.hashed_password,
            role: parse_role(&self.role),
        }
    }
}

#[derive(FromRow)]
struct AuthUserRecord {
    user_id: Uuid,
    role: String,
}
impl AuthUserRecord {
    fn to_domain(self) -> AuthUser {
        AuthUser {
            user_id: self.user_id,
            role: parse_role(&self.role),
        }
    }
}

#[derive(FromRow)]
struct CategoryRecord {
    id: Uuid,
    name: String,
}
impl CategoryRecord {
    fn to_domain(self) -> Category {
        Category {
            id: self.id,
            name: self.name,
        }
    }
}

#[derive(FromRow)]
struct ProductRecord {
    id: Uuid,
    name: String,
    description: String,
    price: Decimal,
    image_url: Option<String>,
    category_id: Option<Uuid>,
    is_active: bool,
    created_at: DateTime<Utc>,
}
impl ProductRecord {
    fn to_domain(self) -> Product {
        Product {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
            category_id: self.category_id,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CartRecord {
    id: Uuid,
    user_id: Uuid,
    total_price: Decimal,
    total_quantity: i32,
}
impl CartRecord {
    fn to_domain(self) -> Cart {
        Cart {
            id: self.id,
            user_id: self.user_id,
            total_price: self.total_price,
            total_quantity: self.total_quantity,
        }
    }
}

#[derive(FromRow)]
struct CartItemRecord {
    id: Uuid,
    cart_id: Uuid,
    product_id: Uuid,
    quantity: i32,
}
impl CartItemRecord {
    fn to_domain(self) -> CartItem {
        CartItem {
            id: self.id,
            cart_id: self.cart_id,
            product_id: self.product_id,
            quantity: self.quantity,
        }
    }
}

#[derive(FromRow)]
struct CartLineRecord {
    id: Uuid,
    product_id: Uuid,
    quantity: i32,
    product_name: String,
    product_price: Decimal,
    product_image_url: Option<String>,
}
impl CartLineRecord {
    fn to_domain(self) -> CartLine {
        CartLine {
            id: self.id,
            product_id: self.product_id,
            quantity: self.quantity,
            product: ProductSummary {
                id: self.product_id,
                name: self.product_name,
                price: self.product_price,
                image_url: self.product_image_url,
            },
        }
    }
}

#[derive(FromRow)]
struct FavoriteRecord {
    id: Uuid,
    user_id: Uuid,
    product_id: Uuid,
}
impl FavoriteRecord {
    fn to_domain(self) -> UserFavorite {
        UserFavorite {
            id: self.id,
            user_id: self.user_id,
            product_id: self.product_id,
        }
    }
}

//=========================================================================================
// `StorefrontStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl StorefrontStore for PgStore {
    async fn create_user(
        &self,
        email: &str,
        name: Option<&str>,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, email, name, hashed_password, role) \
             VALUES ($1, $2, $3, $4, 'customer') \
             RETURNING id, email, name, role",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(name)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, email, hashed_password, role FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, name, role FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", user_id)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AuthUser> {
        let record = sqlx::query_as::<_, AuthUserRecord>(
            "SELECT u.id AS user_id, u.role FROM auth_sessions s \
             JOIN users u ON u.id = s.user_id \
             WHERE s.id = $1 AND s.expires_at > now()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound("Session not found or expired".to_string()))?;
        Ok(record.to_domain())
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn list_products(&self, filter: &ProductFilter) -> PortResult<Vec<Product>> {
        let records = sqlx::query_as::<_, ProductRecord>(
            "SELECT id, name, description, price, image_url, category_id, is_active, created_at \
             FROM products \
             WHERE ($1::uuid IS NULL OR category_id = $1) \
               AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%') \
             ORDER BY created_at DESC \
             OFFSET $3 LIMIT $4",
        )
        .bind(filter.category_id)
        .bind(filter.search.as_deref())
        .bind(filter.skip)
        .bind(filter.take)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_product(&self, product_id: Uuid) -> PortResult<Option<Product>> {
        let record = sqlx::query_as::<_, ProductRecord>(
            "SELECT id, name, description, price, image_url, category_id, is_active, created_at \
             FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn find_product_price(&self, product_id: Uuid) -> PortResult<Option<Decimal>> {
        let price = sqlx::query_scalar::<_, Decimal>("SELECT price FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(price)
    }

    async fn create_product(
        &self,
        name: &str,
        description: &str,
        price: Decimal,
        image_url: Option<&str>,
        category_id: Option<Uuid>,
    ) -> PortResult<Product> {
        let record = sqlx::query_as::<_, ProductRecord>(
            "INSERT INTO products (id, name, description, price, image_url, category_id, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, TRUE) \
             RETURNING id, name, description, price, image_url, category_id, is_active, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(image_url)
        .bind(category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn delete_product(&self, product_id: Uuid) -> PortResult<Option<Product>> {
        let record = sqlx::query_as::<_, ProductRecord>(
            "DELETE FROM products WHERE id = $1 \
             RETURNING id, name, description, price, image_url, category_id, is_active, created_at",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn product_in_any_cart(&self, product_id: Uuid) -> PortResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM cart_items WHERE product_id = $1)",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(exists)
    }

    async fn list_categories(&self) -> PortResult<Vec<Category>> {
        let records =
            sqlx::query_as::<_, CategoryRecord>("SELECT id, name FROM categories ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_category(&self, category_id: Uuid) -> PortResult<Option<Category>> {
        let record =
            sqlx::query_as::<_, CategoryRecord>("SELECT id, name FROM categories WHERE id = $1")
                .bind(category_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn find_cart_by_user(&self, user_id: Uuid) -> PortResult<Option<Cart>> {
        let record = sqlx::query_as::<_, CartRecord>(
            "SELECT id, user_id, total_price, total_quantity FROM carts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn create_cart(&self, user_id: Uuid) -> PortResult<Cart> {
        let record = sqlx::query_as::<_, CartRecord>(
            "INSERT INTO carts (id, user_id, total_price, total_quantity) \
             VALUES ($1, $2, 0, 0) \
             RETURNING id, user_id, total_price, total_quantity",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn update_cart_totals(
        &self,
        cart_id: Uuid,
        total_price: Decimal,
        total_quantity: i32,
    ) -> PortResult<()> {
        sqlx::query("UPDATE carts SET total_price = $1, total_quantity = $2 WHERE id = $3")
            .bind(total_price)
            .bind(total_quantity)
            .bind(cart_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn delete_cart(&self, cart_id: Uuid) -> PortResult<()> {
        // cart_items go with it via ON DELETE CASCADE.
        sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn list_cart_lines(&self, cart_id: Uuid) -> PortResult<Vec<CartLine>> {
        let records = sqlx::query_as::<_, CartLineRecord>(
            "SELECT ci.id, ci.product_id, ci.quantity, \
                    p.name AS product_name, p.price AS product_price, \
                    p.image_url AS product_image_url \
             FROM cart_items ci \
             JOIN products p ON p.id = ci.product_id \
             WHERE ci.cart_id = $1 \
             ORDER BY ci.created_at ASC, ci.id ASC",
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn find_cart_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> PortResult<Option<CartItem>> {
        let record = sqlx::query_as::<_, CartItemRecord>(
            "SELECT id, cart_id, product_id, quantity FROM cart_items \
             WHERE cart_id = $1 AND product_id = $2",
        )
        .bind(cart_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn get_cart_item(&self, cart_item_id: Uuid) -> PortResult<Option<CartItem>> {
        let record = sqlx::query_as::<_, CartItemRecord>(
            "SELECT id, cart_id, product_id, quantity FROM cart_items WHERE id = $1",
        )
        .bind(cart_item_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn insert_cart_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> PortResult<CartItem> {
        let record = sqlx::query_as::<_, CartItemRecord>(
            "INSERT INTO cart_items (id, cart_id, product_id, quantity) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, cart_id, product_id, quantity",
        )
        .bind(Uuid::new_v4())
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn set_cart_item_quantity(&self, cart_item_id: Uuid, quantity: i32) -> PortResult<()> {
        sqlx::query("UPDATE cart_items SET quantity = $1 WHERE id = $2")
            .bind(quantity)
            .bind(cart_item_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn delete_cart_item(&self, cart_item_id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(cart_item_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn delete_cart_items(&self, cart_id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn list_favorites_with_products(
        &self,
        user_id: Uuid,
    ) -> PortResult<Vec<(UserFavorite, Product)>> {
        #[derive(FromRow)]
        struct Row {
            id: Uuid,
            user_id: Uuid,
            product_id: Uuid,
            name: String,
            description: String,
            price: Decimal,
            image_url: Option<String>,
            category_id: Option<Uuid>,
            is_active: bool,
            created_at: DateTime<Utc>,
        }

        let rows = sqlx::query_as::<_, Row>(
            "SELECT f.id, f.user_id, f.product_id, \
                    p.name, p.description, p.price, p.image_url, p.category_id, \
                    p.is_active, p.created_at \
             FROM user_favorites f \
             JOIN products p ON p.id = f.product_id \
             WHERE f.user_id = $1 \
             ORDER BY f.created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    UserFavorite {
                        id: row.id,
                        user_id: row.user_id,
                        product_id: row.product_id,
                    },
                    Product {
                        id: row.product_id,
                        name: row.name,
                        description: row.description,
                        price: row.price,
                        image_url: row.image_url,
                        category_id: row.category_id,
                        is_active: row.is_active,
                        created_at: row.created_at,
                    },
                )
            })
            .collect())
    }

    async fn find_favorite(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> PortResult<Option<UserFavorite>> {
        let record = sqlx::query_as::<_, FavoriteRecord>(
            "SELECT id, user_id, product_id FROM user_favorites \
             WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn insert_favorite(&self, user_id: Uuid, product_id: Uuid) -> PortResult<UserFavorite> {
        let record = sqlx::query_as::<_, FavoriteRecord>(
            "INSERT INTO user_favorites (id, user_id, product_id) \
             VALUES ($1, $2, $3) \
             RETURNING id, user_id, product_id",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn delete_favorite(&self, favorite_id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM user_favorites WHERE id = $1")
            .bind(favorite_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
