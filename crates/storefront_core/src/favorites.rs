//! crates/storefront_core/src/favorites.rs
//!
//! The favorites service: owns the mapping from a user to the set of
//! products they have marked favorite, and reports for each favorite
//! whether the same product currently sits in that user's cart.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::FavoriteProduct;
use crate::ports::{PortError, PortResult, StorefrontStore};

/// Stateless per-request service over the store port.
#[derive(Clone)]
pub struct FavoritesService {
    store: Arc<dyn StorefrontStore>,
}

impl FavoritesService {
    pub fn new(store: Arc<dyn StorefrontStore>) -> Self {
        Self { store }
    }

    /// All products the user has favorited, each enriched with the cart
    /// state (`is_in_cart`, `cart_item_id`) read from the user's cart in a
    /// single pass.
    pub async fn list_favorites(&self, user_id: Uuid) -> PortResult<Vec<FavoriteProduct>> {
        let favorites = self.store.list_favorites_with_products(user_id).await?;

        // Product id -> cart item id for the user's cart, if any.
        let in_cart: HashMap<Uuid, Uuid> = match self.store.find_cart_by_user(user_id).await? {
            Some(cart) => self
                .store
                .list_cart_lines(cart.id)
                .await?
                .into_iter()
                .map(|line| (line.product_id, line.id))
                .collect(),
            None => HashMap::new(),
        };

        Ok(favorites
            .into_iter()
            .map(|(_, product)| {
                let cart_item_id = in_cart.get(&product.id).copied();
                FavoriteProduct {
                    is_in_cart: cart_item_id.is_some(),
                    cart_item_id,
                    is_product_favorited: true,
                    product,
                }
            })
            .collect())
    }

    /// Flips the favorite state of a product for the user and reports the
    /// resulting state. At most one row per (user, product) ever exists.
    pub async fn toggle_favorite(&self, user_id: Uuid, product_id: Uuid) -> PortResult<bool> {
        if let Some(existing) = self.store.find_favorite(user_id, product_id).await? {
            self.store.delete_favorite(existing.id).await?;
            return Ok(false);
        }

        if self.store.get_product(product_id).await?.is_none() {
            return Err(PortError::NotFound(format!(
                "Product {} not found",
                product_id
            )));
        }

        self.store.insert_favorite(user_id, product_id).await?;
        Ok(true)
    }

    /// Removes a favorite if present. Idempotent; the resulting state is
    /// always "not favorited".
    pub async fn remove_favorite(&self, user_id: Uuid, product_id: Uuid) -> PortResult<()> {
        if let Some(existing) = self.store.find_favorite(user_id, product_id).await? {
            self.store.delete_favorite(existing.id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartService;
    use crate::memory_store::MemoryStore;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn toggle_twice_round_trips() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let product = store.seed_product("Mug", dec("5.00"));
        let svc = FavoritesService::new(store.clone() as Arc<dyn StorefrontStore>);

        assert!(svc.toggle_favorite(user, product).await.unwrap());
        assert!(!svc.toggle_favorite(user, product).await.unwrap());
        assert!(svc.list_favorites(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggle_unknown_product_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let svc = FavoritesService::new(store.clone() as Arc<dyn StorefrontStore>);

        let err = svc
            .toggle_favorite(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn listing_reports_cart_membership_per_product() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let mug = store.seed_product("Mug", dec("5.00"));
        let lamp = store.seed_product("Lamp", dec("30.00"));
        let favorites = FavoritesService::new(store.clone() as Arc<dyn StorefrontStore>);
        let cart = CartService::new(store.clone() as Arc<dyn StorefrontStore>);

        favorites.toggle_favorite(user, mug).await.unwrap();
        favorites.toggle_favorite(user, lamp).await.unwrap();
        let mug_item = cart.add_item(user, mug).await.unwrap();

        let listed = favorites.list_favorites(user).await.unwrap();
        assert_eq!(listed.len(), 2);
        for fav in &listed {
            assert!(fav.is_product_favorited);
            if fav.product.id == mug {
                assert!(fav.is_in_cart);
                assert_eq!(fav.cart_item_id, Some(mug_item.id));
            } else {
                assert!(!fav.is_in_cart);
                assert_eq!(fav.cart_item_id, None);
            }
        }
    }

    #[tokio::test]
    async fn listing_only_sees_own_favorites_and_own_cart() {
        let store = Arc::new(MemoryStore::new());
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let mug = store.seed_product("Mug", dec("5.00"));
        let favorites = FavoritesService::new(store.clone() as Arc<dyn StorefrontStore>);
        let cart = CartService::new(store.clone() as Arc<dyn StorefrontStore>);

        favorites.toggle_favorite(alice, mug).await.unwrap();
        // Bob has the mug in his cart; that must not leak into Alice's view.
        cart.add_item(bob, mug).await.unwrap();

        let listed = favorites.list_favorites(alice).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed[0].is_in_cart);
        assert!(favorites.list_favorites(bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_favorite_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let mug = store.seed_product("Mug", dec("5.00"));
        let svc = FavoritesService::new(store.clone() as Arc<dyn StorefrontStore>);

        svc.toggle_favorite(user, mug).await.unwrap();
        svc.remove_favorite(user, mug).await.unwrap();
        svc.remove_favorite(user, mug).await.unwrap();
        assert!(svc.list_favorites(user).await.unwrap().is_empty());
    }
}
