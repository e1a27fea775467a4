//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::MediaStore;
use crate::config::Config;
use std::sync::Arc;
use storefront_core::cart::CartService;
use storefront_core::favorites::FavoritesService;
use storefront_core::ports::StorefrontStore;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StorefrontStore>,
    pub media: Arc<dyn MediaStore>,
    pub config: Arc<Config>,
    pub cart: CartService,
    pub favorites: FavoritesService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn StorefrontStore>,
        media: Arc<dyn MediaStore>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            cart: CartService::new(store.clone()),
            favorites: FavoritesService::new(store.clone()),
            store,
            media,
            config,
        }
    }
}
