pub mod cart;
pub mod domain;
pub mod favorites;
pub mod ports;

#[cfg(test)]
mod memory_store;

pub use cart::{CartService, ClearOutcome, QuantityAction};
pub use domain::{
    AuthSession, AuthUser, Cart, CartItem, CartLine, CartSnapshot, Category, FavoriteProduct,
    Product, ProductSummary, Role, User, UserCredentials, UserFavorite,
};
pub use favorites::FavoritesService;
pub use ports::{PortError, PortResult, ProductFilter, StorefrontStore};
