pub mod auth;
pub mod cart;
pub mod docs;
pub mod favorites;
pub mod middleware;
pub mod products;
pub mod respond;
pub mod state;

// Re-export the pieces the binaries wire together.
pub use docs::ApiDoc;
pub use middleware::require_auth;
pub use state::AppState;
