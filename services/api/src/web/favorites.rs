//! services/api/src/web/favorites.rs
//!
//! Favorites endpoints. The listing enriches each favorited product with the
//! viewer's cart state so the cards can flip between "add to cart" and
//! "remove from cart" without another round trip.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::domain::{AuthUser, FavoriteProduct};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::respond::ApiFailure;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteProductDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub is_in_cart: bool,
    pub cart_item_id: Option<Uuid>,
    pub is_product_favorited: bool,
}

impl From<FavoriteProduct> for FavoriteProductDto {
    fn from(fav: FavoriteProduct) -> Self {
        Self {
            id: fav.product.id,
            name: fav.product.name,
            description: fav.product.description,
            price: fav.product.price,
            image_url: fav.product.image_url,
            category_id: fav.product.category_id,
            is_active: fav.product.is_active,
            created_at: fav.product.created_at,
            is_in_cart: fav.is_in_cart,
            cart_item_id: fav.cart_item_id,
            is_product_favorited: fav.is_product_favorited,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub product_id: Option<Uuid>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub message: String,
    pub is_favorited: bool,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /favorites - The signed-in user's favorited products.
#[utoipa::path(
    get,
    path = "/favorites",
    responses(
        (status = 200, description = "Favorited products with cart state", body = [FavoriteProductDto]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_favorites_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiFailure> {
    let favorites = state.favorites.list_favorites(auth.user_id).await?;
    let products: Vec<FavoriteProductDto> = favorites.into_iter().map(Into::into).collect();
    Ok(Json(products))
}

/// POST /favorites - Toggle a product's favorite state.
#[utoipa::path(
    post,
    path = "/favorites",
    request_body = FavoriteRequest,
    responses(
        (status = 200, description = "Favorite toggled", body = FavoriteResponse),
        (status = 400, description = "Missing productId"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn toggle_favorite_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<FavoriteRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let product_id = req
        .product_id
        .ok_or_else(|| ApiFailure::bad_request("Missing productId"))?;

    let is_favorited = state
        .favorites
        .toggle_favorite(auth.user_id, product_id)
        .await?;

    let message = if is_favorited {
        "Added to favorites"
    } else {
        "Removed from favorites"
    };
    Ok(Json(FavoriteResponse {
        message: message.to_string(),
        is_favorited,
    }))
}

/// DELETE /favorites - Remove a favorite.
///
/// Idempotent; the resulting state is always "not favorited".
#[utoipa::path(
    delete,
    path = "/favorites",
    request_body = FavoriteRequest,
    responses(
        (status = 200, description = "Favorite removed", body = FavoriteResponse),
        (status = 400, description = "Missing productId"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn remove_favorite_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<FavoriteRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let product_id = req
        .product_id
        .ok_or_else(|| ApiFailure::bad_request("Missing productId"))?;

    state
        .favorites
        .remove_favorite(auth.user_id, product_id)
        .await?;

    Ok(Json(FavoriteResponse {
        message: "Removed from favorites".to_string(),
        is_favorited: false,
    }))
}
