//! services/api/src/web/cart.rs
//!
//! Cart endpoints. Handlers stay thin: they validate input, hand the
//! authenticated user id to the `CartService`, and shape the snapshot into
//! the response JSON.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::cart::{ClearOutcome, QuantityAction};
use storefront_core::domain::{AuthUser, CartItem, CartLine, CartSnapshot};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::respond::ApiFailure;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartProductDto {
    pub id: Uuid,
    pub name: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub image_url: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLineDto {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub product: CartProductDto,
}

impl From<CartLine> for CartLineDto {
    fn from(line: CartLine) -> Self {
        Self {
            id: line.id,
            product_id: line.product_id,
            quantity: line.quantity,
            product: CartProductDto {
                id: line.product.id,
                name: line.product.name,
                price: line.product.price,
                image_url: line.product.image_url,
            },
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartDto {
    pub id: Option<Uuid>,
    pub items: Vec<CartLineDto>,
    #[schema(value_type = f64)]
    pub total_price: Decimal,
    pub total_quantity: i32,
}

impl From<CartSnapshot> for CartDto {
    fn from(snapshot: CartSnapshot) -> Self {
        Self {
            id: snapshot.id,
            items: snapshot.items.into_iter().map(Into::into).collect(),
            total_price: snapshot.total_price,
            total_quantity: snapshot.total_quantity,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItemDto {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

impl From<CartItem> for CartItemDto {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.id,
            cart_id: item.cart_id,
            product_id: item.product_id,
            quantity: item.quantity,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub product_id: Option<Uuid>,
}

#[derive(Serialize, ToSchema)]
pub struct AddCartItemResponse {
    pub message: String,
    pub item: CartItemDto,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeQuantityRequest {
    pub product_id: Option<Uuid>,
    pub action: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ChangeQuantityResponse {
    pub message: String,
    pub cart: CartDto,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCartItemRequest {
    pub cart_item_id: Option<Uuid>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCartItemResponse {
    pub message: String,
    pub items: Vec<CartLineDto>,
    #[schema(value_type = f64)]
    pub total_price: Decimal,
    pub total_quantity: i32,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearCartResponse {
    pub message: String,
    pub items: Vec<CartLineDto>,
    #[schema(value_type = f64)]
    pub total_price: Decimal,
    pub total_quantity: i32,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /cart - The signed-in user's cart with joined product summaries.
///
/// A user without a cart gets an empty snapshot; no cart row is created by
/// the read.
#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "The user's cart", body = CartDto),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_cart_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiFailure> {
    let snapshot = state.cart.get_cart(auth.user_id).await?;
    Ok(Json(CartDto::from(snapshot)))
}

/// POST /cart-items - Add one unit of a product to the cart.
///
/// Creates the cart lazily; adding a product already in the cart increments
/// its line instead of creating a duplicate.
#[utoipa::path(
    post,
    path = "/cart-items",
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Added to cart", body = AddCartItemResponse),
        (status = 400, description = "Missing productId"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn add_cart_item_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<AddCartItemRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let product_id = req
        .product_id
        .ok_or_else(|| ApiFailure::bad_request("Missing productId"))?;

    let item = state.cart.add_item(auth.user_id, product_id).await?;
    Ok(Json(AddCartItemResponse {
        message: "Added to cart".to_string(),
        item: item.into(),
    }))
}

/// PATCH /cart - Increase or decrease the quantity of a line.
///
/// A line reaching zero is removed; a cart emptying out is deleted and the
/// zeroed snapshot is returned.
#[utoipa::path(
    patch,
    path = "/cart",
    request_body = ChangeQuantityRequest,
    responses(
        (status = 200, description = "Cart updated", body = ChangeQuantityResponse),
        (status = 400, description = "Missing productId or unrecognized action"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Cart or product line not found")
    )
)]
pub async fn change_quantity_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<ChangeQuantityRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let product_id = req
        .product_id
        .ok_or_else(|| ApiFailure::bad_request("Missing productId"))?;
    let action: QuantityAction = req
        .action
        .as_deref()
        .unwrap_or("")
        .parse()
        .map_err(|_| ApiFailure::bad_request("Invalid action"))?;

    let snapshot = state
        .cart
        .change_quantity(auth.user_id, product_id, action)
        .await?;

    let message = if snapshot.id.is_none() {
        "Cart is empty and deleted"
    } else {
        "Cart updated"
    };
    Ok(Json(ChangeQuantityResponse {
        message: message.to_string(),
        cart: snapshot.into(),
    }))
}

/// DELETE /cart-items - Remove a line by its cart item id.
///
/// The item must belong to the requesting user's cart.
#[utoipa::path(
    delete,
    path = "/cart-items",
    request_body = RemoveCartItemRequest,
    responses(
        (status = 200, description = "Cart item removed", body = RemoveCartItemResponse),
        (status = 400, description = "Missing cartItemId"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Cart or item not found")
    )
)]
pub async fn remove_cart_item_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<RemoveCartItemRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let cart_item_id = req
        .cart_item_id
        .ok_or_else(|| ApiFailure::bad_request("Missing cartItemId"))?;

    let snapshot = state.cart.remove_item(auth.user_id, cart_item_id).await?;
    Ok(Json(RemoveCartItemResponse {
        message: "Cart item removed".to_string(),
        total_price: snapshot.total_price,
        total_quantity: snapshot.total_quantity,
        items: snapshot.items.into_iter().map(Into::into).collect(),
    }))
}

/// DELETE /cart - Clear the cart entirely.
///
/// Idempotent: clearing a nonexistent cart reports "already empty" rather
/// than failing.
#[utoipa::path(
    delete,
    path = "/cart",
    responses(
        (status = 200, description = "Cart cleared (or was already empty)", body = ClearCartResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn clear_cart_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiFailure> {
    let outcome = state.cart.clear_cart(auth.user_id).await?;
    let message = match outcome {
        ClearOutcome::Cleared => "Cart cleared",
        ClearOutcome::AlreadyEmpty => "Cart already empty",
    };
    Ok(Json(ClearCartResponse {
        message: message.to_string(),
        items: Vec::new(),
        total_price: Decimal::ZERO,
        total_quantity: 0,
    }))
}
