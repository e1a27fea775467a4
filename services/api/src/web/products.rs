//! services/api/src/web/products.rs
//!
//! Catalog endpoints: public browsing (list, detail, categories) and the
//! admin-only product creation/deletion flow. Admin routes share paths with
//! the public listing, so they resolve the session themselves instead of
//! sitting behind the auth middleware.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::domain::{Category, Product};
use storefront_core::ports::ProductFilter;
use tracing::error;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::web::middleware::{current_user, require_admin};
use crate::web::respond::ApiFailure;
use crate::web::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            image_url: product.image_url,
            category_id: product.category_id,
            is_active: product.is_active,
            created_at: product.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailDto {
    #[serde(flatten)]
    pub product: ProductDto,
    pub category: Option<CategoryDto>,
    pub is_product_favorited: bool,
    pub is_in_cart: bool,
}

#[derive(Deserialize, IntoParams)]
pub struct ProductListQuery {
    /// Restrict the listing to one category.
    pub category: Option<Uuid>,
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
    pub skip: Option<i64>,
    pub take: Option<i64>,
}

#[derive(Deserialize, ToSchema)]
pub struct DeleteProductRequest {
    pub id: Option<Uuid>,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteProductResponse {
    pub success: bool,
    pub product: ProductDto,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /products - Browse the catalog with optional filters.
#[utoipa::path(
    get,
    path = "/products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Matching products, newest first", body = [ProductDto])
    )
)]
pub async fn list_products_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductListQuery>,
) -> Result<impl IntoResponse, ApiFailure> {
    let filter = ProductFilter {
        category_id: query.category,
        search: query.search.filter(|s| !s.is_empty()),
        skip: query.skip.unwrap_or(0).max(0),
        take: query.take.unwrap_or(DEFAULT_PAGE_SIZE).max(0),
    };

    let products = state.store.list_products(&filter).await?;
    let products: Vec<ProductDto> = products.into_iter().map(Into::into).collect();
    Ok(Json(products))
}

/// GET /products/{id} - Product detail with category.
///
/// When the request carries a valid session cookie, the response also
/// reports whether the viewer has favorited the product and whether it is
/// in their cart; anonymous viewers get `false` for both.
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product", body = ProductDetailDto),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiFailure> {
    let product = state
        .store
        .get_product(id)
        .await?
        .ok_or_else(|| ApiFailure::not_found("Product not found"))?;

    let category = match product.category_id {
        Some(category_id) => state.store.get_category(category_id).await?,
        None => None,
    };

    let mut is_product_favorited = false;
    let mut is_in_cart = false;
    if let Some(viewer) = current_user(&state, &headers).await {
        is_product_favorited = state
            .store
            .find_favorite(viewer.user_id, id)
            .await?
            .is_some();
        if let Some(cart) = state.store.find_cart_by_user(viewer.user_id).await? {
            is_in_cart = state.store.find_cart_item(cart.id, id).await?.is_some();
        }
    }

    Ok(Json(ProductDetailDto {
        product: product.into(),
        category: category.map(Into::into),
        is_product_favorited,
        is_in_cart,
    }))
}

/// POST /products - Create a product (admin only).
///
/// Accepts a multipart form with `name`, `description`, `price`,
/// `categoryId`, and an `image` file. The image is stored through the media
/// adapter and its public URL recorded on the product.
#[utoipa::path(
    post,
    path = "/products",
    request_body(content_type = "multipart/form-data", description = "Product fields plus an image file."),
    responses(
        (status = 201, description = "Product created", body = ProductDto),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn create_product_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiFailure> {
    require_admin(&state, &headers).await?;

    let mut name: Option<String> = None;
    let mut description = String::new();
    let mut price: Option<Decimal> = None;
    let mut category_id: Option<Uuid> = None;
    let mut image: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Failed to read multipart data: {}", e);
        ApiFailure::bad_request("Malformed multipart form")
    })? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => {
                name = Some(read_text_field(field).await?);
            }
            "description" => {
                description = read_text_field(field).await?;
            }
            "price" => {
                let raw = read_text_field(field).await?;
                let parsed = raw
                    .parse::<Decimal>()
                    .map_err(|_| ApiFailure::bad_request("Invalid price"))?;
                if parsed < Decimal::ZERO {
                    return Err(ApiFailure::bad_request("Invalid price"));
                }
                price = Some(parsed);
            }
            "categoryId" => {
                let raw = read_text_field(field).await?;
                if !raw.is_empty() {
                    category_id = Some(
                        raw.parse::<Uuid>()
                            .map_err(|_| ApiFailure::bad_request("Invalid categoryId"))?,
                    );
                }
            }
            "image" => {
                let file_name = field.file_name().unwrap_or("image.bin").to_string();
                let data = field.bytes().await.map_err(|e| {
                    error!("Failed to read image bytes: {}", e);
                    ApiFailure::bad_request("Malformed multipart form")
                })?;
                image = Some((file_name, data.to_vec()));
            }
            _ => {}
        }
    }

    let name = name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiFailure::bad_request("Missing name"))?;
    let price = price.ok_or_else(|| ApiFailure::bad_request("Missing price"))?;
    let (file_name, bytes) =
        image.ok_or_else(|| ApiFailure::bad_request("Image required"))?;

    if let Some(category_id) = category_id {
        if state.store.get_category(category_id).await?.is_none() {
            return Err(ApiFailure::bad_request("Unknown categoryId"));
        }
    }

    let image_url = state.media.store_image(&file_name, &bytes).await?;
    let product = state
        .store
        .create_product(&name, &description, price, Some(&image_url), category_id)
        .await?;

    Ok((StatusCode::CREATED, Json(ProductDto::from(product))))
}

/// DELETE /products - Delete a product (admin only).
///
/// Refused while the product sits in any user's cart.
#[utoipa::path(
    delete,
    path = "/products",
    request_body = DeleteProductRequest,
    responses(
        (status = 200, description = "Product deleted", body = DeleteProductResponse),
        (status = 400, description = "Missing id, or the product is in a cart"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn delete_product_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<DeleteProductRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    require_admin(&state, &headers).await?;

    let id = req
        .id
        .ok_or_else(|| ApiFailure::bad_request("Product ID is required"))?;

    if state.store.product_in_any_cart(id).await? {
        return Err(ApiFailure::bad_request(
            "The product you are trying to delete is currently in a user's cart.",
        ));
    }

    let product = state
        .store
        .delete_product(id)
        .await?
        .ok_or_else(|| ApiFailure::not_found("Product not found"))?;

    Ok(Json(DeleteProductResponse {
        success: true,
        product: product.into(),
    }))
}

/// GET /categories - All categories, ordered by name.
#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "All categories", body = [CategoryDto])
    )
)]
pub async fn list_categories_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiFailure> {
    let categories = state.store.list_categories().await?;
    let categories: Vec<CategoryDto> = categories.into_iter().map(Into::into).collect();
    Ok(Json(categories))
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiFailure> {
    field.text().await.map_err(|e| {
        error!("Failed to read multipart field: {}", e);
        ApiFailure::bad_request("Malformed multipart form")
    })
}
