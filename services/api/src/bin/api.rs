//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{db::PgStore, media::LocalMediaStore},
    config::Config,
    error::ApiError,
    web::{
        auth::{login_handler, logout_handler, profile_handler, signup_handler},
        cart::{
            add_cart_item_handler, change_quantity_handler, clear_cart_handler, get_cart_handler,
            remove_cart_item_handler,
        },
        favorites::{list_favorites_handler, remove_favorite_handler, toggle_favorite_handler},
        middleware::require_auth,
        products::{
            create_product_handler, delete_product_handler, get_product_handler,
            list_categories_handler, list_products_handler,
        },
        ApiDoc, AppState,
    },
};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(PgStore::new(db_pool.clone()));
    info!("Running database migrations...");
    store.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Adapters & Shared AppState ---
    let media = Arc::new(LocalMediaStore::new(
        config.media_dir.clone(),
        config.media_base_url.clone(),
    ));
    let app_state = Arc::new(AppState::new(store, media, config.clone()));

    let allowed_origin = config
        .allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid ALLOWED_ORIGIN: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    // Public routes (no auth required). The admin product mutations share
    // paths with the public listing, so they resolve the session themselves.
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route(
            "/products",
            get(list_products_handler)
                .post(create_product_handler)
                .delete(delete_product_handler),
        )
        .route("/products/{id}", get(get_product_handler))
        .route("/categories", get(list_categories_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/cart",
            get(get_cart_handler)
                .patch(change_quantity_handler)
                .delete(clear_cart_handler),
        )
        .route(
            "/cart-items",
            post(add_cart_item_handler).delete(remove_cart_item_handler),
        )
        .route(
            "/favorites",
            get(list_favorites_handler)
                .post(toggle_favorite_handler)
                .delete(remove_favorite_handler),
        )
        .route("/profile", get(profile_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service(&config.media_base_url, ServeDir::new(&config.media_dir))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
