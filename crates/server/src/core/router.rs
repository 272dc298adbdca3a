//! Core Router
//!
//! Public auth routes, the token-gated item routes, and the static front end.

use crate::core::auth::{handlers as auth_handlers, middleware::mw_require_auth};
use crate::core::items::handlers as item_handlers;
use crate::core::AppState;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::services::ServeDir;

pub fn router(state: AppState) -> Router {
    let items: Router<AppState> = Router::new()
        .route(
            "/items",
            get(item_handlers::list_items).post(item_handlers::add_item),
        )
        .route(
            "/items/{id}",
            put(item_handlers::edit_item).delete(item_handlers::delete_item),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            mw_require_auth,
        ));

    let front_end = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/register", post(auth_handlers::register))
        .route("/login", post(auth_handlers::login))
        .route("/health", get(health_check))
        .merge(items)
        .fallback_service(front_end)
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK"
}
