pub mod auth;
mod coupons;
pub mod error;
pub mod guard;
mod items;
mod validation;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout));

    let marketplace_routes = Router::new()
        // Buy (public; only pending listings are browsable)
        .route("/buy", get(items::list_buyable))
        .route("/buy/:id", get(items::get_buyable))
        .route("/buy/:id", put(items::purchase_item))
        // Sell (gated to authenticated users by the authorization gate)
        .route("/sell", get(items::list_owned))
        .route("/sell", post(items::create_item))
        .route("/sell/:id", get(items::get_owned))
        .route("/sell/:id", put(items::update_item))
        .route("/sell/:id", delete(items::delete_item))
        // Coupons (gated to admins; id travels in the body for PUT/DELETE)
        .route("/coupon", get(coupons::list_coupons))
        .route("/coupon", post(coupons::create_coupon))
        .route("/coupon", put(coupons::update_coupon))
        .route("/coupon", delete(coupons::delete_coupon));

    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth_routes)
        .merge(marketplace_routes)
        // The gate wraps every route, including unmatched paths
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::authorize,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
