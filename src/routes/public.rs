use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that need no token: the service index, health check, account
/// creation and sign-in, and read-only access to listings.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Index of API groups.
        .route("/", get(handlers::index))
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(handlers::health))
        // --- Auth ---
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/signin", post(handlers::signin))
        // --- Listings ---
        // GET /api/properties?search=&propertyType=&...&page=&limit=
        .route("/api/properties", get(handlers::list_properties))
        // GET /api/properties/{id}
        // Detail view with owner contact, ordered images and relation counts.
        .route("/api/properties/{id}", get(handlers::get_property))
}
