use crate::{
    AppState, handlers,
    services::properties::{MAX_IMAGE_BYTES, MAX_IMAGES_PER_REQUEST},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
};

/// Multipart overhead allowance on top of the raw image bytes.
const MULTIPART_SLACK: usize = 1024 * 1024;

/// Authenticated Router Module
///
/// Every route here sits behind `auth_middleware`, so handlers always receive a
/// resolved `AuthUser`. Listing management additionally requires the
/// `Landlord` gate; ownership is checked in `PropertyService`.
pub fn authenticated_routes() -> Router<AppState> {
    let upload_limit = MAX_IMAGES_PER_REQUEST * MAX_IMAGE_BYTES + MULTIPART_SLACK;

    Router::<AppState>::new()
        // --- Account ---
        .route("/api/auth/me", get(handlers::get_me))
        .route("/api/auth/profile", put(handlers::update_profile))
        // --- Listing Management (LANDLORD) ---
        // GET /api/properties/my-properties
        // The static segment wins over the public `/api/properties/{id}` route.
        .route(
            "/api/properties/my-properties",
            get(handlers::get_my_properties),
        )
        .route("/api/properties", post(handlers::create_property))
        // PUT/DELETE /api/properties/{id}
        // Owner-or-admin check enforced by the service.
        .route(
            "/api/properties/{id}",
            put(handlers::update_property).delete(handlers::delete_property),
        )
        // POST /api/properties/{id}/images
        // Multipart upload; the body limit covers ten full-size images.
        .route(
            "/api/properties/{id}/images",
            post(handlers::upload_property_images).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // --- Inquiries ---
        .route("/api/inquiries", post(handlers::create_inquiry))
        .route(
            "/api/inquiries/my-inquiries",
            get(handlers::get_my_inquiries),
        )
        .route(
            "/api/inquiries/property/{id}",
            get(handlers::get_property_inquiries),
        )
        .route(
            "/api/inquiries/{id}/status",
            patch(handlers::update_inquiry_status),
        )
        // --- Wishlist ---
        .route("/api/wishlist", get(handlers::get_wishlist))
        .route(
            "/api/wishlist/check/{property_id}",
            get(handlers::check_wishlist),
        )
        .route(
            "/api/wishlist/{property_id}",
            post(handlers::add_to_wishlist).delete(handlers::remove_from_wishlist),
        )
}
