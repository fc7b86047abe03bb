use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch},
};

/// Admin Router Module
///
/// Moderation and oversight endpoints. Mounted under `/api/admin` behind the
/// auth middleware; each handler also takes the `Admin` gate, so a valid token
/// for a non-admin gets 403.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /api/admin/stats
        // Dashboard counts (users, properties, inquiries, wishlist entries, unverified).
        .route("/stats", get(handlers::get_admin_stats))
        // PATCH /api/admin/properties/{id}/verify
        // Sets the listing's `verified` flag.
        .route(
            "/properties/{id}/verify",
            patch(handlers::verify_property),
        )
}
