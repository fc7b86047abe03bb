//! Resource services.
//!
//! Each service owns the rules of one resource (validation has already run,
//! so inputs are typed): existence checks, ownership checks and response
//! shaping. Handlers stay thin and only translate HTTP into service calls.

pub mod auth;
pub mod inquiries;
pub mod properties;
pub mod wishlist;

pub use auth::AuthService;
pub use inquiries::InquiryService;
pub use properties::{ImageUpload, PropertyService};
pub use wishlist::WishlistService;
