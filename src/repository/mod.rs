use crate::models::{
    AdminDashboardStats, Inquiry, InquiryStatus, NewInquiry, NewPropertyImage, NewUser,
    ProfileUpdate, Property, PropertyCounts, PropertyFilter, PropertyImage, UpdatePropertyRequest,
    CreatePropertyRequest, UserContact, UserRecord, WishlistEntry,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A unique constraint rejected the write. Carries the client-facing message.
    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, so services
/// work the same against Postgres and the in-memory store.
///
/// Ownership rules are not enforced here: the services decide who may call what.
/// Multi-row results come back in the order each method documents.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn find_user_by_id(&self, id: Uuid) -> RepoResult<Option<UserRecord>>;
    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>>;
    /// Fails with `Conflict` when the email is taken.
    async fn create_user(&self, user: NewUser) -> RepoResult<UserRecord>;
    /// `None` fields are left unchanged.
    async fn update_user_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> RepoResult<Option<UserRecord>>;
    async fn user_contacts(&self, ids: &[Uuid]) -> RepoResult<Vec<UserContact>>;

    // --- Properties ---
    /// One page of matching properties, newest first, plus the total match count.
    async fn list_properties(&self, filter: &PropertyFilter) -> RepoResult<(Vec<Property>, i64)>;
    async fn get_property(&self, id: Uuid) -> RepoResult<Option<Property>>;
    async fn properties_by_ids(&self, ids: &[Uuid]) -> RepoResult<Vec<Property>>;
    /// Newest first.
    async fn list_properties_by_owner(&self, owner_id: Uuid) -> RepoResult<Vec<Property>>;
    async fn create_property(
        &self,
        owner_id: Uuid,
        req: CreatePropertyRequest,
    ) -> RepoResult<Property>;
    async fn update_property(
        &self,
        id: Uuid,
        patch: UpdatePropertyRequest,
    ) -> RepoResult<Option<Property>>;
    /// Cascades to images, inquiries and wishlist entries. Returns false if absent.
    async fn delete_property(&self, id: Uuid) -> RepoResult<bool>;
    async fn set_property_verified(&self, id: Uuid, verified: bool)
    -> RepoResult<Option<Property>>;
    async fn property_counts(&self, ids: &[Uuid]) -> RepoResult<Vec<PropertyCounts>>;

    // --- Images ---
    /// Grouped by property, ascending `order` within each.
    async fn images_for_properties(&self, ids: &[Uuid]) -> RepoResult<Vec<PropertyImage>>;
    /// Inserts the whole batch atomically. Orders continue from the current
    /// image count of the property, in the given sequence. `None` when the
    /// property does not exist.
    async fn add_property_images(
        &self,
        property_id: Uuid,
        images: Vec<NewPropertyImage>,
    ) -> RepoResult<Option<Vec<PropertyImage>>>;

    // --- Inquiries ---
    async fn create_inquiry(&self, inquiry: NewInquiry) -> RepoResult<Inquiry>;
    async fn get_inquiry(&self, id: Uuid) -> RepoResult<Option<Inquiry>>;
    /// Newest first.
    async fn list_inquiries_for_property(&self, property_id: Uuid) -> RepoResult<Vec<Inquiry>>;
    /// Newest first.
    async fn list_inquiries_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Inquiry>>;
    async fn update_inquiry_status(
        &self,
        id: Uuid,
        status: InquiryStatus,
    ) -> RepoResult<Option<Inquiry>>;

    // --- Wishlist ---
    /// Newest entry first.
    async fn list_wishlist(&self, user_id: Uuid) -> RepoResult<Vec<WishlistEntry>>;
    async fn find_wishlist_entry(
        &self,
        user_id: Uuid,
        property_id: Uuid,
    ) -> RepoResult<Option<WishlistEntry>>;
    /// Fails with `Conflict` when the pair already exists.
    async fn add_wishlist_entry(&self, user_id: Uuid, property_id: Uuid)
    -> RepoResult<WishlistEntry>;
    async fn remove_wishlist_entry(&self, user_id: Uuid, property_id: Uuid) -> RepoResult<bool>;

    // --- Admin ---
    async fn get_stats(&self) -> RepoResult<AdminDashboardStats>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

pub(crate) const EMAIL_TAKEN: &str = "User already exists with this email";
pub(crate) const ALREADY_WISHLISTED: &str = "Property already in wishlist";
