use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::validation::blank_as_none;

// --- Closed Enumerations (Mapped to Postgres ENUM types) ---

/// Role
///
/// The RBAC field carried by every user. Checked exhaustively by the role gates
/// in `auth`; never compared as a raw string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Role {
    #[default]
    Student,
    Landlord,
    Admin,
}

impl Role {
    /// LANDLORD and ADMIN may create and manage listings.
    pub fn can_manage_listings(self) -> bool {
        match self {
            Role::Landlord | Role::Admin => true,
            Role::Student => false,
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "room_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum RoomType {
    #[default]
    Single,
    Shared,
    OneBhk,
    TwoBhk,
    ThreeBhk,
    Studio,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "property_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PropertyType {
    #[default]
    Pg,
    Flat,
    Independent,
    Shared,
    Coliving,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "contact_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ContactType {
    Whatsapp,
    Phone,
    Email,
    #[default]
    ContactForm,
}

/// InquiryStatus
///
/// Lifecycle of an inquiry as seen by the property owner.
/// `NEW -> {CONTACTED, CLOSED, SPAM}`, `CONTACTED -> {CLOSED, SPAM}`.
/// CLOSED and SPAM are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "inquiry_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum InquiryStatus {
    #[default]
    New,
    Contacted,
    Closed,
    Spam,
}

impl InquiryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InquiryStatus::New => "NEW",
            InquiryStatus::Contacted => "CONTACTED",
            InquiryStatus::Closed => "CLOSED",
            InquiryStatus::Spam => "SPAM",
        }
    }

    /// Whether the owner may move an inquiry from `self` to `next`.
    /// Re-applying the current status is accepted as a no-op.
    pub fn can_transition_to(self, next: InquiryStatus) -> bool {
        use InquiryStatus::*;
        match (self, next) {
            (current, next) if current == next => true,
            (New, Contacted | Closed | Spam) => true,
            (Contacted, Closed | Spam) => true,
            _ => false,
        }
    }
}

// --- Core Application Schemas (Mapped to Database) ---

/// UserRecord
///
/// The full `users` row, including the credential hash. Internal only: it is
/// never serialized, responses go through `UserProfile`.
#[derive(Debug, Clone, FromRow, Default)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// UserProfile
///
/// Output schema for the authenticated user's own profile (GET /api/auth/me).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(rename = "userType")]
    pub role: Role,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub verified: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for UserProfile {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            phone: user.phone,
            whatsapp: user.whatsapp,
            verified: user.verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// UserContact
///
/// The public contact subset of a user, joined onto listings (as owner) and
/// inquiries (as sender).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct UserContact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
}

impl From<&UserRecord> for UserContact {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            whatsapp: user.whatsapp.clone(),
        }
    }
}

/// Property
///
/// A rental listing from the `properties` table. Owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Property {
    pub id: Uuid,
    // FK to users.id (Owner).
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub rent: i32,
    pub location: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub room_type: RoomType,
    pub property_type: PropertyType,
    pub amenities: Vec<String>,

    // House rules
    pub smoking: bool,
    pub drinking: bool,
    pub pets: bool,
    pub visitors: bool,

    pub whatsapp_number: Option<String>,
    pub available: bool,
    pub verified: bool,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// PropertyImage
///
/// One gallery image of a property. `order` is assigned by upload sequence
/// and is unique per property.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PropertyImage {
    pub id: Uuid,
    pub property_id: Uuid,
    pub url: String,
    pub filename: String,
    pub size: i64,
    /// Maps SQL column "sort_order" to the field "order" (`order` is reserved in SQL).
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// PropertyCounts
///
/// Number of wishlist entries and inquiries referencing a property.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct PropertyCounts {
    #[serde(skip)]
    pub property_id: Uuid,
    #[ts(type = "number")]
    pub wishlist: i64,
    #[ts(type = "number")]
    pub inquiries: i64,
}

/// PropertyDetails
///
/// A property enriched with its owner's contact subset, its ordered images and,
/// where requested, its relation counts.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PropertyDetails {
    #[serde(flatten)]
    pub property: Property,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserContact>,
    pub images: Vec<PropertyImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<PropertyCounts>,
}

/// Pagination
///
/// Paging metadata returned with the public listing.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    #[ts(type = "number")]
    pub total_count: i64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total_count: i64) -> Self {
        let limit = limit.max(1);
        let total_pages = (total_count.max(0) as u64).div_ceil(limit as u64) as u32;
        Self {
            page,
            limit,
            total_count,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PropertyPage {
    pub properties: Vec<PropertyDetails>,
    pub pagination: Pagination,
}

/// Inquiry
///
/// A contact request from a prospective tenant (the sender) to a property owner.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Inquiry {
    pub id: Uuid,
    pub property_id: Uuid,
    // The sender.
    pub user_id: Uuid,
    pub contact_type: ContactType,
    pub status: InquiryStatus,
    pub message: Option<String>,
    pub user_phone: Option<String>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// PropertySummary
///
/// Minimal listing info joined onto inquiries.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PropertySummary {
    pub id: Uuid,
    pub title: String,
    pub rent: i32,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<PropertyImage>,
}

impl PropertySummary {
    pub fn new(property: &Property, image: Option<PropertyImage>) -> Self {
        Self {
            id: property.id,
            title: property.title.clone(),
            rent: property.rent,
            location: property.location.clone(),
            image,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct InquiryDetails {
    #[serde(flatten)]
    pub inquiry: Inquiry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<PropertySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<UserContact>,
}

/// WishlistEntry
///
/// Join row of the `wishlist` table. The composite primary key
/// `(user_id, property_id)` enforces one entry per pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub user_id: Uuid,
    pub property_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// --- Persistence Inputs ---

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPropertyImage {
    pub url: String,
    pub filename: String,
    pub size: i64,
}

#[derive(Debug, Clone)]
pub struct NewInquiry {
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub contact_type: ContactType,
    pub message: Option<String>,
    pub user_phone: Option<String>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
}

// --- Request Payloads (Validated Input Schemas) ---
// Field rules are declared with `validator`; `validation` normalizes each
// payload and runs them. Also exported for the typed frontend client.

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SignupRequest {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    /// Only STUDENT and LANDLORD may self-register.
    #[serde(rename = "userType")]
    pub role: Role,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default, PartialEq)]
#[ts(export)]
pub struct SigninRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// ProfileUpdate
///
/// Partial update of the caller's own profile. `None` leaves a field unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default, PartialEq)]
#[ts(export)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
}

/// CreatePropertyRequest
///
/// Input payload for a new listing (POST /api/properties). Amenities and the
/// house-rule flags default to empty and `false`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreatePropertyRequest {
    #[validate(length(min = 5, message = "Title must be at least 5 characters"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Rent must be greater than 0"))]
    pub rent: i32,
    #[validate(length(min = 3, message = "Location is required"))]
    pub location: String,
    pub room_type: RoomType,
    pub property_type: PropertyType,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    #[serde(default)]
    pub smoking: bool,
    #[serde(default)]
    pub drinking: bool,
    #[serde(default)]
    pub pets: bool,
    #[serde(default)]
    pub visitors: bool,
    pub whatsapp_number: Option<String>,
}

/// UpdatePropertyRequest
///
/// Partial update payload (PUT /api/properties/{id}). Every field of the
/// create payload, optional, plus the availability flag. Rules apply only to
/// the fields that are present.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdatePropertyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 5, message = "Title must be at least 5 characters"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Rent must be greater than 0"))]
    pub rent: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, message = "Location is required"))]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_type: Option<RoomType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smoking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drinking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pets: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visitors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

impl UpdatePropertyRequest {
    /// Applies the provided fields onto `property`.
    pub fn apply_to(&self, property: &mut Property) {
        if let Some(v) = &self.title {
            property.title = v.clone();
        }
        if let Some(v) = &self.description {
            property.description = Some(v.clone());
        }
        if let Some(v) = self.rent {
            property.rent = v;
        }
        if let Some(v) = &self.location {
            property.location = v.clone();
        }
        if let Some(v) = self.room_type {
            property.room_type = v;
        }
        if let Some(v) = self.property_type {
            property.property_type = v;
        }
        if let Some(v) = &self.amenities {
            property.amenities = v.clone();
        }
        if let Some(v) = &self.address {
            property.address = Some(v.clone());
        }
        if let Some(v) = &self.city {
            property.city = Some(v.clone());
        }
        if let Some(v) = &self.state {
            property.state = Some(v.clone());
        }
        if let Some(v) = &self.pincode {
            property.pincode = Some(v.clone());
        }
        if let Some(v) = self.smoking {
            property.smoking = v;
        }
        if let Some(v) = self.drinking {
            property.drinking = v;
        }
        if let Some(v) = self.pets {
            property.pets = v;
        }
        if let Some(v) = self.visitors {
            property.visitors = v;
        }
        if let Some(v) = &self.whatsapp_number {
            property.whatsapp_number = Some(v.clone());
        }
        if let Some(v) = self.available {
            property.available = v;
        }
    }
}

/// PropertyQuery
///
/// Raw query string of the public listing (GET /api/properties). Blank values
/// count as absent; `amenities` is comma-separated.
#[derive(Debug, Clone, Deserialize, IntoParams, Validate, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PropertyQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub property_type: Option<PropertyType>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub room_type: Option<RoomType>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(range(min = 0, message = "minRent must not be negative"))]
    pub min_rent: Option<i32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(range(min = 0, message = "maxRent must not be negative"))]
    pub max_rent: Option<i32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub amenities: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub available: Option<bool>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub verified: Option<bool>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u32>,
    /// Values above 50 are clamped.
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(range(min = 1, message = "limit must be at least 1"))]
    pub limit: Option<u32>,
}

/// PropertyFilter
///
/// Validated query of the public listing (GET /api/properties). All
/// predicates are optional and AND-combined.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PropertyFilter {
    pub search: Option<String>,
    pub property_type: Option<PropertyType>,
    pub room_type: Option<RoomType>,
    pub min_rent: Option<i32>,
    pub max_rent: Option<i32>,
    pub city: Option<String>,
    pub amenities: Vec<String>,
    pub available: Option<bool>,
    pub verified: Option<bool>,
    pub page: u32,
    pub limit: u32,
}

impl Default for PropertyFilter {
    fn default() -> Self {
        Self {
            search: None,
            property_type: None,
            room_type: None,
            min_rent: None,
            max_rent: None,
            city: None,
            amenities: vec![],
            available: None,
            verified: None,
            page: 1,
            limit: 10,
        }
    }
}

impl PropertyFilter {
    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.limit as i64
    }

    /// Evaluates the filter against a single property. Used by storage
    /// backends that cannot push the predicate down into a query.
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = property.title.to_lowercase().contains(&needle)
                || property.location.to_lowercase().contains(&needle)
                || property
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
                || property
                    .city
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if self.property_type.is_some_and(|t| t != property.property_type) {
            return false;
        }
        if self.room_type.is_some_and(|t| t != property.room_type) {
            return false;
        }
        if self.min_rent.is_some_and(|min| property.rent < min) {
            return false;
        }
        if self.max_rent.is_some_and(|max| property.rent > max) {
            return false;
        }
        if let Some(city) = &self.city {
            if !property
                .city
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(city))
            {
                return false;
            }
        }
        if !self
            .amenities
            .iter()
            .all(|wanted| property.amenities.iter().any(|a| a == wanted))
        {
            return false;
        }
        if self.available.is_some_and(|a| a != property.available) {
            return false;
        }
        if self.verified.is_some_and(|v| v != property.verified) {
            return false;
        }
        true
    }
}

/// CreateInquiryRequest
///
/// Input payload for contacting an owner (POST /api/inquiries). Missing
/// contact fields are filled from the sender's profile.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateInquiryRequest {
    pub property_id: Uuid,
    pub contact_type: ContactType,
    pub message: Option<String>,
    pub user_phone: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub user_email: Option<String>,
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct UpdateInquiryStatusRequest {
    pub status: InquiryStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct VerifyPropertyRequest {
    pub verified: bool,
}

// --- Response Payloads ---

/// AuthPayload
///
/// Returned by signup and signin: the profile plus a fresh bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AuthPayload {
    pub user: UserProfile,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ImageUploadResult {
    pub images: Vec<PropertyImage>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WishlistCheck {
    pub in_wishlist: bool,
}

/// AdminDashboardStats
///
/// Output schema for the administrative statistics dashboard (GET /api/admin/stats).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminDashboardStats {
    #[ts(type = "number")]
    pub total_users: i64,
    #[ts(type = "number")]
    pub total_properties: i64,
    #[ts(type = "number")]
    pub total_inquiries: i64,
    #[ts(type = "number")]
    pub total_wishlist_entries: i64,
    /// The number of properties where `verified` is false.
    #[ts(type = "number")]
    pub unverified_properties: i64,
}
