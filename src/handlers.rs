use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    auth::{Admin, AuthUser, Landlord},
    error::ApiError,
    models::{
        AdminDashboardStats, AuthPayload, CreateInquiryRequest, CreatePropertyRequest,
        ImageUploadResult, Inquiry, InquiryDetails, Property, PropertyDetails, PropertyPage,
        PropertyQuery, ProfileUpdate, SigninRequest, SignupRequest, UpdateInquiryStatusRequest,
        UpdatePropertyRequest, UserProfile, VerifyPropertyRequest, WishlistCheck,
    },
    services::{AuthService, ImageUpload, InquiryService, PropertyService, WishlistService},
    validation,
};

// --- Request / Response Plumbing ---

/// ApiJson
///
/// `axum::Json` with its rejection mapped onto `ApiError`, so malformed bodies
/// get the same `{success: false, error}` shape as every other failure.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// ApiQuery
///
/// `axum::extract::Query` with the same rejection mapping as `ApiJson`.
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// ApiResponse
///
/// The success envelope: `{success: true, message?, data?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
            data: Some(data),
        })
    }

    pub fn with_message(message: &str, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.to_string()),
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    pub fn message(message: &str) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.to_string()),
            data: None,
        })
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;
type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// Path ids are UUIDs. A malformed id gets the same 404 as a missing row.
fn parse_id(raw: &str, not_found: impl FnOnce() -> ApiError) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| not_found())
}

fn property_id(raw: &str) -> Result<Uuid, ApiError> {
    parse_id(raw, || ApiError::not_found("Property"))
}

// --- Service Index ---

/// index
///
/// [Public Route] Names the API groups served by this process.
pub async fn index() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "ProperEase Backend API is running!",
        "endpoints": {
            "auth": "/api/auth",
            "properties": "/api/properties",
            "inquiries": "/api/inquiries",
            "wishlist": "/api/wishlist",
            "docs": "/swagger-ui"
        }
    }))
}

pub async fn health() -> &'static str {
    "ok"
}

/// Fallback for unknown routes.
pub async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

// --- Auth ---

/// signup
///
/// [Public Route] Registers a STUDENT or LANDLORD account and returns a token.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthPayload),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(auth): State<AuthService>,
    ApiJson(body): ApiJson<SignupRequest>,
) -> Created<AuthPayload> {
    let req = validation::validate_signup(body).map_err(ApiError::Validation)?;
    let payload = auth.signup(req).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("User registered successfully", payload),
    ))
}

/// signin
///
/// [Public Route] Exchanges email and password for a token.
#[utoipa::path(
    post,
    path = "/api/auth/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthPayload),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn signin(
    State(auth): State<AuthService>,
    ApiJson(body): ApiJson<SigninRequest>,
) -> ApiResult<AuthPayload> {
    let req = validation::validate_signin(body).map_err(ApiError::Validation)?;
    let payload = auth.signin(req).await?;
    Ok(ApiResponse::with_message("Login successful", payload))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses((status = 200, description = "Profile", body = UserProfile))
)]
pub async fn get_me(user: AuthUser, State(auth): State<AuthService>) -> ApiResult<UserProfile> {
    Ok(ApiResponse::data(auth.me(user.id).await?))
}

/// update_profile
///
/// [Authenticated Route] Updates name, phone and whatsapp. Empty values are ignored.
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = ProfileUpdate,
    responses((status = 200, description = "Profile updated successfully", body = UserProfile))
)]
pub async fn update_profile(
    user: AuthUser,
    State(auth): State<AuthService>,
    ApiJson(body): ApiJson<ProfileUpdate>,
) -> ApiResult<UserProfile> {
    let update = validation::validate_profile_update(body).map_err(ApiError::Validation)?;
    let profile = auth.update_profile(user.id, update).await?;
    Ok(ApiResponse::with_message("Profile updated successfully", profile))
}

// --- Properties ---

/// list_properties
///
/// [Public Route] Filtered, paginated listing, newest first.
///
/// Accepts `search`, `propertyType`, `roomType`, `minRent`, `maxRent`, `city`,
/// `amenities` (comma-separated), `available`, `verified`, `page`, `limit`.
#[utoipa::path(
    get,
    path = "/api/properties",
    params(PropertyQuery),
    responses(
        (status = 200, description = "A page of properties", body = PropertyPage),
        (status = 400, description = "Invalid query")
    )
)]
pub async fn list_properties(
    State(properties): State<PropertyService>,
    ApiQuery(query): ApiQuery<PropertyQuery>,
) -> ApiResult<PropertyPage> {
    let filter = validation::validate_property_query(query).map_err(ApiError::Validation)?;
    Ok(ApiResponse::data(properties.list_public(filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/properties/{id}",
    params(("id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Found", body = PropertyDetails),
        (status = 404, description = "Property not found")
    )
)]
pub async fn get_property(
    State(properties): State<PropertyService>,
    Path(id): Path<String>,
) -> ApiResult<PropertyDetails> {
    let id = property_id(&id)?;
    Ok(ApiResponse::data(properties.get_by_id(id).await?))
}

/// get_my_properties
///
/// [Landlord Route] The caller's own listings with images and relation counts.
#[utoipa::path(
    get,
    path = "/api/properties/my-properties",
    responses((status = 200, description = "My properties", body = [PropertyDetails]))
)]
pub async fn get_my_properties(
    Landlord(user): Landlord,
    State(properties): State<PropertyService>,
) -> ApiResult<Vec<PropertyDetails>> {
    Ok(ApiResponse::data(properties.list_mine(user.id).await?))
}

#[utoipa::path(
    post,
    path = "/api/properties",
    request_body = CreatePropertyRequest,
    responses(
        (status = 201, description = "Property created successfully", body = PropertyDetails),
        (status = 403, description = "Landlord access required")
    )
)]
pub async fn create_property(
    Landlord(user): Landlord,
    State(properties): State<PropertyService>,
    ApiJson(body): ApiJson<CreatePropertyRequest>,
) -> Created<PropertyDetails> {
    let req = validation::validate_property_create(body).map_err(ApiError::Validation)?;
    let created = properties.create(&user, req).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Property created successfully", created),
    ))
}

/// update_property
///
/// [Landlord Route] Partial update. Owner or ADMIN only.
#[utoipa::path(
    put,
    path = "/api/properties/{id}",
    params(("id" = Uuid, Path, description = "Property ID")),
    request_body = UpdatePropertyRequest,
    responses(
        (status = 200, description = "Property updated successfully", body = PropertyDetails),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Property not found")
    )
)]
pub async fn update_property(
    Landlord(user): Landlord,
    State(properties): State<PropertyService>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<UpdatePropertyRequest>,
) -> ApiResult<PropertyDetails> {
    let id = property_id(&id)?;
    let updated = properties.update(id, &user, patch).await?;
    Ok(ApiResponse::with_message("Property updated successfully", updated))
}

#[utoipa::path(
    delete,
    path = "/api/properties/{id}",
    params(("id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Property deleted successfully"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Property not found")
    )
)]
pub async fn delete_property(
    Landlord(user): Landlord,
    State(properties): State<PropertyService>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = property_id(&id)?;
    properties.delete(id, &user).await?;
    Ok(ApiResponse::message("Property deleted successfully"))
}

/// upload_property_images
///
/// [Landlord Route] Multipart upload of up to 10 images (5 MB each) under the
/// field `images` (or `image`). Other fields are ignored.
#[utoipa::path(
    post,
    path = "/api/properties/{id}/images",
    params(("id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 201, description = "Images uploaded successfully", body = ImageUploadResult),
        (status = 400, description = "No images, too many, too large or not an image"),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn upload_property_images(
    Landlord(user): Landlord,
    State(properties): State<PropertyService>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Created<ImageUploadResult> {
    let id = property_id(&id)?;

    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if !matches!(field.name(), Some("images" | "image")) {
            continue;
        }
        let original_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;
        files.push(ImageUpload {
            original_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let images = properties.add_images(id, &user, files).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            "Images uploaded successfully",
            ImageUploadResult {
                count: images.len(),
                images,
            },
        ),
    ))
}

// --- Inquiries ---

#[utoipa::path(
    post,
    path = "/api/inquiries",
    request_body = CreateInquiryRequest,
    responses(
        (status = 201, description = "Inquiry created successfully", body = InquiryDetails),
        (status = 404, description = "Property not found")
    )
)]
pub async fn create_inquiry(
    user: AuthUser,
    State(inquiries): State<InquiryService>,
    ApiJson(body): ApiJson<CreateInquiryRequest>,
) -> Created<InquiryDetails> {
    let req = validation::validate_inquiry_create(body).map_err(ApiError::Validation)?;
    let inquiry = inquiries.create(&user, req).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Inquiry created successfully", inquiry),
    ))
}

/// get_property_inquiries
///
/// [Owner Route] Inquiries received for one of the caller's properties.
#[utoipa::path(
    get,
    path = "/api/inquiries/property/{id}",
    params(("id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Inquiries, newest first", body = [InquiryDetails]),
        (status = 404, description = "Property not found or access denied")
    )
)]
pub async fn get_property_inquiries(
    user: AuthUser,
    State(inquiries): State<InquiryService>,
    Path(id): Path<String>,
) -> ApiResult<Vec<InquiryDetails>> {
    let id = parse_id(&id, || {
        ApiError::NotFound("Property not found or access denied".to_string())
    })?;
    Ok(ApiResponse::data(inquiries.list_for_property(id, &user).await?))
}

#[utoipa::path(
    get,
    path = "/api/inquiries/my-inquiries",
    responses((status = 200, description = "Sent inquiries, newest first", body = [InquiryDetails]))
)]
pub async fn get_my_inquiries(
    user: AuthUser,
    State(inquiries): State<InquiryService>,
) -> ApiResult<Vec<InquiryDetails>> {
    Ok(ApiResponse::data(inquiries.list_mine(user.id).await?))
}

/// update_inquiry_status
///
/// [Owner Route] Moves an inquiry to CONTACTED, CLOSED or SPAM.
#[utoipa::path(
    patch,
    path = "/api/inquiries/{id}/status",
    params(("id" = Uuid, Path, description = "Inquiry ID")),
    request_body = UpdateInquiryStatusRequest,
    responses(
        (status = 200, description = "Inquiry status updated successfully", body = Inquiry),
        (status = 400, description = "Invalid status or transition"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Inquiry not found")
    )
)]
pub async fn update_inquiry_status(
    user: AuthUser,
    State(inquiries): State<InquiryService>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Inquiry> {
    let req: UpdateInquiryStatusRequest = serde_json::from_value(body)
        .map_err(|_| ApiError::BadRequest("Invalid status".to_string()))?;
    let id = parse_id(&id, || ApiError::not_found("Inquiry"))?;
    let inquiry = inquiries.update_status(id, &user, req.status).await?;
    Ok(ApiResponse::with_message(
        "Inquiry status updated successfully",
        inquiry,
    ))
}

// --- Wishlist ---

#[utoipa::path(
    get,
    path = "/api/wishlist",
    responses((status = 200, description = "Saved properties, newest first", body = [PropertyDetails]))
)]
pub async fn get_wishlist(
    user: AuthUser,
    State(wishlist): State<WishlistService>,
) -> ApiResult<Vec<PropertyDetails>> {
    Ok(ApiResponse::data(wishlist.list(user.id).await?))
}

#[utoipa::path(
    post,
    path = "/api/wishlist/{property_id}",
    params(("property_id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 201, description = "Property added to wishlist", body = PropertyDetails),
        (status = 404, description = "Property not found"),
        (status = 409, description = "Property already in wishlist")
    )
)]
pub async fn add_to_wishlist(
    user: AuthUser,
    State(wishlist): State<WishlistService>,
    Path(property_id_raw): Path<String>,
) -> Created<PropertyDetails> {
    let id = property_id(&property_id_raw)?;
    let property = wishlist.add(user.id, id).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Property added to wishlist", property),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/wishlist/{property_id}",
    params(("property_id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Property removed from wishlist"),
        (status = 404, description = "Property not in wishlist")
    )
)]
pub async fn remove_from_wishlist(
    user: AuthUser,
    State(wishlist): State<WishlistService>,
    Path(property_id_raw): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&property_id_raw, || {
        ApiError::NotFound("Property not in wishlist".to_string())
    })?;
    wishlist.remove(user.id, id).await?;
    Ok(ApiResponse::message("Property removed from wishlist"))
}

/// check_wishlist
///
/// [Authenticated Route] Membership test. Never 404s: a malformed or unknown
/// id is simply not in the wishlist.
#[utoipa::path(
    get,
    path = "/api/wishlist/check/{property_id}",
    params(("property_id" = Uuid, Path, description = "Property ID")),
    responses((status = 200, description = "Membership", body = WishlistCheck))
)]
pub async fn check_wishlist(
    user: AuthUser,
    State(wishlist): State<WishlistService>,
    Path(property_id_raw): Path<String>,
) -> ApiResult<WishlistCheck> {
    let check = match Uuid::parse_str(&property_id_raw) {
        Ok(id) => wishlist.check(user.id, id).await?,
        Err(_) => WishlistCheck { in_wishlist: false },
    };
    Ok(ApiResponse::data(check))
}

// --- Admin ---

/// get_admin_stats
///
/// [Admin Route] Core counts for the moderation dashboard.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Stats", body = AdminDashboardStats),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn get_admin_stats(
    Admin(_admin): Admin,
    State(properties): State<PropertyService>,
) -> ApiResult<AdminDashboardStats> {
    Ok(ApiResponse::data(properties.stats().await?))
}

/// verify_property
///
/// [Admin Route] Sets or clears the `verified` flag of a listing.
#[utoipa::path(
    patch,
    path = "/api/admin/properties/{id}/verify",
    params(("id" = Uuid, Path, description = "Property ID")),
    request_body = VerifyPropertyRequest,
    responses(
        (status = 200, description = "Updated", body = Property),
        (status = 404, description = "Property not found")
    )
)]
pub async fn verify_property(
    Admin(admin): Admin,
    State(properties): State<PropertyService>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<VerifyPropertyRequest>,
) -> ApiResult<Property> {
    let id = property_id(&id)?;
    let property = properties.set_verified(id, body.verified).await?;
    tracing::info!(admin_id = %admin.id, property_id = %id, "verification set by admin");
    Ok(ApiResponse::with_message("Property verification updated", property))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_omits_empty_parts() {
        let body = serde_json::to_value(ApiResponse::message("done").0).unwrap();
        assert_eq!(body, json!({"success": true, "message": "done"}));

        let body = serde_json::to_value(ApiResponse::data(3).0).unwrap();
        assert_eq!(body, json!({"success": true, "data": 3}));
    }

    #[test]
    fn malformed_ids_are_not_found() {
        let err = property_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(property_id(&Uuid::new_v4().to_string()).is_ok());
    }
}
