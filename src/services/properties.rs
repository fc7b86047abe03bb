use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    models::{
        AdminDashboardStats, CreatePropertyRequest, NewPropertyImage, Pagination, Property,
        PropertyCounts, PropertyDetails, PropertyFilter, PropertyImage, PropertyPage,
        UpdatePropertyRequest, UserContact,
    },
    repository::RepositoryState,
    storage::{self, StorageState, StoredObject},
    validation,
};

/// Upper bound on files in one upload request.
pub const MAX_IMAGES_PER_REQUEST: usize = 10;
/// Upper bound on a single image, in bytes (5 MB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const IMAGE_TYPES_ONLY: &str = "Only JPEG, PNG, WebP and GIF images are allowed";

/// ImageUpload
///
/// One file taken out of a multipart request, not yet checked.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub original_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Which relations to join onto a set of properties.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Include {
    pub owner: bool,
    pub counts: bool,
}

/// hydrate
///
/// Joins owners, ordered images and relation counts onto `properties` with one
/// query per relation, preserving the input order.
pub(crate) async fn hydrate(
    repo: &RepositoryState,
    properties: Vec<Property>,
    include: Include,
) -> Result<Vec<PropertyDetails>, ApiError> {
    if properties.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = properties.iter().map(|p| p.id).collect();

    let mut images: HashMap<Uuid, Vec<PropertyImage>> = HashMap::new();
    for image in repo.images_for_properties(&ids).await? {
        images.entry(image.property_id).or_default().push(image);
    }
    for gallery in images.values_mut() {
        gallery.sort_by_key(|image| image.order);
    }

    let owners: HashMap<Uuid, UserContact> = if include.owner {
        let mut owner_ids: Vec<Uuid> = properties.iter().map(|p| p.owner_id).collect();
        owner_ids.sort();
        owner_ids.dedup();
        repo.user_contacts(&owner_ids)
            .await?
            .into_iter()
            .map(|contact| (contact.id, contact))
            .collect()
    } else {
        HashMap::new()
    };

    let counts: HashMap<Uuid, PropertyCounts> = if include.counts {
        repo.property_counts(&ids)
            .await?
            .into_iter()
            .map(|c| (c.property_id, c))
            .collect()
    } else {
        HashMap::new()
    };

    Ok(properties
        .into_iter()
        .map(|property| PropertyDetails {
            owner: owners.get(&property.owner_id).cloned(),
            images: images.remove(&property.id).unwrap_or_default(),
            counts: include.counts.then(|| {
                counts.get(&property.id).cloned().unwrap_or(PropertyCounts {
                    property_id: property.id,
                    ..Default::default()
                })
            }),
            property,
        })
        .collect())
}

/// Checks a batch before anything is stored. Returns the first problem found.
fn check_uploads(files: &[ImageUpload]) -> Result<(), ApiError> {
    if files.is_empty() {
        return Err(ApiError::BadRequest("No images uploaded".to_string()));
    }
    if files.len() > MAX_IMAGES_PER_REQUEST {
        return Err(ApiError::BadRequest(format!(
            "Too many files. Maximum is {MAX_IMAGES_PER_REQUEST} images per request"
        )));
    }

    for file in files {
        let name = file.original_name.as_deref().unwrap_or("file");
        if storage::image_extension(&file.content_type).is_none() {
            return Err(ApiError::BadRequest(format!("{name}: {IMAGE_TYPES_ONLY}")));
        }
        if file.bytes.is_empty() {
            return Err(ApiError::BadRequest(format!("{name}: File is empty")));
        }
        if file.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ApiError::BadRequest(format!(
                "{name}: File too large. Maximum size is 5MB"
            )));
        }
    }
    Ok(())
}

/// PropertyService
///
/// Listings and their image galleries. Every mutation goes through the
/// owner-or-admin check first.
#[derive(Clone)]
pub struct PropertyService {
    repo: RepositoryState,
    storage: StorageState,
}

impl PropertyService {
    pub fn new(repo: RepositoryState, storage: StorageState) -> Self {
        Self { repo, storage }
    }

    /// Loads a property the caller is allowed to change.
    async fn owned_property(
        &self,
        id: Uuid,
        caller: &AuthUser,
        denied: &str,
    ) -> Result<Property, ApiError> {
        let property = self
            .repo
            .get_property(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Property"))?;

        if !caller.may_modify(property.owner_id) {
            tracing::warn!(
                property_id = %id,
                owner_id = %property.owner_id,
                caller_id = %caller.id,
                "ownership check failed"
            );
            return Err(ApiError::Forbidden(denied.to_string()));
        }
        Ok(property)
    }

    // --- Reads ---

    pub async fn list_public(&self, filter: PropertyFilter) -> Result<PropertyPage, ApiError> {
        let (rows, total) = self.repo.list_properties(&filter).await?;
        let properties = hydrate(
            &self.repo,
            rows,
            Include {
                owner: true,
                counts: false,
            },
        )
        .await?;

        Ok(PropertyPage {
            properties,
            pagination: Pagination::new(filter.page, filter.limit, total),
        })
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<PropertyDetails, ApiError> {
        let property = self
            .repo
            .get_property(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Property"))?;

        let mut details = hydrate(
            &self.repo,
            vec![property],
            Include {
                owner: true,
                counts: true,
            },
        )
        .await?;
        details.pop().ok_or_else(|| ApiError::not_found("Property"))
    }

    pub async fn list_mine(&self, owner_id: Uuid) -> Result<Vec<PropertyDetails>, ApiError> {
        let rows = self.repo.list_properties_by_owner(owner_id).await?;
        hydrate(
            &self.repo,
            rows,
            Include {
                owner: false,
                counts: true,
            },
        )
        .await
    }

    // --- Mutations ---

    pub async fn create(
        &self,
        caller: &AuthUser,
        req: CreatePropertyRequest,
    ) -> Result<PropertyDetails, ApiError> {
        let property = self.repo.create_property(caller.id, req).await?;
        tracing::info!(property_id = %property.id, owner_id = %caller.id, "property created");

        let owner = self
            .repo
            .user_contacts(&[caller.id])
            .await?
            .into_iter()
            .next();

        Ok(PropertyDetails {
            property,
            owner,
            images: Vec::new(),
            counts: None,
        })
    }

    /// Existence and ownership are checked before the field rules run.
    pub async fn update(
        &self,
        id: Uuid,
        caller: &AuthUser,
        patch: UpdatePropertyRequest,
    ) -> Result<PropertyDetails, ApiError> {
        self.owned_property(id, caller, "You can only update your own properties")
            .await?;

        let patch = validation::validate_property_update(patch).map_err(ApiError::Validation)?;

        let updated = self
            .repo
            .update_property(id, patch)
            .await?
            .ok_or_else(|| ApiError::not_found("Property"))?;
        tracing::info!(property_id = %id, caller_id = %caller.id, "property updated");

        let mut details = hydrate(
            &self.repo,
            vec![updated],
            Include {
                owner: true,
                counts: false,
            },
        )
        .await?;
        details.pop().ok_or_else(|| ApiError::not_found("Property"))
    }

    /// Removes the listing (rows cascade) and then its image files. File removal
    /// is best-effort: a failure is logged and the delete still succeeds.
    pub async fn delete(&self, id: Uuid, caller: &AuthUser) -> Result<(), ApiError> {
        self.owned_property(id, caller, "You can only delete your own properties")
            .await?;

        let images = self.repo.images_for_properties(&[id]).await?;
        if !self.repo.delete_property(id).await? {
            return Err(ApiError::not_found("Property"));
        }
        tracing::info!(property_id = %id, caller_id = %caller.id, "property deleted");

        for image in images {
            if let Err(e) = self.storage.delete(&image.filename).await {
                tracing::error!(filename = %image.filename, error = %e, "failed to remove image file");
            }
        }
        Ok(())
    }

    /// add_images
    ///
    /// All-or-nothing upload: the batch is checked up front, every file is
    /// stored, then the records are inserted in one transaction. If any step
    /// fails, the files this request stored are removed again.
    pub async fn add_images(
        &self,
        id: Uuid,
        caller: &AuthUser,
        files: Vec<ImageUpload>,
    ) -> Result<Vec<PropertyImage>, ApiError> {
        self.owned_property(
            id,
            caller,
            "You can only upload images to your own properties",
        )
        .await?;
        check_uploads(&files)?;

        let mut stored: Vec<StoredObject> = Vec::with_capacity(files.len());
        for file in files {
            let Some(filename) = storage::image_filename(&file.content_type) else {
                self.discard(&stored).await;
                return Err(ApiError::BadRequest(IMAGE_TYPES_ONLY.to_string()));
            };
            match self
                .storage
                .store(&filename, &file.content_type, file.bytes)
                .await
            {
                Ok(object) => stored.push(object),
                Err(e) => {
                    self.discard(&stored).await;
                    return Err(e.into());
                }
            }
        }

        let records = stored
            .iter()
            .map(|object| NewPropertyImage {
                url: object.url.clone(),
                filename: object.filename.clone(),
                size: object.size,
            })
            .collect();

        match self.repo.add_property_images(id, records).await {
            Ok(Some(images)) => {
                tracing::info!(property_id = %id, count = images.len(), "images uploaded");
                Ok(images)
            }
            Ok(None) => {
                tracing::warn!(property_id = %id, "property removed during image upload");
                self.discard(&stored).await;
                Err(ApiError::not_found("Property"))
            }
            Err(e) => {
                self.discard(&stored).await;
                Err(e.into())
            }
        }
    }

    async fn discard(&self, stored: &[StoredObject]) {
        for object in stored {
            if let Err(e) = self.storage.delete(&object.filename).await {
                tracing::error!(filename = %object.filename, error = %e, "failed to clean up image file");
            }
        }
    }

    // --- Admin ---

    pub async fn set_verified(&self, id: Uuid, verified: bool) -> Result<Property, ApiError> {
        let property = self
            .repo
            .set_property_verified(id, verified)
            .await?
            .ok_or_else(|| ApiError::not_found("Property"))?;
        tracing::info!(property_id = %id, verified, "property verification changed");
        Ok(property)
    }

    pub async fn stats(&self) -> Result<AdminDashboardStats, ApiError> {
        Ok(self.repo.get_stats().await?)
    }
}
