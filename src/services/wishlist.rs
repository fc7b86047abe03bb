use std::collections::HashMap;

use uuid::Uuid;

use super::properties::{Include, hydrate};
use crate::{
    error::ApiError,
    models::{Property, PropertyDetails, WishlistCheck},
    repository::{ALREADY_WISHLISTED, RepositoryState},
};

/// WishlistService
///
/// The per-user set of saved properties.
#[derive(Clone)]
pub struct WishlistService {
    repo: RepositoryState,
}

impl WishlistService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    /// Wishlist cards carry the owner's contact subset and only the cover image.
    async fn cards(&self, properties: Vec<Property>) -> Result<Vec<PropertyDetails>, ApiError> {
        let mut cards = hydrate(
            &self.repo,
            properties,
            Include {
                owner: true,
                counts: false,
            },
        )
        .await?;
        for card in &mut cards {
            card.images.truncate(1);
        }
        Ok(cards)
    }

    /// Saved properties, most recently saved first.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<PropertyDetails>, ApiError> {
        let entries = self.repo.list_wishlist(user_id).await?;
        let ids: Vec<Uuid> = entries.iter().map(|e| e.property_id).collect();

        let mut by_id: HashMap<Uuid, Property> = self
            .repo
            .properties_by_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let ordered = ids.iter().filter_map(|id| by_id.remove(id)).collect();

        self.cards(ordered).await
    }

    pub async fn add(&self, user_id: Uuid, property_id: Uuid) -> Result<PropertyDetails, ApiError> {
        let property = self
            .repo
            .get_property(property_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Property"))?;

        if self
            .repo
            .find_wishlist_entry(user_id, property_id)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict(ALREADY_WISHLISTED.to_string()));
        }

        self.repo.add_wishlist_entry(user_id, property_id).await?;
        tracing::info!(user_id = %user_id, property_id = %property_id, "added to wishlist");

        self.cards(vec![property])
            .await?
            .pop()
            .ok_or_else(|| ApiError::not_found("Property"))
    }

    pub async fn remove(&self, user_id: Uuid, property_id: Uuid) -> Result<(), ApiError> {
        if !self.repo.remove_wishlist_entry(user_id, property_id).await? {
            return Err(ApiError::NotFound("Property not in wishlist".to_string()));
        }
        tracing::info!(user_id = %user_id, property_id = %property_id, "removed from wishlist");
        Ok(())
    }

    /// Never fails with NotFound: an unknown property is simply not wishlisted.
    pub async fn check(&self, user_id: Uuid, property_id: Uuid) -> Result<WishlistCheck, ApiError> {
        let entry = self.repo.find_wishlist_entry(user_id, property_id).await?;
        Ok(WishlistCheck {
            in_wishlist: entry.is_some(),
        })
    }
}
