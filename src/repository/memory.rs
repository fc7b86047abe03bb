use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ALREADY_WISHLISTED, EMAIL_TAKEN, RepoResult, Repository, RepositoryError};
use crate::models::{
    AdminDashboardStats, CreatePropertyRequest, Inquiry, InquiryStatus, NewInquiry,
    NewPropertyImage, NewUser, ProfileUpdate, Property, PropertyCounts, PropertyFilter,
    PropertyImage, UpdatePropertyRequest, UserContact, UserRecord, WishlistEntry,
};

/// Rows are kept in insertion order, so "newest first" is a reverse walk.
#[derive(Default)]
struct Store {
    users: Vec<UserRecord>,
    properties: Vec<Property>,
    images: Vec<PropertyImage>,
    inquiries: Vec<Inquiry>,
    wishlist: Vec<WishlistEntry>,
}

/// InMemoryRepository
///
/// A process-local `Repository` used by the integration tests and for running
/// the API without a database. Same contract as Postgres: uniqueness of emails
/// and wishlist pairs, cascading property deletes, atomic image batches.
#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    // --- USERS ---

    async fn find_user_by_id(&self, id: Uuid) -> RepoResult<Option<UserRecord>> {
        let store = self.store.read().await;
        Ok(store.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>> {
        let store = self.store.read().await;
        Ok(store.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<UserRecord> {
        let mut store = self.store.write().await;
        if store.users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            phone: user.phone,
            whatsapp: user.whatsapp,
            verified: false,
            created_at: now,
            updated_at: now,
        };
        store.users.push(record.clone());
        Ok(record)
    }

    async fn update_user_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> RepoResult<Option<UserRecord>> {
        let mut store = self.store.write().await;
        let Some(user) = store.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(phone) = update.phone {
            user.phone = Some(phone);
        }
        if let Some(whatsapp) = update.whatsapp {
            user.whatsapp = Some(whatsapp);
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn user_contacts(&self, ids: &[Uuid]) -> RepoResult<Vec<UserContact>> {
        let store = self.store.read().await;
        Ok(store
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .map(UserContact::from)
            .collect())
    }

    // --- PROPERTIES ---

    async fn list_properties(&self, filter: &PropertyFilter) -> RepoResult<(Vec<Property>, i64)> {
        let store = self.store.read().await;
        let matching: Vec<&Property> = store
            .properties
            .iter()
            .rev()
            .filter(|p| filter.matches(p))
            .collect();

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.offset().max(0) as usize)
            .take(filter.limit as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn get_property(&self, id: Uuid) -> RepoResult<Option<Property>> {
        let store = self.store.read().await;
        Ok(store.properties.iter().find(|p| p.id == id).cloned())
    }

    async fn properties_by_ids(&self, ids: &[Uuid]) -> RepoResult<Vec<Property>> {
        let store = self.store.read().await;
        Ok(store
            .properties
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn list_properties_by_owner(&self, owner_id: Uuid) -> RepoResult<Vec<Property>> {
        let store = self.store.read().await;
        Ok(store
            .properties
            .iter()
            .rev()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn create_property(
        &self,
        owner_id: Uuid,
        req: CreatePropertyRequest,
    ) -> RepoResult<Property> {
        let now = Utc::now();
        let property = Property {
            id: Uuid::new_v4(),
            owner_id,
            title: req.title,
            description: req.description,
            rent: req.rent,
            location: req.location,
            address: req.address,
            city: req.city,
            state: req.state,
            pincode: req.pincode,
            room_type: req.room_type,
            property_type: req.property_type,
            amenities: req.amenities,
            smoking: req.smoking,
            drinking: req.drinking,
            pets: req.pets,
            visitors: req.visitors,
            whatsapp_number: req.whatsapp_number,
            available: true,
            verified: false,
            created_at: now,
            updated_at: now,
        };

        self.store.write().await.properties.push(property.clone());
        Ok(property)
    }

    async fn update_property(
        &self,
        id: Uuid,
        patch: UpdatePropertyRequest,
    ) -> RepoResult<Option<Property>> {
        let mut store = self.store.write().await;
        let Some(property) = store.properties.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        patch.apply_to(property);
        property.updated_at = Utc::now();
        Ok(Some(property.clone()))
    }

    async fn delete_property(&self, id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        let before = store.properties.len();
        store.properties.retain(|p| p.id != id);
        if store.properties.len() == before {
            return Ok(false);
        }

        store.images.retain(|i| i.property_id != id);
        store.inquiries.retain(|i| i.property_id != id);
        store.wishlist.retain(|w| w.property_id != id);
        Ok(true)
    }

    async fn set_property_verified(
        &self,
        id: Uuid,
        verified: bool,
    ) -> RepoResult<Option<Property>> {
        let mut store = self.store.write().await;
        let Some(property) = store.properties.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        property.verified = verified;
        property.updated_at = Utc::now();
        Ok(Some(property.clone()))
    }

    async fn property_counts(&self, ids: &[Uuid]) -> RepoResult<Vec<PropertyCounts>> {
        let store = self.store.read().await;
        Ok(store
            .properties
            .iter()
            .filter(|p| ids.contains(&p.id))
            .map(|p| PropertyCounts {
                property_id: p.id,
                wishlist: store.wishlist.iter().filter(|w| w.property_id == p.id).count() as i64,
                inquiries: store.inquiries.iter().filter(|i| i.property_id == p.id).count()
                    as i64,
            })
            .collect())
    }

    // --- IMAGES ---

    async fn images_for_properties(&self, ids: &[Uuid]) -> RepoResult<Vec<PropertyImage>> {
        let store = self.store.read().await;
        let mut images: Vec<PropertyImage> = store
            .images
            .iter()
            .filter(|i| ids.contains(&i.property_id))
            .cloned()
            .collect();
        images.sort_by(|a, b| {
            a.property_id
                .cmp(&b.property_id)
                .then_with(|| a.order.cmp(&b.order))
        });
        Ok(images)
    }

    /// The write lock is held for the whole batch, which makes it atomic.
    async fn add_property_images(
        &self,
        property_id: Uuid,
        images: Vec<NewPropertyImage>,
    ) -> RepoResult<Option<Vec<PropertyImage>>> {
        let mut store = self.store.write().await;
        if !store.properties.iter().any(|p| p.id == property_id) {
            return Ok(None);
        }
        let existing = store
            .images
            .iter()
            .filter(|i| i.property_id == property_id)
            .count();

        let now = Utc::now();
        let inserted: Vec<PropertyImage> = images
            .into_iter()
            .enumerate()
            .map(|(offset, image)| PropertyImage {
                id: Uuid::new_v4(),
                property_id,
                url: image.url,
                filename: image.filename,
                size: image.size,
                order: (existing + offset) as i32,
                created_at: now,
            })
            .collect();

        store.images.extend(inserted.iter().cloned());
        Ok(Some(inserted))
    }

    // --- INQUIRIES ---

    async fn create_inquiry(&self, inquiry: NewInquiry) -> RepoResult<Inquiry> {
        let now = Utc::now();
        let row = Inquiry {
            id: Uuid::new_v4(),
            property_id: inquiry.property_id,
            user_id: inquiry.user_id,
            contact_type: inquiry.contact_type,
            status: InquiryStatus::New,
            message: inquiry.message,
            user_phone: inquiry.user_phone,
            user_email: inquiry.user_email,
            user_name: inquiry.user_name,
            created_at: now,
            updated_at: now,
        };
        self.store.write().await.inquiries.push(row.clone());
        Ok(row)
    }

    async fn get_inquiry(&self, id: Uuid) -> RepoResult<Option<Inquiry>> {
        let store = self.store.read().await;
        Ok(store.inquiries.iter().find(|i| i.id == id).cloned())
    }

    async fn list_inquiries_for_property(&self, property_id: Uuid) -> RepoResult<Vec<Inquiry>> {
        let store = self.store.read().await;
        Ok(store
            .inquiries
            .iter()
            .rev()
            .filter(|i| i.property_id == property_id)
            .cloned()
            .collect())
    }

    async fn list_inquiries_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Inquiry>> {
        let store = self.store.read().await;
        Ok(store
            .inquiries
            .iter()
            .rev()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_inquiry_status(
        &self,
        id: Uuid,
        status: InquiryStatus,
    ) -> RepoResult<Option<Inquiry>> {
        let mut store = self.store.write().await;
        let Some(inquiry) = store.inquiries.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        inquiry.status = status;
        inquiry.updated_at = Utc::now();
        Ok(Some(inquiry.clone()))
    }

    // --- WISHLIST ---

    async fn list_wishlist(&self, user_id: Uuid) -> RepoResult<Vec<WishlistEntry>> {
        let store = self.store.read().await;
        Ok(store
            .wishlist
            .iter()
            .rev()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_wishlist_entry(
        &self,
        user_id: Uuid,
        property_id: Uuid,
    ) -> RepoResult<Option<WishlistEntry>> {
        let store = self.store.read().await;
        Ok(store
            .wishlist
            .iter()
            .find(|w| w.user_id == user_id && w.property_id == property_id)
            .cloned())
    }

    async fn add_wishlist_entry(
        &self,
        user_id: Uuid,
        property_id: Uuid,
    ) -> RepoResult<WishlistEntry> {
        let mut store = self.store.write().await;
        if store
            .wishlist
            .iter()
            .any(|w| w.user_id == user_id && w.property_id == property_id)
        {
            return Err(RepositoryError::Conflict(ALREADY_WISHLISTED.to_string()));
        }

        let entry = WishlistEntry {
            user_id,
            property_id,
            created_at: Utc::now(),
        };
        store.wishlist.push(entry.clone());
        Ok(entry)
    }

    async fn remove_wishlist_entry(&self, user_id: Uuid, property_id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        let before = store.wishlist.len();
        store
            .wishlist
            .retain(|w| !(w.user_id == user_id && w.property_id == property_id));
        Ok(store.wishlist.len() < before)
    }

    // --- ADMIN ---

    async fn get_stats(&self) -> RepoResult<AdminDashboardStats> {
        let store = self.store.read().await;
        Ok(AdminDashboardStats {
            total_users: store.users.len() as i64,
            total_properties: store.properties.len() as i64,
            total_inquiries: store.inquiries.len() as i64,
            total_wishlist_entries: store.wishlist.len() as i64,
            unverified_properties: store.properties.iter().filter(|p| !p.verified).count()
                as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Test User".into(),
            email: email.into(),
            password_hash: "hash".into(),
            role: Role::Landlord,
            phone: None,
            whatsapp: None,
        }
    }

    fn listing(title: &str) -> CreatePropertyRequest {
        CreatePropertyRequest {
            title: title.into(),
            rent: 9000,
            location: "Koramangala".into(),
            ..Default::default()
        }
    }

    fn image(name: &str) -> NewPropertyImage {
        NewPropertyImage {
            url: format!("http://localhost/{name}"),
            filename: name.into(),
            size: 10,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let repo = InMemoryRepository::new();
        repo.create_user(new_user("a@example.com")).await.unwrap();
        let err = repo.create_user(new_user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_paged() {
        let repo = InMemoryRepository::new();
        let owner = Uuid::new_v4();
        for title in ["first", "second", "third"] {
            repo.create_property(owner, listing(title)).await.unwrap();
        }

        let filter = PropertyFilter {
            limit: 2,
            ..Default::default()
        };
        let (page, total) = repo.list_properties(&filter).await.unwrap();
        assert_eq!(total, 3);
        let titles: Vec<_> = page.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["third", "second"]);

        let filter = PropertyFilter {
            page: 2,
            limit: 2,
            ..Default::default()
        };
        let (page, _) = repo.list_properties(&filter).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "first");
    }

    #[tokio::test]
    async fn image_orders_continue_across_batches() {
        let repo = InMemoryRepository::new();
        let property = repo
            .create_property(Uuid::new_v4(), listing("gallery"))
            .await
            .unwrap();

        let first = repo
            .add_property_images(property.id, vec![image("a"), image("b")])
            .await
            .unwrap()
            .unwrap();
        let second = repo
            .add_property_images(property.id, vec![image("c")])
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.iter().map(|i| i.order).collect::<Vec<_>>(), [0, 1]);
        assert_eq!(second[0].order, 2);
    }

    #[tokio::test]
    async fn images_need_an_existing_property() {
        let repo = InMemoryRepository::new();
        let orphan = Uuid::new_v4();

        let result = repo
            .add_property_images(orphan, vec![image("lost")])
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(repo.images_for_properties(&[orphan]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_property_cascades() {
        let repo = InMemoryRepository::new();
        let user = Uuid::new_v4();
        let property = repo
            .create_property(Uuid::new_v4(), listing("doomed"))
            .await
            .unwrap();
        repo.add_property_images(property.id, vec![image("x")])
            .await
            .unwrap();
        repo.add_wishlist_entry(user, property.id).await.unwrap();

        assert!(repo.delete_property(property.id).await.unwrap());
        assert!(!repo.delete_property(property.id).await.unwrap());
        assert!(repo.images_for_properties(&[property.id]).await.unwrap().is_empty());
        assert!(repo.list_wishlist(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn wishlist_pairs_are_unique() {
        let repo = InMemoryRepository::new();
        let (user, property) = (Uuid::new_v4(), Uuid::new_v4());
        repo.add_wishlist_entry(user, property).await.unwrap();
        let err = repo.add_wishlist_entry(user, property).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.list_wishlist(user).await.unwrap().len(), 1);
    }
}
