use async_trait::async_trait;
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder};
use uuid::Uuid;

use super::{ALREADY_WISHLISTED, EMAIL_TAKEN, RepoResult, Repository, RepositoryError};
use crate::models::{
    AdminDashboardStats, CreatePropertyRequest, Inquiry, InquiryStatus, NewInquiry,
    NewPropertyImage, NewUser, ProfileUpdate, Property, PropertyCounts, PropertyFilter,
    PropertyImage, UpdatePropertyRequest, UserContact, UserRecord, WishlistEntry,
};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, phone, whatsapp, verified, created_at, updated_at";

const PROPERTY_COLUMNS: &str = "id, owner_id, title, description, rent, location, address, city, \
     state, pincode, room_type, property_type, amenities, smoking, drinking, pets, visitors, \
     whatsapp_number, available, verified, created_at, updated_at";

const IMAGE_COLUMNS: &str = "id, property_id, url, filename, size, sort_order, created_at";

const INQUIRY_COLUMNS: &str = "id, property_id, user_id, contact_type, status, message, \
     user_phone, user_email, user_name, created_at, updated_at";

/// Maps a unique-constraint violation to `Conflict(message)`, everything else to `Database`.
fn unique_or(err: sqlx::Error, message: &str) -> RepositoryError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => RepositoryError::Conflict(message.to_string()),
        _ => RepositoryError::Database(err),
    }
}

/// Escapes LIKE metacharacters so user search text matches literally.
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Appends the AND-combined filter predicates. Shared by the page query and
/// the count query so both always agree.
fn push_property_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &PropertyFilter) {
    builder.push(" WHERE TRUE");

    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR location ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR city ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(property_type) = filter.property_type {
        builder.push(" AND property_type = ").push_bind(property_type);
    }
    if let Some(room_type) = filter.room_type {
        builder.push(" AND room_type = ").push_bind(room_type);
    }
    if let Some(min) = filter.min_rent {
        builder.push(" AND rent >= ").push_bind(min);
    }
    if let Some(max) = filter.max_rent {
        builder.push(" AND rent <= ").push_bind(max);
    }
    if let Some(city) = &filter.city {
        builder
            .push(" AND LOWER(city) = LOWER(")
            .push_bind(city.clone())
            .push(")");
    }
    if !filter.amenities.is_empty() {
        builder
            .push(" AND amenities @> ")
            .push_bind(filter.amenities.clone());
    }
    if let Some(available) = filter.available {
        builder.push(" AND available = ").push_bind(available);
    }
    if let Some(verified) = filter.verified {
        builder.push(" AND verified = ").push_bind(verified);
    }
}

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS ---

    async fn find_user_by_id(&self, id: Uuid) -> RepoResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<UserRecord> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (id, name, email, password_hash, role, phone, whatsapp) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role)
        .bind(user.phone)
        .bind(user.whatsapp)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_or(e, EMAIL_TAKEN))
    }

    /// Uses `COALESCE` so only the provided fields change.
    async fn update_user_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> RepoResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET name = COALESCE($2, name), phone = COALESCE($3, phone), \
             whatsapp = COALESCE($4, whatsapp), updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.phone)
        .bind(update.whatsapp)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_contacts(&self, ids: &[Uuid]) -> RepoResult<Vec<UserContact>> {
        let contacts = sqlx::query_as::<_, UserContact>(
            "SELECT id, name, email, phone, whatsapp FROM users WHERE id = ANY($1)",
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(contacts)
    }

    // --- PROPERTIES ---

    /// Builds the page and count queries from the same predicate set with
    /// `QueryBuilder`, so every user value is bound, never interpolated.
    async fn list_properties(&self, filter: &PropertyFilter) -> RepoResult<(Vec<Property>, i64)> {
        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM properties");
        push_property_filters(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut page: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {PROPERTY_COLUMNS} FROM properties"));
        push_property_filters(&mut page, filter);
        page.push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(filter.limit as i64)
            .push(" OFFSET ")
            .push_bind(filter.offset());

        let properties = page
            .build_query_as::<Property>()
            .fetch_all(&self.pool)
            .await?;

        Ok((properties, total))
    }

    async fn get_property(&self, id: Uuid) -> RepoResult<Option<Property>> {
        let property = sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(property)
    }

    async fn properties_by_ids(&self, ids: &[Uuid]) -> RepoResult<Vec<Property>> {
        let properties = sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = ANY($1)"
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(properties)
    }

    async fn list_properties_by_owner(&self, owner_id: Uuid) -> RepoResult<Vec<Property>> {
        let properties = sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE owner_id = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(properties)
    }

    /// New listings start available and unverified.
    async fn create_property(
        &self,
        owner_id: Uuid,
        req: CreatePropertyRequest,
    ) -> RepoResult<Property> {
        let property = sqlx::query_as::<_, Property>(&format!(
            "INSERT INTO properties (id, owner_id, title, description, rent, location, address, \
             city, state, pincode, room_type, property_type, amenities, smoking, drinking, pets, \
             visitors, whatsapp_number, available, verified) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
             $18, TRUE, FALSE) RETURNING {PROPERTY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(req.title)
        .bind(req.description)
        .bind(req.rent)
        .bind(req.location)
        .bind(req.address)
        .bind(req.city)
        .bind(req.state)
        .bind(req.pincode)
        .bind(req.room_type)
        .bind(req.property_type)
        .bind(req.amenities)
        .bind(req.smoking)
        .bind(req.drinking)
        .bind(req.pets)
        .bind(req.visitors)
        .bind(req.whatsapp_number)
        .fetch_one(&self.pool)
        .await?;
        Ok(property)
    }

    async fn update_property(
        &self,
        id: Uuid,
        patch: UpdatePropertyRequest,
    ) -> RepoResult<Option<Property>> {
        let property = sqlx::query_as::<_, Property>(&format!(
            r#"
            UPDATE properties
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                rent = COALESCE($4, rent),
                location = COALESCE($5, location),
                room_type = COALESCE($6, room_type),
                property_type = COALESCE($7, property_type),
                amenities = COALESCE($8, amenities),
                address = COALESCE($9, address),
                city = COALESCE($10, city),
                state = COALESCE($11, state),
                pincode = COALESCE($12, pincode),
                smoking = COALESCE($13, smoking),
                drinking = COALESCE($14, drinking),
                pets = COALESCE($15, pets),
                visitors = COALESCE($16, visitors),
                whatsapp_number = COALESCE($17, whatsapp_number),
                available = COALESCE($18, available),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.rent)
        .bind(patch.location)
        .bind(patch.room_type)
        .bind(patch.property_type)
        .bind(patch.amenities)
        .bind(patch.address)
        .bind(patch.city)
        .bind(patch.state)
        .bind(patch.pincode)
        .bind(patch.smoking)
        .bind(patch.drinking)
        .bind(patch.pets)
        .bind(patch.visitors)
        .bind(patch.whatsapp_number)
        .bind(patch.available)
        .fetch_optional(&self.pool)
        .await?;
        Ok(property)
    }

    async fn delete_property(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_property_verified(
        &self,
        id: Uuid,
        verified: bool,
    ) -> RepoResult<Option<Property>> {
        let property = sqlx::query_as::<_, Property>(&format!(
            "UPDATE properties SET verified = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {PROPERTY_COLUMNS}"
        ))
        .bind(id)
        .bind(verified)
        .fetch_optional(&self.pool)
        .await?;
        Ok(property)
    }

    async fn property_counts(&self, ids: &[Uuid]) -> RepoResult<Vec<PropertyCounts>> {
        let counts = sqlx::query_as::<_, PropertyCounts>(
            r#"
            SELECT p.id AS property_id,
                   (SELECT COUNT(*) FROM wishlist w WHERE w.property_id = p.id) AS wishlist,
                   (SELECT COUNT(*) FROM inquiries i WHERE i.property_id = p.id) AS inquiries
            FROM properties p
            WHERE p.id = ANY($1)
            "#,
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    // --- IMAGES ---

    async fn images_for_properties(&self, ids: &[Uuid]) -> RepoResult<Vec<PropertyImage>> {
        let images = sqlx::query_as::<_, PropertyImage>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM property_images WHERE property_id = ANY($1) \
             ORDER BY property_id, sort_order ASC"
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(images)
    }

    /// Runs in one transaction. The parent row is locked first so two
    /// concurrent uploads to the same property cannot compute the same orders.
    async fn add_property_images(
        &self,
        property_id: Uuid,
        images: Vec<NewPropertyImage>,
    ) -> RepoResult<Option<Vec<PropertyImage>>> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM properties WHERE id = $1 FOR UPDATE")
                .bind(property_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM property_images WHERE property_id = $1")
                .bind(property_id)
                .fetch_one(&mut *tx)
                .await?;

        let mut inserted = Vec::with_capacity(images.len());
        for (offset, image) in images.into_iter().enumerate() {
            let row = sqlx::query_as::<_, PropertyImage>(&format!(
                "INSERT INTO property_images (id, property_id, url, filename, size, sort_order) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING {IMAGE_COLUMNS}"
            ))
            .bind(Uuid::new_v4())
            .bind(property_id)
            .bind(image.url)
            .bind(image.filename)
            .bind(image.size)
            .bind((existing + offset as i64) as i32)
            .fetch_one(&mut *tx)
            .await?;
            inserted.push(row);
        }

        tx.commit().await?;
        Ok(Some(inserted))
    }

    // --- INQUIRIES ---

    async fn create_inquiry(&self, inquiry: NewInquiry) -> RepoResult<Inquiry> {
        let row = sqlx::query_as::<_, Inquiry>(&format!(
            "INSERT INTO inquiries (id, property_id, user_id, contact_type, status, message, \
             user_phone, user_email, user_name) \
             VALUES ($1, $2, $3, $4, 'NEW', $5, $6, $7, $8) RETURNING {INQUIRY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(inquiry.property_id)
        .bind(inquiry.user_id)
        .bind(inquiry.contact_type)
        .bind(inquiry.message)
        .bind(inquiry.user_phone)
        .bind(inquiry.user_email)
        .bind(inquiry.user_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_inquiry(&self, id: Uuid) -> RepoResult<Option<Inquiry>> {
        let row = sqlx::query_as::<_, Inquiry>(&format!(
            "SELECT {INQUIRY_COLUMNS} FROM inquiries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_inquiries_for_property(&self, property_id: Uuid) -> RepoResult<Vec<Inquiry>> {
        let rows = sqlx::query_as::<_, Inquiry>(&format!(
            "SELECT {INQUIRY_COLUMNS} FROM inquiries WHERE property_id = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_inquiries_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Inquiry>> {
        let rows = sqlx::query_as::<_, Inquiry>(&format!(
            "SELECT {INQUIRY_COLUMNS} FROM inquiries WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_inquiry_status(
        &self,
        id: Uuid,
        status: InquiryStatus,
    ) -> RepoResult<Option<Inquiry>> {
        let row = sqlx::query_as::<_, Inquiry>(&format!(
            "UPDATE inquiries SET status = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {INQUIRY_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    // --- WISHLIST ---

    async fn list_wishlist(&self, user_id: Uuid) -> RepoResult<Vec<WishlistEntry>> {
        let rows = sqlx::query_as::<_, WishlistEntry>(
            "SELECT user_id, property_id, created_at FROM wishlist WHERE user_id = $1 \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_wishlist_entry(
        &self,
        user_id: Uuid,
        property_id: Uuid,
    ) -> RepoResult<Option<WishlistEntry>> {
        let row = sqlx::query_as::<_, WishlistEntry>(
            "SELECT user_id, property_id, created_at FROM wishlist \
             WHERE user_id = $1 AND property_id = $2",
        )
        .bind(user_id)
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// The composite primary key is the final arbiter: a racing duplicate
    /// insert surfaces as `Conflict`.
    async fn add_wishlist_entry(
        &self,
        user_id: Uuid,
        property_id: Uuid,
    ) -> RepoResult<WishlistEntry> {
        sqlx::query_as::<_, WishlistEntry>(
            "INSERT INTO wishlist (user_id, property_id) VALUES ($1, $2) \
             RETURNING user_id, property_id, created_at",
        )
        .bind(user_id)
        .bind(property_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_or(e, ALREADY_WISHLISTED))
    }

    async fn remove_wishlist_entry(&self, user_id: Uuid, property_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM wishlist WHERE user_id = $1 AND property_id = $2")
            .bind(user_id)
            .bind(property_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- ADMIN ---

    async fn get_stats(&self) -> RepoResult<AdminDashboardStats> {
        let stats = sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users),
                (SELECT COUNT(*) FROM properties),
                (SELECT COUNT(*) FROM inquiries),
                (SELECT COUNT(*) FROM wishlist),
                (SELECT COUNT(*) FROM properties WHERE verified = FALSE)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(AdminDashboardStats {
            total_users: stats.0,
            total_properties: stats.1,
            total_inquiries: stats.2,
            total_wishlist_entries: stats.3,
            unverified_properties: stats.4,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("flat"), "%flat%");
    }
}
