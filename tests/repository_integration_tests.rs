//! Postgres-backed repository tests. They need a reachable database:
//! `DATABASE_URL=... cargo test -- --ignored`.

use properease_api::{
    models::{
        ContactType, CreatePropertyRequest, InquiryStatus, NewInquiry, NewPropertyImage, NewUser,
        PropertyFilter, PropertyType, Role, RoomType, UpdatePropertyRequest, UserRecord,
    },
    repository::{PostgresRepository, Repository, RepositoryError},
};
use sqlx::PgPool;
use uuid::Uuid;

// --- Test Context and Setup ---

struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

// --- Test Data Helpers ---

/// Emails are unique per run so tests can share one database.
async fn create_test_user(repo: &PostgresRepository, role: Role) -> UserRecord {
    repo.create_user(NewUser {
        name: "Repo Test".to_string(),
        email: format!("{}@repo-test.example", Uuid::new_v4()),
        password_hash: "hash".to_string(),
        role,
        phone: Some("5550001".to_string()),
        whatsapp: None,
    })
    .await
    .expect("Failed to create test user")
}

fn listing(title: &str, city: &str, rent: i32) -> CreatePropertyRequest {
    CreatePropertyRequest {
        title: title.to_string(),
        description: Some("Integration listing".to_string()),
        rent,
        location: "Test Nagar".to_string(),
        city: Some(city.to_string()),
        room_type: RoomType::Single,
        property_type: PropertyType::Flat,
        amenities: vec!["wifi".to_string(), "parking".to_string()],
        ..CreatePropertyRequest::default()
    }
}

fn image(name: &str) -> NewPropertyImage {
    NewPropertyImage {
        url: format!("http://localhost/uploads/properties/{name}"),
        filename: name.to_string(),
        size: 10,
    }
}

// --- Tests ---

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_duplicate_email_is_a_conflict() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let user = create_test_user(&repo, Role::Student).await;

    let result = repo
        .create_user(NewUser {
            name: "Again".to_string(),
            email: user.email.clone(),
            password_hash: "hash".to_string(),
            role: Role::Student,
            phone: None,
            whatsapp: None,
        })
        .await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_property_crud_and_filters() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let owner = create_test_user(&repo, Role::Landlord).await;
    let city = format!("City-{}", Uuid::new_v4());

    let cheap = repo
        .create_property(owner.id, listing("Cheap % room", &city, 3000))
        .await
        .unwrap();
    let pricey = repo
        .create_property(owner.id, listing("Pricey flat", &city, 30000))
        .await
        .unwrap();
    assert!(cheap.available);
    assert!(!cheap.verified);

    let filter = PropertyFilter {
        city: Some(city.to_lowercase()),
        min_rent: Some(10000),
        ..PropertyFilter::default()
    };
    let (page, total) = repo.list_properties(&filter).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(page[0].id, pricey.id);

    // `%` in the search term is matched literally.
    let filter = PropertyFilter {
        city: Some(city.clone()),
        search: Some("%".to_string()),
        ..PropertyFilter::default()
    };
    let (page, total) = repo.list_properties(&filter).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(page[0].id, cheap.id);

    let filter = PropertyFilter {
        city: Some(city.clone()),
        amenities: vec!["wifi".to_string(), "gym".to_string()],
        ..PropertyFilter::default()
    };
    let (_, total) = repo.list_properties(&filter).await.unwrap();
    assert_eq!(total, 0);

    let updated = repo
        .update_property(
            cheap.id,
            UpdatePropertyRequest {
                rent: Some(3500),
                available: Some(false),
                ..UpdatePropertyRequest::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.rent, 3500);
    assert!(!updated.available);
    assert_eq!(updated.title, "Cheap % room");

    let mine = repo.list_properties_by_owner(owner.id).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].id, pricey.id);
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_image_orders_continue_across_batches() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let owner = create_test_user(&repo, Role::Landlord).await;
    let property = repo
        .create_property(owner.id, listing("Gallery home", "Pune", 8000))
        .await
        .unwrap();

    let first = repo
        .add_property_images(property.id, vec![image("a.png"), image("b.png")])
        .await
        .unwrap()
        .unwrap();
    let second = repo
        .add_property_images(property.id, vec![image("c.png")])
        .await
        .unwrap()
        .unwrap();

    let orders: Vec<i32> = first.iter().chain(second.iter()).map(|i| i.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);

    let stored = repo.images_for_properties(&[property.id]).await.unwrap();
    let names: Vec<&str> = stored.iter().map(|i| i.filename.as_str()).collect();
    assert_eq!(names, vec!["a.png", "b.png", "c.png"]);

    assert!(repo.delete_property(property.id).await.unwrap());
    let late = repo
        .add_property_images(property.id, vec![image("d.png")])
        .await
        .unwrap();
    assert!(late.is_none());
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_inquiries_wishlist_and_cascade() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let owner = create_test_user(&repo, Role::Landlord).await;
    let student = create_test_user(&repo, Role::Student).await;
    let property = repo
        .create_property(owner.id, listing("Shared flat", "Delhi", 6000))
        .await
        .unwrap();

    let inquiry = repo
        .create_inquiry(NewInquiry {
            property_id: property.id,
            user_id: student.id,
            contact_type: ContactType::Phone,
            message: Some("Call me".to_string()),
            user_phone: student.phone.clone(),
            user_email: Some(student.email.clone()),
            user_name: Some(student.name.clone()),
        })
        .await
        .unwrap();
    assert_eq!(inquiry.status, InquiryStatus::New);

    let updated = repo
        .update_inquiry_status(inquiry.id, InquiryStatus::Contacted)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, InquiryStatus::Contacted);

    repo.add_wishlist_entry(student.id, property.id).await.unwrap();
    let again = repo.add_wishlist_entry(student.id, property.id).await;
    assert!(matches!(again, Err(RepositoryError::Conflict(_))));

    let counts = repo.property_counts(&[property.id]).await.unwrap();
    assert_eq!(counts[0].wishlist, 1);
    assert_eq!(counts[0].inquiries, 1);

    assert!(repo.delete_property(property.id).await.unwrap());
    assert!(repo.get_inquiry(inquiry.id).await.unwrap().is_none());
    assert!(
        repo.find_wishlist_entry(student.id, property.id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(!repo.delete_property(property.id).await.unwrap());
}
