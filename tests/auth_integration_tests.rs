use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::Duration;
use properease_api::{
    AppConfig, AppState, InMemoryRepository, MockStorageService, TokenService, create_router,
    models::{NewUser, Role},
    repository::RepositoryState,
    storage::StorageState,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

// --- Harness ---

struct Harness {
    router: Router,
    repo: RepositoryState,
    tokens: TokenService,
    config: AppConfig,
}

fn harness() -> Harness {
    let repo = Arc::new(InMemoryRepository::new()) as RepositoryState;
    let storage = Arc::new(MockStorageService::new()) as StorageState;
    let config = AppConfig::default();
    let tokens = TokenService::from_config(&config);
    let router = create_router(AppState::new(repo.clone(), storage, config.clone()));

    Harness {
        router,
        repo,
        tokens,
        config,
    }
}

impl Harness {
    /// Inserts a user straight into the store. The hash is never checked here.
    async fn user(&self, email: &str, role: Role) -> Uuid {
        self.repo
            .create_user(NewUser {
                name: "Test User".to_string(),
                email: email.to_string(),
                password_hash: "unused".to_string(),
                role,
                phone: None,
                whatsapp: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn get(&self, uri: &str, authorization: Option<String>) -> (StatusCode, Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }
        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}

fn bearer(token: &str) -> Option<String> {
    Some(format!("Bearer {token}"))
}

// --- Token handling ---

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let h = harness();
    let (status, body) = h.get("/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Access token required");
}

#[tokio::test]
async fn test_non_bearer_scheme_is_unauthorized() {
    let h = harness();
    let (status, _) = h
        .get("/api/auth/me", Some("Basic dXNlcjpwYXNz".to_string()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tampered_token_is_forbidden() {
    let h = harness();
    let id = h.user("tamper@example.com", Role::Student).await;

    let foreign = TokenService::new("some-other-secret", Duration::hours(1));
    let token = foreign.issue_token(id).unwrap();

    let (status, body) = h.get("/api/auth/me", bearer(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn test_expired_token_is_forbidden() {
    let h = harness();
    let id = h.user("late@example.com", Role::Student).await;

    let expired = TokenService::new(&h.config.jwt_secret, Duration::hours(-1));
    let token = expired.issue_token(id).unwrap();

    let (status, _) = h.get("/api/auth/me", bearer(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_token_for_unknown_user_is_not_found() {
    let h = harness();
    let token = h.tokens.issue_token(Uuid::new_v4()).unwrap();

    let (status, body) = h.get("/api/auth/me", bearer(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_valid_token_resolves_the_profile() {
    let h = harness();
    let id = h.user("valid@example.com", Role::Landlord).await;
    let token = h.tokens.issue_token(id).unwrap();

    let (status, body) = h.get("/api/auth/me", bearer(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "valid@example.com");
    assert_eq!(body["data"]["userType"], "LANDLORD");
}

// --- Role gates ---

#[tokio::test]
async fn test_admin_routes_require_a_token() {
    let h = harness();
    let (status, _) = h.get("/api/admin/stats", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_gate_rejects_other_roles() {
    let h = harness();
    for (email, role) in [
        ("s@example.com", Role::Student),
        ("l@example.com", Role::Landlord),
    ] {
        let id = h.user(email, role).await;
        let token = h.tokens.issue_token(id).unwrap();
        let (status, body) = h.get("/api/admin/stats", bearer(&token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Admin access required");
    }

    let admin = h.user("a@example.com", Role::Admin).await;
    let token = h.tokens.issue_token(admin).unwrap();
    let (status, body) = h.get("/api/admin/stats", bearer(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalUsers"], 3);
}

#[tokio::test]
async fn test_landlord_gate_admits_admins() {
    let h = harness();
    let student = h.user("student@example.com", Role::Student).await;
    let admin = h.user("admin@example.com", Role::Admin).await;

    let token = h.tokens.issue_token(student).unwrap();
    let (status, body) = h.get("/api/properties/my-properties", bearer(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Landlord access required");

    let token = h.tokens.issue_token(admin).unwrap();
    let (status, body) = h.get("/api/properties/my-properties", bearer(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], serde_json::json!([]));
}

#[tokio::test]
async fn test_public_routes_need_no_token() {
    let h = harness();
    let (status, body) = h.get("/api/properties", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["totalCount"], 0);
}
