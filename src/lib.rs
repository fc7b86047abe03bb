use std::any::Any;

use axum::{
    Router,
    extract::FromRef,
    http::{HeaderName, HeaderValue},
    middleware,
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as AnyCors, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod services;
pub mod storage;
pub mod validation;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::{AppConfig, Env, StorageConfig};
pub use credentials::TokenService;
pub use error::ApiError;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{LocalDiskStorage, MockStorageService, S3StorageClient, StorageState};

use services::{AuthService, InquiryService, PropertyService, WishlistService};

/// ApiDoc
///
/// Auto-generates the OpenAPI document from every `#[utoipa::path]` handler and
/// `ToSchema` model. Served at `/api-docs/openapi.json`, browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::signup, handlers::signin, handlers::get_me, handlers::update_profile,
        handlers::list_properties, handlers::get_property, handlers::get_my_properties,
        handlers::create_property, handlers::update_property, handlers::delete_property,
        handlers::upload_property_images, handlers::create_inquiry,
        handlers::get_property_inquiries, handlers::get_my_inquiries,
        handlers::update_inquiry_status, handlers::get_wishlist, handlers::add_to_wishlist,
        handlers::remove_from_wishlist, handlers::check_wishlist, handlers::get_admin_stats,
        handlers::verify_property
    ),
    components(
        schemas(
            models::Role, models::RoomType, models::PropertyType, models::ContactType,
            models::InquiryStatus, models::UserProfile, models::UserContact, models::Property,
            models::PropertyImage, models::PropertyCounts, models::PropertyDetails,
            models::Pagination, models::PropertyPage, models::Inquiry, models::PropertySummary,
            models::InquiryDetails, models::SignupRequest, models::SigninRequest,
            models::ProfileUpdate, models::CreatePropertyRequest, models::UpdatePropertyRequest,
            models::CreateInquiryRequest, models::UpdateInquiryStatusRequest,
            models::VerifyPropertyRequest, models::AuthPayload, models::ImageUploadResult,
            models::WishlistCheck, models::AdminDashboardStats, validation::ValidationIssue,
        )
    ),
    tags(
        (name = "properease", description = "ProperEase rental marketplace API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Implements the **Unified State Pattern**: the single, cloneable container of
/// every shared dependency. Services are assembled from it per request through
/// the `FromRef` impls below.
#[derive(Clone)]
pub struct AppState {
    /// Persistence: Postgres in production, in-memory in tests.
    pub repo: RepositoryState,
    /// Image storage: local disk, S3-compatible bucket, or the in-memory mock.
    pub storage: StorageState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
    /// Token signer/verifier built from `config.jwt_secret`.
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(repo: RepositoryState, storage: StorageState, config: AppConfig) -> Self {
        let tokens = TokenService::from_config(&config);
        Self {
            repo,
            storage,
            config,
            tokens,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(app_state: &AppState) -> TokenService {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(app_state: &AppState) -> AuthService {
        AuthService::new(
            app_state.repo.clone(),
            app_state.tokens.clone(),
            app_state.config.bcrypt_cost,
        )
    }
}

impl FromRef<AppState> for PropertyService {
    fn from_ref(app_state: &AppState) -> PropertyService {
        PropertyService::new(app_state.repo.clone(), app_state.storage.clone())
    }
}

impl FromRef<AppState> for InquiryService {
    fn from_ref(app_state: &AppState) -> InquiryService {
        InquiryService::new(app_state.repo.clone())
    }
}

impl FromRef<AppState> for WishlistService {
    fn from_ref(app_state: &AppState) -> WishlistService {
        WishlistService::new(app_state.repo.clone())
    }
}

/// create_router
///
/// Assembles the routing structure, applies global and scoped middleware, and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS: only the configured frontend origin.
    let origin = match state.config.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(_) => {
            tracing::warn!(frontend_url = %state.config.frontend_url, "unparsable FRONTEND_URL, allowing any origin");
            AllowOrigin::any()
        }
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AnyCors)
        .allow_headers(AnyCors);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let mut base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: no middleware.
        .merge(public::public_routes())
        // Authenticated Routes: guarded by `auth_middleware`.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::auth_middleware,
            )),
        )
        // Admin Routes: same middleware, plus the `Admin` gate in each handler.
        .nest(
            "/api/admin",
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::auth_middleware,
            )),
        )
        .fallback(handlers::route_not_found);

    // Uploaded files are served back from disk when that backend is active.
    if let StorageConfig::Disk { upload_dir } = &state.config.storage {
        base_router = base_router.nest_service("/uploads", ServeDir::new(upload_dir));
    }

    // 3. Observability and Correlation Layers
    base_router
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // 3a. Turn handler panics into the generic 500 body instead of dropping the connection.
                .layer(CatchPanicLayer::custom(handle_panic))
                // 3b. Request ID Generation
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3c. Request Tracing, correlated by request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3d. Request ID Propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// handle_panic
///
/// Logs the panic payload and answers with the same body as any other internal error.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::Internal(format!("handler panicked: {detail}")).into_response()
}

/// trace_span_logger
///
/// Used by `TraceLayer` to open one span per request carrying the method, URI
/// and `x-request-id`, so every log line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
