use axum::{
    extract::{FromRef, FromRequestParts, Request},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    credentials::TokenService,
    error::ApiError,
    models::{Role, UserRecord},
    repository::RepositoryState,
};

/// AuthUser Extractor Result
///
/// The resolved identity of an authenticated request. It is attached to the
/// request extensions by `auth_middleware`, so handlers and role gates behind
/// the layer never repeat the token check.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    /// Used for Role-Based Access Control (RBAC).
    pub role: Role,
}

impl From<UserRecord> for AuthUser {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

impl AuthUser {
    /// Owner-or-admin check used before any listing mutation.
    pub fn may_modify(&self, owner_id: Uuid) -> bool {
        self.id == owner_id || self.role.is_admin()
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// authenticate
///
/// Runs the per-request state machine:
/// 1. No bearer token -> 401 "Access token required".
/// 2. Token fails verification (expired, forged, malformed) -> 403.
/// 3. The subject no longer exists -> 404 "User not found".
/// 4. Otherwise the caller's summary is returned.
pub async fn authenticate(
    headers: &HeaderMap,
    repo: &RepositoryState,
    tokens: &TokenService,
) -> Result<AuthUser, ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("Access token required".to_string()))?;

    let user_id = tokens.verify_token(token)?;

    let user = repo
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(AuthUser::from(user))
}

/// AuthUser Extractor Implementation
///
/// Makes `AuthUser` usable as a handler argument. Reuses the identity placed in
/// the extensions by `auth_middleware`; otherwise authenticates from the headers.
///
/// Rejection: an `ApiError` carrying 401, 403 or 404 as described on `authenticate`.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    TokenService: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let repo = RepositoryState::from_ref(state);
        let tokens = TokenService::from_ref(state);

        let user = authenticate(&parts.headers, &repo, &tokens).await?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// auth_middleware
///
/// Guards the authenticated and admin routers. If authentication fails the
/// extractor rejection is returned and the handler never runs; on success the
/// identity is attached to the request for the role gates below.
pub async fn auth_middleware(user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(user);
    next.run(request).await
}

// --- Role Gates ---

/// require_role
///
/// Reads the identity attached by `auth_middleware` and checks it against
/// `allowed`. A missing identity means the gate was mounted without the
/// middleware in front of it and is answered with 401.
pub fn require_role(
    user: Option<&AuthUser>,
    allowed: fn(Role) -> bool,
    denied: &str,
) -> Result<AuthUser, ApiError> {
    let user = user.ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;
    if allowed(user.role) {
        Ok(user.clone())
    } else {
        tracing::warn!(user_id = %user.id, role = ?user.role, "role gate denied access");
        Err(ApiError::Forbidden(denied.to_string()))
    }
}

/// Landlord
///
/// Extractor admitting LANDLORD and ADMIN callers.
#[derive(Debug, Clone)]
pub struct Landlord(pub AuthUser);

impl<S> FromRequestParts<S> for Landlord
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(
            parts.extensions.get::<AuthUser>(),
            Role::can_manage_listings,
            "Landlord access required",
        )
        .map(Landlord)
    }
}

/// Admin
///
/// Extractor admitting ADMIN callers only.
#[derive(Debug, Clone)]
pub struct Admin(pub AuthUser);

impl<S> FromRequestParts<S> for Admin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(
            parts.extensions.get::<AuthUser>(),
            Role::is_admin,
            "Admin access required",
        )
        .map(Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    fn user(role: Role) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "someone@example.com".into(),
            name: "Someone".into(),
            role,
        }
    }

    #[test]
    fn bearer_token_requires_the_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    #[test]
    fn landlord_gate_admits_landlords_and_admins() {
        for role in [Role::Landlord, Role::Admin] {
            let caller = user(role);
            assert!(require_role(Some(&caller), Role::can_manage_listings, "no").is_ok());
        }

        let student = user(Role::Student);
        let err = require_role(Some(&student), Role::can_manage_listings, "no").unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn gate_without_identity_is_unauthorized() {
        let err = require_role(None, Role::is_admin, "no").unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn admin_may_modify_anything() {
        let owner = Uuid::new_v4();
        assert!(user(Role::Admin).may_modify(owner));
        assert!(!user(Role::Landlord).may_modify(owner));

        let mut landlord = user(Role::Landlord);
        landlord.id = owner;
        assert!(landlord.may_modify(owner));
    }
}
