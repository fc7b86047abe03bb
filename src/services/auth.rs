use uuid::Uuid;

use crate::{
    credentials::{self, TokenService},
    error::ApiError,
    models::{AuthPayload, NewUser, ProfileUpdate, SigninRequest, SignupRequest, UserProfile},
    repository::{EMAIL_TAKEN, RepositoryState},
};

const BAD_CREDENTIALS: &str = "Invalid email or password";

/// AuthService
///
/// Account lifecycle: signup, signin and the caller's own profile.
#[derive(Clone)]
pub struct AuthService {
    repo: RepositoryState,
    tokens: TokenService,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(repo: RepositoryState, tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self {
            repo,
            tokens,
            bcrypt_cost,
        }
    }

    /// Creates the account and signs the caller in. A concurrent signup with the
    /// same address is still caught by the unique index.
    pub async fn signup(&self, req: SignupRequest) -> Result<AuthPayload, ApiError> {
        if self.repo.find_user_by_email(&req.email).await?.is_some() {
            return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let password_hash =
            credentials::hash_password_blocking(req.password, self.bcrypt_cost).await?;

        let user = self
            .repo
            .create_user(NewUser {
                name: req.name,
                email: req.email,
                password_hash,
                role: req.role,
                phone: req.phone,
                whatsapp: req.whatsapp,
            })
            .await?;

        let token = self.tokens.issue_token(user.id)?;
        tracing::info!(user_id = %user.id, role = ?user.role, "user registered");

        Ok(AuthPayload {
            user: user.into(),
            token,
        })
    }

    /// Unknown email and wrong password produce the same answer.
    pub async fn signin(&self, req: SigninRequest) -> Result<AuthPayload, ApiError> {
        let Some(user) = self.repo.find_user_by_email(&req.email).await? else {
            return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
        };

        if !credentials::verify_password_blocking(req.password, user.password_hash.clone()).await {
            tracing::info!(user_id = %user.id, "signin rejected");
            return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        let token = self.tokens.issue_token(user.id)?;
        Ok(AuthPayload {
            user: user.into(),
            token,
        })
    }

    pub async fn me(&self, user_id: Uuid) -> Result<UserProfile, ApiError> {
        self.repo
            .find_user_by_id(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| ApiError::not_found("User"))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<UserProfile, ApiError> {
        let user = self
            .repo
            .update_user_profile(user_id, update)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))?;
        tracing::info!(user_id = %user.id, "profile updated");
        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::Role, repository::InMemoryRepository};
    use axum::http::StatusCode;
    use chrono::Duration;
    use std::sync::Arc;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(InMemoryRepository::new()),
            TokenService::new("unit-test-secret", Duration::hours(1)),
            4,
        )
    }

    fn signup(email: &str) -> SignupRequest {
        SignupRequest {
            name: "Ravi".into(),
            email: email.into(),
            password: "secret1".into(),
            role: Role::Student,
            phone: Some("9000000000".into()),
            whatsapp: None,
        }
    }

    #[tokio::test]
    async fn duplicate_signup_is_a_conflict() {
        let auth = service();
        auth.signup(signup("ravi@example.com")).await.unwrap();
        let err = auth.signup(signup("ravi@example.com")).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn signin_checks_the_password() {
        let auth = service();
        let created = auth.signup(signup("ravi@example.com")).await.unwrap();

        let ok = auth
            .signin(SigninRequest {
                email: "ravi@example.com".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();
        assert_eq!(ok.user.id, created.user.id);

        let wrong = auth
            .signin(SigninRequest {
                email: "ravi@example.com".into(),
                password: "secret2".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(wrong.to_string(), BAD_CREDENTIALS);

        let unknown = auth
            .signin(SigninRequest {
                email: "nobody@example.com".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(unknown.to_string(), BAD_CREDENTIALS);
    }

    #[tokio::test]
    async fn issued_token_names_the_new_user() {
        let auth = service();
        let payload = auth.signup(signup("ravi@example.com")).await.unwrap();
        let subject = auth.tokens.verify_token(&payload.token).unwrap();
        assert_eq!(subject, payload.user.id);
    }
}
