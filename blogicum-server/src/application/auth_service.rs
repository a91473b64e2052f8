use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::error::{DomainError, FieldErrors};
use crate::domain::user::{RegistrationDraft, User};
use crate::infrastructure::security::{JwtKeys, hash_password, verify_password};

pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))
    }

    #[instrument(skip(self, draft), fields(username = %draft.username))]
    pub async fn register(&self, draft: RegistrationDraft) -> Result<User, DomainError> {
        if self.repo.find_by_username(&draft.username).await?.is_some() {
            let mut errors = FieldErrors::new();
            errors.add("username", USERNAME_TAKEN);
            return Err(DomainError::Validation(errors));
        }

        let hash = hash_password(&draft.password)
            .map_err(|err| DomainError::Internal(err.to_string()))?;
        let user = User::new(draft.username, draft.email.to_lowercase(), hash);
        self.repo.create(user).await
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<String, DomainError> {
        let user = self
            .repo
            .find_by_username(username)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|_| DomainError::Unauthorized)?;
        if !valid {
            return Err(DomainError::Unauthorized);
        }

        self.issue_token(&user)
    }

    pub fn issue_token(&self, user: &User) -> Result<String, DomainError> {
        self.keys
            .generate_token(user.id)
            .map_err(|err| DomainError::Internal(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryStore::new()),
            JwtKeys::new("test-secret".into(), 60),
        )
    }

    fn draft(username: &str) -> RegistrationDraft {
        RegistrationDraft {
            username: username.into(),
            email: "Reader@Example.com".into(),
            password: "long enough password".into(),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let auth = service();
        let user = auth.register(draft("reader")).await.unwrap();
        assert_eq!(user.email, "reader@example.com");
        assert_ne!(user.password_hash, "long enough password");

        let token = auth.login("reader", "long enough password").await.unwrap();
        let claims = auth.keys().verify_token(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_field_error() {
        let auth = service();
        auth.register(draft("reader")).await.unwrap();

        match auth.register(draft("reader")).await {
            Err(DomainError::Validation(errors)) => {
                assert_eq!(errors.get("username"), Some(&[USERNAME_TAKEN.to_string()][..]));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn wrong_password_or_unknown_user_is_unauthorized() {
        let auth = service();
        auth.register(draft("reader")).await.unwrap();

        assert!(matches!(
            auth.login("reader", "nope").await,
            Err(DomainError::Unauthorized)
        ));
        assert!(matches!(
            auth.login("ghost", "whatever").await,
            Err(DomainError::Unauthorized)
        ));
    }
}
