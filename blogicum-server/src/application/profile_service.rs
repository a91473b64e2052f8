use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::application::auth_service::USERNAME_TAKEN;
use crate::data::user_repository::UserRepository;
use crate::domain::error::{DomainError, FieldErrors};
use crate::domain::user::{ProfileDraft, User};

#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))
    }

    /// Profiles are only ever edited by their owner, so the target is the requester.
    #[instrument(skip(self, draft))]
    pub async fn update(&self, user_id: Uuid, draft: ProfileDraft) -> Result<User, DomainError> {
        let mut user = self.get(user_id).await?;

        if draft.username != user.username {
            let taken = self
                .users
                .find_by_username(&draft.username)
                .await?
                .is_some_and(|other| other.id != user.id);
            if taken {
                let mut errors = FieldErrors::new();
                errors.add("username", USERNAME_TAKEN);
                return Err(DomainError::Validation(errors));
            }
        }

        user.apply(draft);
        self.users.update_profile(user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;

    fn draft(username: &str) -> ProfileDraft {
        ProfileDraft {
            username: username.into(),
            email: "writer@example.com".into(),
            first_name: "Lev".into(),
            last_name: "Tolstoy".into(),
        }
    }

    #[tokio::test]
    async fn update_changes_display_fields() {
        let store = MemoryStore::new();
        let user = store.insert_user(User::new("writer".into(), String::new(), "hash".into()));
        let service = ProfileService::new(Arc::new(store.clone()));

        let updated = service.update(user.id, draft("leo")).await.unwrap();
        assert_eq!(updated.username, "leo");
        assert_eq!(updated.first_name, "Lev");
        assert_eq!(
            store.user(user.id).map(|u| u.password_hash),
            Some("hash".to_string())
        );
    }

    #[tokio::test]
    async fn update_rejects_taken_username() {
        let store = MemoryStore::new();
        let user = store.insert_user(User::new("writer".into(), String::new(), "x".into()));
        store.insert_user(User::new("taken".into(), String::new(), "x".into()));
        let service = ProfileService::new(Arc::new(store));

        assert!(matches!(
            service.update(user.id, draft("taken")).await,
            Err(DomainError::Validation(_))
        ));
        assert!(service.update(user.id, draft("writer")).await.is_ok());
    }
}
