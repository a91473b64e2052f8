//! In-memory repositories used by service and handler tests.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::CommentRepository;
use crate::data::location_repository::LocationRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::category::Category;
use crate::domain::comment::{Comment, CommentDetails};
use crate::domain::error::DomainError;
use crate::domain::location::Location;
use crate::domain::post::{AuthorSummary, Post, PostDetails};
use crate::domain::user::User;
use crate::domain::visibility::PostFilter;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    categories: Vec<Category>,
    locations: Vec<Location>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
}

impl Tables {
    fn username(&self, id: Uuid) -> String {
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }

    fn details(&self, post: &Post) -> PostDetails {
        PostDetails {
            post: post.clone(),
            author: AuthorSummary {
                id: post.author_id,
                username: self.username(post.author_id),
            },
            category: post
                .category_id
                .and_then(|id| self.categories.iter().find(|c| c.id == id))
                .map(Category::summary),
            location: post
                .location_id
                .and_then(|id| self.locations.iter().find(|l| l.id == id))
                .map(Location::summary),
            comment_count: self.comments.iter().filter(|c| c.post_id == post.id).count() as i64,
        }
    }

    fn comment_details(&self, comment: &Comment) -> CommentDetails {
        CommentDetails {
            comment: comment.clone(),
            author_username: self.username(comment.author_id),
        }
    }

    fn matching(&self, filter: &PostFilter) -> Vec<PostDetails> {
        let mut rows: Vec<PostDetails> = self
            .posts
            .iter()
            .map(|p| self.details(p))
            .filter(|d| filter.matches(d))
            .collect();
        rows.sort_by(|a, b| {
            b.post
                .pub_date
                .cmp(&a.post.pub_date)
                .then(a.post.id.cmp(&b.post.id))
        });
        rows
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub fn insert_user(&self, user: User) -> User {
        self.lock().users.push(user.clone());
        user
    }

    pub fn insert_category(&self, category: Category) -> Category {
        self.lock().categories.push(category.clone());
        category
    }

    pub fn insert_location(&self, location: Location) -> Location {
        self.lock().locations.push(location.clone());
        location
    }

    pub fn insert_post(&self, post: Post) -> Post {
        self.lock().posts.push(post.clone());
        post
    }

    pub fn insert_comment(&self, comment: Comment) -> Comment {
        self.lock().comments.push(comment.clone());
        comment
    }

    pub fn post(&self, id: Uuid) -> Option<Post> {
        self.lock().posts.iter().find(|p| p.id == id).cloned()
    }

    pub fn comment(&self, id: Uuid) -> Option<Comment> {
        self.lock().comments.iter().find(|c| c.id == id).cloned()
    }

    pub fn comments_of(&self, post_id: Uuid) -> Vec<Comment> {
        self.lock()
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect()
    }

    pub fn user(&self, id: Uuid) -> Option<User> {
        self.lock().users.iter().find(|u| u.id == id).cloned()
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        Ok(self.insert_post(post))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        Ok(self.post(id))
    }

    async fn find_details(
        &self,
        id: Uuid,
        filter: &PostFilter,
    ) -> Result<Option<PostDetails>, DomainError> {
        let tables = self.lock();
        Ok(tables
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| tables.details(p))
            .filter(|d| filter.matches(d)))
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, DomainError> {
        Ok(self.lock().matching(filter).len() as u64)
    }

    async fn list(
        &self,
        filter: &PostFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PostDetails>, DomainError> {
        Ok(self
            .lock()
            .matching(filter)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn update(&self, post: Post) -> Result<Post, DomainError> {
        let mut tables = self.lock();
        let slot = tables
            .posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(DomainError::PostNotFound(post.id))?;
        *slot = post.clone();
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut tables = self.lock();
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        if tables.posts.len() == before {
            return Err(DomainError::PostNotFound(id));
        }
        tables.comments.retain(|c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, DomainError> {
        Ok(self.lock().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        Ok(self
            .lock()
            .categories
            .iter()
            .find(|c| c.slug == slug)
            .cloned())
    }
}

#[async_trait]
impl LocationRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, DomainError> {
        Ok(self.lock().locations.iter().find(|l| l.id == id).cloned())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, comment: Comment) -> Result<Comment, DomainError> {
        Ok(self.insert_comment(comment))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CommentDetails>, DomainError> {
        let tables = self.lock();
        Ok(tables
            .comments
            .iter()
            .find(|c| c.id == id)
            .map(|c| tables.comment_details(c)))
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentDetails>, DomainError> {
        let tables = self.lock();
        let mut comments: Vec<&Comment> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments
            .into_iter()
            .map(|c| tables.comment_details(c))
            .collect())
    }

    async fn update_text(&self, id: Uuid, text: &str) -> Result<Comment, DomainError> {
        let mut tables = self.lock();
        let comment = tables
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(DomainError::CommentNotFound(id))?;
        comment.text = text.to_owned();
        Ok(comment.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut tables = self.lock();
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        if tables.comments.len() == before {
            return Err(DomainError::CommentNotFound(id));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut tables = self.lock();
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(DomainError::UserAlreadyExists(user.username));
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.user(id))
    }

    async fn update_profile(&self, user: User) -> Result<User, DomainError> {
        let mut tables = self.lock();
        let slot = tables
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| DomainError::UserNotFound(user.username.clone()))?;
        *slot = user.clone();
        Ok(user)
    }
}
