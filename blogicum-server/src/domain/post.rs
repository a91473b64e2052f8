use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::category::CategorySummary;
use crate::domain::location::LocationSummary;
use crate::domain::visibility::is_publicly_visible;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub image: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(author_id: Uuid, draft: PostDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            text: draft.text,
            pub_date: draft.pub_date,
            author_id,
            category_id: Some(draft.category_id),
            location_id: draft.location_id,
            image: draft.image,
            is_published: draft.is_published,
            created_at: Utc::now(),
        }
    }

    /// Overwrites every editable field; the author never changes.
    pub fn apply(&mut self, draft: PostDraft) {
        self.title = draft.title;
        self.text = draft.text;
        self.pub_date = draft.pub_date;
        self.category_id = Some(draft.category_id);
        self.location_id = draft.location_id;
        self.image = draft.image;
        self.is_published = draft.is_published;
    }
}

/// Validated post fields, produced by the post form.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub category_id: Uuid,
    pub location_id: Option<Uuid>,
    pub image: Option<String>,
    pub is_published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
}

/// A post with its related rows joined in and its comments counted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetails {
    #[serde(flatten)]
    pub post: Post,
    pub author: AuthorSummary,
    pub category: Option<CategorySummary>,
    pub location: Option<LocationSummary>,
    pub comment_count: i64,
}

impl PostDetails {
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        is_publicly_visible(
            self.post.is_published,
            self.category.as_ref().map(|c| c.is_published),
            self.post.pub_date,
            now,
        )
    }
}
