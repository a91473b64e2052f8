//! Which posts a viewer other than the author may see.
//!
//! `is_publicly_visible` is the only definition of the rule. The Postgres
//! repository expresses the same condition in SQL and the in-memory store
//! goes through [`PostFilter::matches`].

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::post::PostDetails;

/// A post is public once it is published, sits in a published category and
/// its publication date has passed. A post without a category is never public.
pub fn is_publicly_visible(
    is_published: bool,
    category_published: Option<bool>,
    pub_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    is_published && category_published.unwrap_or(false) && pub_date <= now
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    /// When set, only posts publicly visible at this instant pass.
    pub visible_at: Option<DateTime<Utc>>,
}

impl PostFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn published(now: DateTime<Utc>) -> Self {
        Self {
            visible_at: Some(now),
            ..Self::default()
        }
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn matches(&self, details: &PostDetails) -> bool {
        if self.author_id.is_some_and(|id| id != details.post.author_id) {
            return false;
        }
        if self
            .category_id
            .is_some_and(|id| details.post.category_id != Some(id))
        {
            return false;
        }
        match self.visible_at {
            Some(now) => details.is_visible_at(now),
            None => true,
        }
    }
}
