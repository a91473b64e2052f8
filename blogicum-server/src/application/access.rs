//! Who may read and who may change posts and comments.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::post::PostDetails;

/// Outcome of an authorization gate. A denied request never sees the
/// resource; handlers turn `Denied` into a redirect, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access<T> {
    Permitted(T),
    Denied,
}

impl<T> Access<T> {
    pub fn is_permitted(&self) -> bool {
        matches!(self, Access::Permitted(_))
    }
}

/// Edit and delete are reserved for the author.
pub fn author_only<T>(requester: Uuid, author: Uuid, resource: T) -> Access<T> {
    if requester == author {
        Access::Permitted(resource)
    } else {
        Access::Denied
    }
}

/// Anyone may read a public post; the author may also read a hidden one.
pub fn can_view_post(viewer: Option<Uuid>, post: &PostDetails, now: DateTime<Utc>) -> bool {
    viewer == Some(post.post.author_id) || post.is_visible_at(now)
}
