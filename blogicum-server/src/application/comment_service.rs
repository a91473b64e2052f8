use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::application::access::{Access, author_only};
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::comment::{Comment, CommentDetails, CommentDraft};
use crate::domain::error::DomainError;

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    #[instrument(skip(self, draft))]
    pub async fn add_comment(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        draft: CommentDraft,
    ) -> Result<Comment, DomainError> {
        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(DomainError::PostNotFound(post_id));
        }
        self.comments
            .create(Comment::new(post_id, author_id, draft.text))
            .await
    }

    /// Comments are addressed through their post; a comment that belongs to
    /// another post is reported missing.
    pub async fn comment_for_author(
        &self,
        requester: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Access<CommentDetails>, DomainError> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .filter(|c| c.comment.post_id == post_id)
            .ok_or(DomainError::CommentNotFound(comment_id))?;

        let author_id = comment.comment.author_id;
        Ok(author_only(requester, author_id, comment))
    }

    #[instrument(skip(self, draft))]
    pub async fn update_comment(
        &self,
        comment_id: Uuid,
        draft: CommentDraft,
    ) -> Result<Comment, DomainError> {
        self.comments.update_text(comment_id, &draft.text).await
    }

    #[instrument(skip(self))]
    pub async fn delete_comment(&self, comment_id: Uuid) -> Result<(), DomainError> {
        self.comments.delete(comment_id).await
    }
}
