use crate::domain::comment::{Comment, CommentDetails};
use crate::domain::error::DomainError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: Comment) -> Result<Comment, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CommentDetails>, DomainError>;
    /// Oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentDetails>, DomainError>;
    async fn update_text(&self, id: Uuid, text: &str) -> Result<Comment, DomainError>;
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}

#[derive(Clone)]
pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, comment: Comment) -> Result<Comment, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, text, post_id, author_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(comment.id)
        .bind(&comment.text)
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create comment: {}", e);
            DomainError::from(e)
        })?;

        info!(comment_id = %comment.id, post_id = %comment.post_id, "comment created");
        Ok(comment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CommentDetails>, DomainError> {
        sqlx::query_as::<_, CommentDetails>(
            r#"
            SELECT cm.id, cm.text, cm.post_id, cm.author_id, cm.created_at,
                   u.username AS author_username
            FROM comments cm
            JOIN users u ON u.id = cm.author_id
            WHERE cm.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to find comment {}: {}", id, e);
            DomainError::from(e)
        })
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentDetails>, DomainError> {
        sqlx::query_as::<_, CommentDetails>(
            r#"
            SELECT cm.id, cm.text, cm.post_id, cm.author_id, cm.created_at,
                   u.username AS author_username
            FROM comments cm
            JOIN users u ON u.id = cm.author_id
            WHERE cm.post_id = $1
            ORDER BY cm.created_at, cm.id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to list comments of post {}: {}", post_id, e);
            DomainError::from(e)
        })
    }

    async fn update_text(&self, id: Uuid, text: &str) -> Result<Comment, DomainError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments SET text = $1
            WHERE id = $2
            RETURNING id, text, post_id, author_id, created_at
            "#,
        )
        .bind(text)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to update comment {}: {}", id, e);
            DomainError::from(e)
        })?
        .ok_or(DomainError::CommentNotFound(id))?;

        info!(comment_id = %id, "comment updated");
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let deleted = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to delete comment {}: {}", id, e);
                DomainError::from(e)
            })?;

        if deleted.rows_affected() == 0 {
            return Err(DomainError::CommentNotFound(id));
        }

        info!(comment_id = %id, "comment deleted");
        Ok(())
    }
}
