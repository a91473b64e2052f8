use crate::domain::category::CategorySummary;
use crate::domain::error::DomainError;
use crate::domain::location::LocationSummary;
use crate::domain::post::{AuthorSummary, Post, PostDetails};
use crate::domain::visibility::PostFilter;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: Post) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    async fn find_details(
        &self,
        id: Uuid,
        filter: &PostFilter,
    ) -> Result<Option<PostDetails>, DomainError>;
    async fn count(&self, filter: &PostFilter) -> Result<u64, DomainError>;
    /// Annotated listing, newest `pub_date` first.
    async fn list(
        &self,
        filter: &PostFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PostDetails>, DomainError>;
    async fn update(&self, post: Post) -> Result<Post, DomainError>;
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const DETAILS_SELECT: &str = r#"
    SELECT p.id, p.title, p.text, p.pub_date, p.author_id, p.category_id, p.location_id,
           p.image, p.is_published, p.created_at,
           u.username AS author_username,
           c.title AS category_title, c.slug AS category_slug,
           c.is_published AS category_is_published,
           l.name AS location_name, l.is_published AS location_is_published,
           COUNT(cm.id) AS comment_count
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
    LEFT JOIN comments cm ON cm.post_id = p.id
"#;

// Mirrors domain::visibility::is_publicly_visible. A NULL category makes the
// conjunction NULL, which filters the row out.
const FILTER_CLAUSE: &str = r#"
    ($1::uuid IS NULL OR p.author_id = $1)
    AND ($2::uuid IS NULL OR p.category_id = $2)
    AND ($3::timestamptz IS NULL
         OR (p.is_published AND c.is_published AND p.pub_date <= $3))
"#;

const GROUP_BY: &str = "GROUP BY p.id, u.id, c.id, l.id";

#[derive(FromRow)]
struct PostDetailsRow {
    #[sqlx(flatten)]
    post: Post,
    author_username: String,
    category_title: Option<String>,
    category_slug: Option<String>,
    category_is_published: Option<bool>,
    location_name: Option<String>,
    location_is_published: Option<bool>,
    comment_count: i64,
}

impl From<PostDetailsRow> for PostDetails {
    fn from(row: PostDetailsRow) -> Self {
        let category = match (
            row.post.category_id,
            row.category_title,
            row.category_slug,
            row.category_is_published,
        ) {
            (Some(id), Some(title), Some(slug), Some(is_published)) => Some(CategorySummary {
                id,
                title,
                slug,
                is_published,
            }),
            _ => None,
        };
        let location = match (
            row.post.location_id,
            row.location_name,
            row.location_is_published,
        ) {
            (Some(id), Some(name), Some(is_published)) => Some(LocationSummary {
                id,
                name,
                is_published,
            }),
            _ => None,
        };

        PostDetails {
            author: AuthorSummary {
                id: row.post.author_id,
                username: row.author_username,
            },
            post: row.post,
            category,
            location,
            comment_count: row.comment_count,
        }
    }
}

fn bind_filter<'q, O>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    filter: &PostFilter,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    query
        .bind(filter.author_id)
        .bind(filter.category_id)
        .bind(filter.visible_at)
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, title, text, pub_date, author_id, category_id, location_id,
                               image, is_published, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.text)
        .bind(post.pub_date)
        .bind(post.author_id)
        .bind(post.category_id)
        .bind(post.location_id)
        .bind(&post.image)
        .bind(post.is_published)
        .bind(post.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create post: {}", e);
            DomainError::from(e)
        })?;

        info!(post_id = %post.id, author_id = %post.author_id, "post created");
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, text, pub_date, author_id, category_id, location_id,
                   image, is_published, created_at
            FROM posts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error find_by_id {}: {}", id, e);
            DomainError::from(e)
        })
    }

    async fn find_details(
        &self,
        id: Uuid,
        filter: &PostFilter,
    ) -> Result<Option<PostDetails>, DomainError> {
        let sql = format!("{DETAILS_SELECT} WHERE p.id = $4 AND {FILTER_CLAUSE} {GROUP_BY}");
        let row = bind_filter(sqlx::query_as::<_, PostDetailsRow>(&sql), filter)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("db error find_details {}: {}", id, e);
                DomainError::from(e)
            })?;

        Ok(row.map(PostDetails::from))
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, DomainError> {
        let sql = format!(
            "SELECT COUNT(*) FROM posts p \
             LEFT JOIN categories c ON c.id = p.category_id \
             WHERE {FILTER_CLAUSE}"
        );
        let (count,): (i64,) = bind_filter(sqlx::query_as(&sql), filter)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("db error while counting posts: {}", e);
                DomainError::from(e)
            })?;

        Ok(count.max(0) as u64)
    }

    async fn list(
        &self,
        filter: &PostFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PostDetails>, DomainError> {
        let sql = format!(
            "{DETAILS_SELECT} WHERE {FILTER_CLAUSE} {GROUP_BY} \
             ORDER BY p.pub_date DESC, p.id \
             LIMIT $4 OFFSET $5"
        );
        let rows = bind_filter(sqlx::query_as::<_, PostDetailsRow>(&sql), filter)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("db error while fetching posts: {}", e);
                DomainError::from(e)
            })?;

        Ok(rows.into_iter().map(PostDetails::from).collect())
    }

    async fn update(&self, post: Post) -> Result<Post, DomainError> {
        let updated = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $1,
                text = $2,
                pub_date = $3,
                category_id = $4,
                location_id = $5,
                image = $6,
                is_published = $7
            WHERE id = $8
            RETURNING id, title, text, pub_date, author_id, category_id, location_id,
                      image, is_published, created_at
            "#,
        )
        .bind(&post.title)
        .bind(&post.text)
        .bind(post.pub_date)
        .bind(post.category_id)
        .bind(post.location_id)
        .bind(&post.image)
        .bind(post.is_published)
        .bind(post.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to update post {}: {}", post.id, e);
            DomainError::from(e)
        })?
        .ok_or(DomainError::PostNotFound(post.id))?;

        info!(post_id = %updated.id, "post updated");
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to delete post {}: {}", id, e);
                DomainError::from(e)
            })?;

        if deleted.rows_affected() == 0 {
            return Err(DomainError::PostNotFound(id));
        }

        info!(post_id = %id, "post deleted");
        Ok(())
    }
}
