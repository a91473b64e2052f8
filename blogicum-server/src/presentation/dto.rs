use crate::application::pagination::Page;
use crate::domain::category::Category;
use crate::domain::comment::CommentDetails;
use crate::domain::post::{Post, PostDetails};
use crate::domain::user::User;
use crate::presentation::forms::{CommentForm, FormContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ======================= AUTH =======================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(rename = "token_type")]
    pub token_type: String, // "Bearer"
}

// ======================= TEMPLATE CONTEXTS =======================

#[derive(Debug, Serialize)]
pub struct IndexContext {
    pub page_obj: Page<PostDetails>,
}

#[derive(Debug, Serialize)]
pub struct PostDetailContext {
    pub post: PostDetails,
    pub comments: Vec<CommentDetails>,
    pub form: FormContext<CommentForm>,
}

#[derive(Debug, Serialize)]
pub struct CategoryContext {
    pub category: Category,
    pub page_obj: Page<PostDetails>,
}

#[derive(Debug, Serialize)]
pub struct ProfileContext {
    pub profile: User,
    pub page_obj: Page<PostDetails>,
}

/// Post create/edit and profile edit pages only carry a form.
#[derive(Debug, Serialize)]
pub struct FormPageContext<T> {
    pub form: FormContext<T>,
}

#[derive(Debug, Serialize)]
pub struct PostDeleteContext {
    pub post: Post,
}

/// Comment edit (with `form`) and delete confirmation (without).
#[derive(Debug, Serialize)]
pub struct CommentContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<FormContext<CommentForm>>,
    pub comment: CommentDetails,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}
