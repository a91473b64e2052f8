pub mod access;
pub mod auth_service;
pub mod comment_service;
pub mod pagination;
pub mod post_service;
pub mod profile_service;
