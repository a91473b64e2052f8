pub mod category_repository;
pub mod comment_repository;
pub mod location_repository;
#[cfg(test)]
pub mod memory;
pub mod post_repository;
pub mod user_repository;
