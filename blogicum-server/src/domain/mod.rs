pub mod category;
pub mod comment;
pub mod error;
pub mod location;
pub mod post;
pub mod user;
pub mod visibility;
