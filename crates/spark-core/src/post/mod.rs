pub mod api;
pub mod cache;
pub mod images;
pub mod models;
pub mod source;

pub use api::{ApiBlock, ApiImage, ApiPage, ApiPost};
pub use cache::{CacheStatus, PostCache};
pub use images::{ImageResolver, InlineImageResolver};
pub use models::{Engagement, InlineImage, Post, PostBody, UserRef};
pub use source::{ContentSource, FileSource, HttpSource};
