pub mod config;
pub mod content;
pub mod error;
pub mod post;
pub mod reader;
pub mod signal;

pub use config::{AppConfig, EasingType};
pub use error::{Error, Result};
pub use post::Post;
