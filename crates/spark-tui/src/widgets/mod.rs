mod feed_list;
mod reader;
mod status_bar;

pub use feed_list::{format_age, FeedListWidget};
pub use reader::{ReaderLayout, ReaderWidget};
pub use status_bar::StatusBarWidget;
