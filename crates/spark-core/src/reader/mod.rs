//! Paged reading: page and post navigation driven by gestures

pub mod boundary;
pub mod page_nav;
pub mod pages;
pub mod post_nav;
pub mod session;

pub use boundary::{BoundaryDetector, Intent, ScrollMetrics};
pub use page_nav::{Direction, ExitingPage, NavState, PageNavigator, ScrollRestore};
pub use pages::PageMemo;
pub use post_nav::{PostNavigator, SlideDirection};
pub use session::{FeedReader, Gesture, ReaderEvent, ReaderSession, ReaderSettings};
