use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::LayoutConfig;
use crate::content::{IdGenerator, Page};
use crate::post::Post;

/// Page lists derived once per post id and reused for the reader's lifetime
#[derive(Debug, Default)]
pub struct PageMemo {
    pages: HashMap<String, Arc<Vec<Page>>>,
}

impl PageMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_resolve(
        &mut self,
        post: &Post,
        layout: &LayoutConfig,
        ids: &dyn IdGenerator,
    ) -> Arc<Vec<Page>> {
        if let Some(pages) = self.pages.get(&post.id) {
            return Arc::clone(pages);
        }
        let pages = Arc::new(post.resolve_pages(layout, ids));
        debug!(post = %post.id, pages = pages.len(), "Resolved post pages");
        self.pages.insert(post.id.clone(), Arc::clone(&pages));
        pages
    }

    /// Forget the pages of one post; returns whether any were cached
    pub fn invalidate(&mut self, post_id: &str) -> bool {
        self.pages.remove(post_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::SequentialIds;

    #[test]
    fn test_pages_are_resolved_once() {
        let ids = SequentialIds::new("b");
        let layout = LayoutConfig::default();
        let post = Post::from_description("p1", "t", "One.\n---\nTwo.");
        let mut memo = PageMemo::new();

        let first = memo.get_or_resolve(&post, &layout, &ids);
        let second = memo.get_or_resolve(&post, &layout, &ids);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(memo.len(), 1);

        assert!(memo.invalidate("p1"));
        assert!(!memo.invalidate("p1"));
        assert!(memo.is_empty());
        let third = memo.get_or_resolve(&post, &layout, &ids);
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(first[0].blocks[0].kind, third[0].blocks[0].kind);
    }
}
