//! Feed post cache: posts on screen plus a small queue of prefetched ones

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::models::Post;
use super::source::ContentSource;
use crate::config::FeedConfig;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatus {
    pub displayed: usize,
    pub queued: usize,
    pub has_more: bool,
}

/// Owned by the application and cleared only by [`PostCache::refetch`]
pub struct PostCache {
    source: Arc<dyn ContentSource>,
    config: FeedConfig,
    displayed: Vec<Post>,
    queue: VecDeque<Post>,
    seen: HashSet<String>,
    has_more: bool,
    loading: bool,
    error: Option<String>,
}

impl PostCache {
    pub fn new(source: Arc<dyn ContentSource>, config: FeedConfig) -> Self {
        Self {
            source,
            config,
            displayed: Vec::new(),
            queue: VecDeque::new(),
            seen: HashSet::new(),
            has_more: true,
            loading: false,
            error: None,
        }
    }

    pub fn source(&self) -> &Arc<dyn ContentSource> {
        &self.source
    }

    pub fn displayed(&self) -> &[Post] {
        &self.displayed
    }

    pub fn queued(&self) -> impl Iterator<Item = &Post> {
        self.queue.iter()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed initial load
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status(&self) -> CacheStatus {
        CacheStatus {
            displayed: self.displayed.len(),
            queued: self.queue.len(),
            has_more: self.has_more,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Post> {
        self.displayed
            .iter()
            .chain(self.queue.iter())
            .find(|p| p.id == id)
    }

    /// Keep only posts not handed out before
    fn filter_new(&mut self, posts: Vec<Post>) -> Vec<Post> {
        posts
            .into_iter()
            .filter(|p| self.seen.insert(p.id.clone()))
            .collect()
    }

    /// Load the first screen plus a full queue
    pub async fn initialize(&mut self) -> Result<()> {
        let wanted = self.config.initial_display_count + self.config.cache_size;
        self.loading = true;
        self.error = None;

        let result = self.source.fetch_posts(wanted).await;
        self.loading = false;

        let posts = match result {
            Ok(posts) => posts,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e);
            }
        };

        let fetched = posts.len();
        let mut fresh = self.filter_new(posts);
        let split = fresh.len().min(self.config.initial_display_count);
        let queued = fresh.split_off(split);
        self.displayed = fresh;
        self.queue = queued.into();
        self.has_more = fetched >= wanted;

        info!(
            displayed = self.displayed.len(),
            queued = self.queue.len(),
            has_more = self.has_more,
            "Post cache initialized"
        );
        Ok(())
    }

    /// Top up the queue with one batch. Failures are logged and swallowed.
    pub async fn refill(&mut self) {
        if self.loading || !self.has_more {
            return;
        }
        self.loading = true;
        let batch = self.config.fetch_batch_size;
        let result = self.source.fetch_posts(batch).await;
        self.loading = false;

        match result {
            Ok(posts) => {
                let fetched = posts.len();
                let fresh = self.filter_new(posts);
                debug!(fetched, fresh = fresh.len(), "Refilled post queue");
                self.queue.extend(fresh);
                if fetched < batch {
                    self.has_more = false;
                }
            }
            Err(e) => warn!(error = %e, "Post queue refill failed"),
        }
    }

    async fn refill_if_low(&mut self) {
        if self.queue.len() < self.config.refill_threshold {
            self.refill().await;
        }
    }

    pub async fn consume_many(&mut self, count: usize) -> Vec<Post> {
        let take = count.min(self.queue.len());
        if take == 0 {
            return Vec::new();
        }
        let consumed: Vec<Post> = self.queue.drain(..take).collect();
        self.displayed.extend(consumed.iter().cloned());
        self.refill_if_low().await;
        consumed
    }

    /// Forget everything and load from scratch
    pub async fn refetch(&mut self) -> Result<()> {
        self.seen.clear();
        self.displayed.clear();
        self.queue.clear();
        self.has_more = true;
        self.initialize().await
    }

    pub fn update_local_like(&mut self, id: &str, is_liked: bool, likes: u32) {
        for post in self.displayed.iter_mut().chain(self.queue.iter_mut()) {
            if post.id == id {
                post.engagement.is_liked = is_liked;
                post.engagement.likes = likes;
            }
        }
    }

}
