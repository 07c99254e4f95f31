//! Reader session: one open post plus the gesture routing around it

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use super::boundary::{BoundaryDetector, Intent, ScrollMetrics};
use super::page_nav::{Direction, PageNavigator, ScrollRestore};
use super::pages::PageMemo;
use super::post_nav::{PostNavigator, SlideDirection};
use crate::config::{AppConfig, GestureConfig, LayoutConfig};
use crate::content::{IdGenerator, Page};
use crate::post::Post;

/// The slice of configuration the reader needs
#[derive(Debug, Clone)]
pub struct ReaderSettings {
    pub layout: LayoutConfig,
    pub gestures: GestureConfig,
    pub page_transition: Duration,
    pub post_transition: Duration,
    pub header_compact_offset: f32,
}

impl ReaderSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            layout: config.layout.clone(),
            gestures: config.gestures.clone(),
            page_transition: config.animation.page_transition(),
            post_transition: config.animation.post_transition(),
            header_compact_offset: config.ui.header_compact_offset as f32,
        }
    }
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Raw input, in the units of the scrollable content
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Wheel delta; positive `dy` scrolls down, positive `dx` scrolls right
    Wheel { dx: f32, dy: f32 },
    TouchStart { x: f32, y: f32 },
    TouchEnd { x: f32, y: f32 },
    Scroll { offset: f32 },
    Resize { content: f32, viewport: f32 },
}

/// Accepted transitions, for signals and the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderEvent {
    PageChanged {
        post_id: String,
        page: usize,
        total: usize,
        direction: Direction,
    },
    PostChanged {
        post_id: String,
        index: usize,
        slide: SlideDirection,
    },
}

/// Navigation state of one open post
#[derive(Debug, Clone)]
pub struct ReaderSession {
    post_id: String,
    pages: Arc<Vec<Page>>,
    nav: PageNavigator,
    detector: BoundaryDetector,
    footer_clearance: u32,
    header_compact_offset: f32,
    pending_entry: bool,
    header_compact: bool,
}

impl ReaderSession {
    pub fn new(post_id: impl Into<String>, pages: Arc<Vec<Page>>, settings: &ReaderSettings) -> Self {
        let pages = if pages.is_empty() {
            Arc::new(vec![Page {
                id: String::new(),
                blocks: Vec::new(),
            }])
        } else {
            pages
        };
        let mut session = Self {
            post_id: post_id.into(),
            nav: PageNavigator::new(pages.len(), settings.page_transition),
            pages,
            detector: BoundaryDetector::new(settings.gestures.clone()),
            footer_clearance: settings.layout.footer_clearance,
            header_compact_offset: settings.header_compact_offset,
            pending_entry: true,
            header_compact: false,
        };
        session.sync_detector();
        session
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn navigator(&self) -> &PageNavigator {
        &self.nav
    }

    pub fn active_index(&self) -> usize {
        self.nav.active_page()
    }

    pub fn active_page(&self) -> &Page {
        &self.pages[self.nav.active_page()]
    }

    /// Page leaving the screen and how its scroll view is pinned meanwhile
    pub fn exiting(&self) -> Option<(&Page, ScrollRestore)> {
        self.nav
            .exiting()
            .and_then(|exit| self.pages.get(exit.index).map(|page| (page, exit.scroll)))
    }

    pub fn direction(&self) -> Direction {
        self.nav.direction()
    }

    pub fn transition_progress(&self, now: Instant) -> Option<f64> {
        self.nav.transition_progress(now)
    }

    pub fn is_last_page(&self) -> bool {
        !self.nav.has_next()
    }

    pub fn progress(&self) -> f64 {
        self.nav.progress()
    }

    /// `"2 / 5"`, only for multi-page posts
    pub fn page_indicator(&self) -> Option<String> {
        (self.pages.len() > 1)
            .then(|| format!("{} / {}", self.nav.active_page() + 1, self.pages.len()))
    }

    /// The header shrinks once the first page is scrolled, and stays small after it
    pub fn header_compact(&self) -> bool {
        self.header_compact
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.detector.metrics()
    }

    pub fn scroll_offset(&self) -> f32 {
        self.detector.metrics().offset
    }

    fn sync_detector(&mut self) {
        self.detector.set_active(!self.nav.is_transitioning());
        self.detector
            .set_neighbors(self.nav.has_prev(), self.nav.has_next());
    }

    fn update_header(&mut self) {
        self.header_compact = if self.nav.active_page() == 0 {
            self.detector.metrics().offset > self.header_compact_offset
        } else {
            true
        };
    }

    fn page_event(&self) -> ReaderEvent {
        ReaderEvent::PageChanged {
            post_id: self.post_id.clone(),
            page: self.nav.active_page(),
            total: self.pages.len(),
            direction: self.nav.direction(),
        }
    }

    fn after_page_change(&mut self) -> ReaderEvent {
        self.pending_entry = true;
        self.sync_detector();
        self.update_header();
        self.page_event()
    }

    pub fn next_page(&mut self, now: Instant) -> Option<ReaderEvent> {
        self.nav.next(now).then(|| self.after_page_change())
    }

    pub fn prev_page(&mut self, now: Instant) -> Option<ReaderEvent> {
        self.nav.prev(now).then(|| self.after_page_change())
    }

    /// Settle an expired page transition
    pub fn poll(&mut self, now: Instant) -> bool {
        let resolved = self.nav.poll(now);
        if resolved {
            self.sync_detector();
        }
        resolved
    }

    pub fn on_scroll(&mut self, offset: f32) {
        self.detector.on_scroll(offset);
        self.update_header();
    }

    /// New geometry for the active page; a freshly entered page is positioned here
    pub fn on_resize(&mut self, content: f32, viewport: f32) {
        self.detector.on_resize(content, viewport);
        if self.pending_entry && viewport > 0.0 {
            self.pending_entry = false;
            let offset = self.nav.entry_scroll().offset(
                content.max(0.0) as u32,
                viewport as u32,
                self.footer_clearance,
            );
            self.detector.on_scroll(offset as f32);
        }
        self.update_header();
    }

    pub fn on_wheel(&mut self, dy: f32, now: Instant) -> Option<ReaderEvent> {
        self.poll(now);
        match self.detector.on_wheel(dy, now)? {
            Intent::Next => self.next_page(now),
            Intent::Prev => self.prev_page(now),
        }
    }

    pub fn on_touch_start(&mut self, y: f32) {
        self.detector.on_touch_start(y);
    }

    pub fn on_touch_end(&mut self, y: f32, now: Instant) -> Option<ReaderEvent> {
        self.poll(now);
        match self.detector.on_touch_end(y, now)? {
            Intent::Next => self.next_page(now),
            Intent::Prev => self.prev_page(now),
        }
    }

    pub fn cancel_touch(&mut self) {
        self.detector.cancel_touch();
    }
}

/// The feed-level reader: which post is open and how gestures reach it
pub struct FeedReader {
    settings: ReaderSettings,
    ids: Arc<dyn IdGenerator>,
    posts: Vec<Post>,
    post_nav: PostNavigator,
    memo: PageMemo,
    session: Option<ReaderSession>,
    touch_start: Option<(f32, f32)>,
}

impl FeedReader {
    pub fn new(posts: Vec<Post>, settings: ReaderSettings, ids: Arc<dyn IdGenerator>) -> Self {
        let post_ids = posts.iter().map(|p| p.id.clone()).collect();
        Self {
            post_nav: PostNavigator::new(
                post_ids,
                settings.gestures.clone(),
                settings.post_transition,
            ),
            settings,
            ids,
            posts,
            memo: PageMemo::new(),
            session: None,
            touch_start: None,
        }
    }

    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Replace the feed. The open post stays open if it is still in the feed.
    ///
    /// Cached pages of posts that left the feed or whose content changed are
    /// dropped; the ids of those posts are returned.
    pub fn set_posts(&mut self, posts: Vec<Post>) -> Vec<String> {
        let stale: Vec<String> = self
            .posts
            .iter()
            .filter(|old| {
                posts.iter().find(|p| p.id == old.id).map_or(true, |new| {
                    new.body != old.body
                        || new.cover_image != old.cover_image
                        || new.inline_images != old.inline_images
                })
            })
            .map(|old| old.id.clone())
            .collect();
        for id in &stale {
            if self.memo.invalidate(id) {
                debug!(post = %id, "Dropped cached pages");
            }
        }

        self.post_nav
            .set_posts(posts.iter().map(|p| p.id.clone()).collect());
        let still_there = self
            .session
            .as_ref()
            .is_some_and(|s| posts.iter().any(|p| p.id == s.post_id()));
        if !still_there {
            self.close();
        }
        self.posts = posts;
        stale
    }

    /// Swap in an updated copy of a post (e.g. after a like)
    pub fn update_post(&mut self, post: Post) {
        if let Some(slot) = self.posts.iter_mut().find(|p| p.id == post.id) {
            *slot = post;
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&ReaderSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut ReaderSession> {
        self.session.as_mut()
    }

    pub fn current_index(&self) -> usize {
        self.post_nav.current_index()
    }

    pub fn current_post(&self) -> Option<&Post> {
        self.posts.get(self.post_nav.current_index())
    }

    pub fn post_navigator(&self) -> &PostNavigator {
        &self.post_nav
    }

    pub fn slide(&self, now: Instant) -> SlideDirection {
        self.post_nav.slide(now)
    }

    fn start_session(&mut self) -> Option<ReaderEvent> {
        let index = self.post_nav.current_index();
        let post = self.posts.get(index)?;
        let pages = self
            .memo
            .get_or_resolve(post, &self.settings.layout, self.ids.as_ref());
        debug!(post = %post.id, index, pages = pages.len(), "Opening post");
        self.session = Some(ReaderSession::new(post.id.clone(), pages, &self.settings));
        Some(ReaderEvent::PostChanged {
            post_id: post.id.clone(),
            index,
            slide: self.post_nav.slide_direction(),
        })
    }

    /// Open the post at `index` of the feed
    pub fn open(&mut self, index: usize, now: Instant) -> Option<ReaderEvent> {
        self.post_nav.select(index, now)?;
        self.start_session()
    }

    /// Closing drops all navigation state of the open post
    pub fn close(&mut self) {
        self.session = None;
        self.touch_start = None;
    }

    fn after_post_switch(&mut self, switched: Option<usize>) -> Option<ReaderEvent> {
        switched?;
        self.start_session()
    }

    pub fn next_post(&mut self, now: Instant) -> Option<ReaderEvent> {
        if !self.is_open() {
            return None;
        }
        let switched = self.post_nav.next(now);
        self.after_post_switch(switched)
    }

    pub fn prev_post(&mut self, now: Instant) -> Option<ReaderEvent> {
        if !self.is_open() {
            return None;
        }
        let switched = self.post_nav.prev(now);
        self.after_post_switch(switched)
    }

    pub fn next_page(&mut self, now: Instant) -> Option<ReaderEvent> {
        self.session.as_mut()?.next_page(now)
    }

    pub fn prev_page(&mut self, now: Instant) -> Option<ReaderEvent> {
        self.session.as_mut()?.prev_page(now)
    }

    pub fn poll(&mut self, now: Instant) {
        self.post_nav.poll(now);
        if let Some(session) = self.session.as_mut() {
            session.poll(now);
        }
    }

    /// Route one gesture to the post navigator or the open page
    pub fn handle(&mut self, gesture: Gesture, now: Instant) -> Option<ReaderEvent> {
        if self.session.is_none() {
            self.touch_start = None;
            return None;
        }

        match gesture {
            Gesture::Wheel { dx, dy } => {
                if self.post_nav.is_horizontal_wheel(dx, dy) {
                    let switched = self.post_nav.on_wheel(dx, dy, now);
                    return self.after_post_switch(switched);
                }
                self.session.as_mut()?.on_wheel(dy, now)
            }
            Gesture::TouchStart { x, y } => {
                self.touch_start = Some((x, y));
                self.post_nav.on_touch_start(x, y);
                self.session.as_mut()?.on_touch_start(y);
                None
            }
            Gesture::TouchEnd { x, y } => {
                let horizontal = self
                    .touch_start
                    .take()
                    .is_some_and(|(sx, sy)| self.post_nav.is_horizontal_swipe(sx - x, sy - y));
                let switched = self.post_nav.on_touch_end(x, y, now);
                if horizontal {
                    self.session.as_mut()?.cancel_touch();
                    return self.after_post_switch(switched);
                }
                self.session.as_mut()?.on_touch_end(y, now)
            }
            Gesture::Scroll { offset } => {
                self.session.as_mut()?.on_scroll(offset);
                None
            }
            Gesture::Resize { content, viewport } => {
                self.session.as_mut()?.on_resize(content, viewport);
                None
            }
        }
    }
}
