use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use spark_core::content::UuidIds;
use spark_core::post::InlineImageResolver;
use spark_core::reader::{FeedReader, Gesture, ReaderEvent, ReaderSettings, ScrollRestore};
use spark_core::signal::{Signal, SignalTracker};
use spark_core::{AppConfig, Post};
use tracing::debug;
use url::Url;

use crate::input::{mouse_gesture, Action, CellGeometry};
use crate::render::{PageRenderer, RenderedPage};
use crate::theme::Theme;

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Feed,
    Reader,
}

/// Work the main loop has to do asynchronously after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Reload the feed from scratch
    Refresh,
    /// Persist a like toggle in the post cache
    Like {
        post_id: String,
        liked: bool,
        likes: u32,
    },
}

/// Terminal geometry of the reader body, in rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderViewport {
    pub area: Rect,
    pub scroll: u16,
}

/// Application state
pub struct App {
    pub config: Arc<AppConfig>,
    pub theme: Theme,
    pub reader: FeedReader,
    pub signals: SignalTracker,
    pub screen: Screen,
    /// Selected row of the feed list
    pub selected: usize,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub is_loading: bool,
    pub has_more: bool,
    pub viewport: ReaderViewport,
    geometry: CellGeometry,
    resolver: InlineImageResolver,
    /// Rendered pages of the open post, keyed by page index
    rendered: HashMap<usize, RenderedPage>,
    rendered_for: Option<(String, u16)>,
    outbox: Vec<Signal>,
}

impl App {
    pub fn new(config: Arc<AppConfig>, theme: Theme) -> Self {
        let settings = ReaderSettings::from_config(&config);
        let geometry = CellGeometry::from_layout(&config.layout);
        let resolver = InlineImageResolver::new(Url::parse(&config.api.base_url).ok());
        Self {
            reader: FeedReader::new(Vec::new(), settings, Arc::new(UuidIds)),
            config,
            theme,
            signals: SignalTracker::new(),
            screen: Screen::Feed,
            selected: 0,
            should_quit: false,
            status_message: None,
            is_loading: true,
            has_more: true,
            viewport: ReaderViewport::default(),
            geometry,
            resolver,
            rendered: HashMap::new(),
            rendered_for: None,
            outbox: Vec::new(),
        }
    }

    pub fn posts(&self) -> &[Post] {
        self.reader.posts()
    }

    /// Install a freshly loaded feed
    pub fn set_posts(&mut self, posts: Vec<Post>, has_more: bool) {
        // Changed content means a new page count, so read progress starts over
        for id in self.reader.set_posts(posts) {
            self.signals.reset_progress(&id);
        }
        self.has_more = has_more;
        self.is_loading = false;
        self.selected = self.selected.min(self.posts().len().saturating_sub(1));
        if self.screen == Screen::Reader && !self.reader.is_open() {
            self.screen = Screen::Feed;
        }
    }

    pub fn selected_post(&self) -> Option<&Post> {
        self.posts().get(self.selected)
    }

    /// Post the actions apply to: the open one, or the selected row
    pub fn focused_post(&self) -> Option<&Post> {
        match self.screen {
            Screen::Reader => self.reader.current_post(),
            Screen::Feed => self.selected_post(),
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Whether the feed is close enough to its end to pull more posts
    pub fn wants_more(&self) -> bool {
        if self.is_loading || !self.has_more {
            return false;
        }
        let position = match self.screen {
            Screen::Feed => self.selected,
            Screen::Reader => self.reader.current_index(),
        };
        position + 3 >= self.posts().len()
    }

    /// Signals produced since the last call
    pub fn take_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.outbox)
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        let page = self
            .reader
            .session()
            .and_then(|s| s.transition_progress(now))
            .is_some();
        page || self.reader.post_navigator().slide_progress(now).is_some()
    }

    pub fn tick(&mut self, now: Instant) {
        self.reader.poll(now);
    }

    pub fn handle_action(&mut self, action: Action, now: Instant) -> Option<Effect> {
        if action != Action::None {
            self.clear_status();
        }
        match (self.screen, action) {
            (_, Action::Quit) => self.should_quit = true,
            (_, Action::Refresh) => {
                self.is_loading = true;
                self.set_status("Refreshing...");
                return Some(Effect::Refresh);
            }
            (_, Action::ToggleLike) => return self.toggle_like(),
            (_, Action::ToggleSaved) => self.toggle_saved(),

            (Screen::Feed, Action::MoveDown) => self.move_selection(1),
            (Screen::Feed, Action::MoveUp) => self.move_selection(-1),
            (Screen::Feed, Action::ScrollHalfPageDown) => self.move_selection(5),
            (Screen::Feed, Action::ScrollHalfPageUp) => self.move_selection(-5),
            (Screen::Feed, Action::Select) => self.open_selected(now),

            (Screen::Reader, Action::MoveDown) => self.wheel(0.0, self.geometry.row_px, now),
            (Screen::Reader, Action::MoveUp) => self.wheel(0.0, -self.geometry.row_px, now),
            (Screen::Reader, Action::ScrollHalfPageDown) => {
                self.scroll_rows(i32::from(self.viewport.area.height / 2), now)
            }
            (Screen::Reader, Action::ScrollHalfPageUp) => {
                self.scroll_rows(-i32::from(self.viewport.area.height / 2), now)
            }
            (Screen::Reader, Action::Close) => self.close_reader(),
            (Screen::Reader, Action::NextPage) => {
                let event = self.reader.next_page(now);
                self.on_reader_event(event);
            }
            (Screen::Reader, Action::PrevPage) => {
                let event = self.reader.prev_page(now);
                self.on_reader_event(event);
            }
            (Screen::Reader, Action::NextPost) => {
                let event = self.reader.next_post(now);
                self.on_reader_event(event);
            }
            (Screen::Reader, Action::PrevPost) => {
                let event = self.reader.prev_post(now);
                self.on_reader_event(event);
            }
            _ => {}
        }
        None
    }

    pub fn move_selection(&mut self, delta: isize) {
        let last = self.posts().len().saturating_sub(1);
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    pub fn open_selected(&mut self, now: Instant) {
        let event = self.reader.open(self.selected, now);
        if event.is_some() {
            self.screen = Screen::Reader;
        }
        self.on_reader_event(event);
    }

    pub fn close_reader(&mut self) {
        self.selected = self.reader.current_index();
        self.reader.close();
        self.rendered.clear();
        self.rendered_for = None;
        self.screen = Screen::Feed;
    }

    /// Mouse input: footer button clicks, then gestures
    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        if mouse.kind == MouseEventKind::Down(MouseButton::Left) && self.footer_hit(mouse.column, mouse.row) {
            let event = self.reader.next_page(now);
            self.on_reader_event(event);
            return;
        }
        if let Some(gesture) = mouse_gesture(&mouse, self.geometry, self.config.ui.wheel_step) {
            self.handle_gesture(gesture, now);
        }
    }

    pub fn handle_gesture(&mut self, gesture: Gesture, now: Instant) {
        if self.screen == Screen::Feed {
            if let Gesture::Wheel { dy, .. } = gesture {
                if dy > 0.0 {
                    self.move_selection(1);
                } else if dy < 0.0 {
                    self.move_selection(-1);
                }
            }
            return;
        }
        match gesture {
            Gesture::Wheel { dx, dy } => self.wheel(dx, dy, now),
            other => {
                let event = self.reader.handle(other, now);
                self.on_reader_event(event);
            }
        }
    }

    /// A wheel delta first goes to the navigators; if neither takes it, the page scrolls
    fn wheel(&mut self, dx: f32, dy: f32, now: Instant) {
        let event = self.reader.handle(Gesture::Wheel { dx, dy }, now);
        if event.is_some() {
            self.on_reader_event(event);
        } else if dy.abs() >= dx.abs() {
            let rows = i32::from(self.geometry.px_to_rows(dy.abs())).max(1);
            self.scroll_rows(if dy > 0.0 { rows } else { -rows }, now);
        }
    }

    fn scroll_rows(&mut self, delta: i32, now: Instant) {
        let max = self.max_scroll();
        let target = (i32::from(self.viewport.scroll) + delta).clamp(0, i32::from(max));
        self.viewport.scroll = u16::try_from(target).unwrap_or(max);
        let offset = self.geometry.rows_to_px(self.viewport.scroll);
        // Scroll gestures never produce events
        let _ = self.reader.handle(Gesture::Scroll { offset }, now);
    }

    fn max_scroll(&self) -> u16 {
        let content = self
            .reader
            .session()
            .and_then(|s| self.rendered.get(&s.active_index()))
            .map_or(0, RenderedPage::height);
        rows(content).saturating_sub(self.viewport.area.height)
    }

    fn on_reader_event(&mut self, event: Option<ReaderEvent>) {
        let Some(event) = event else {
            return;
        };
        debug!(?event, "Reader event");
        match event {
            ReaderEvent::PageChanged {
                post_id,
                page,
                total,
                ..
            } => {
                let signals = self.signals.track_read_progress(&post_id, page + 1, total);
                self.outbox.extend(signals);
            }
            ReaderEvent::PostChanged { post_id, index, .. } => {
                self.selected = index;
                self.viewport.scroll = 0;
                self.outbox.extend(self.signals.click(&post_id));
            }
        }
    }

    fn toggle_like(&mut self) -> Option<Effect> {
        let mut post = self.focused_post()?.clone();
        let engagement = &mut post.engagement;
        engagement.is_liked = !engagement.is_liked;
        engagement.likes = if engagement.is_liked {
            engagement.likes.saturating_add(1)
        } else {
            engagement.likes.saturating_sub(1)
        };
        let effect = Effect::Like {
            post_id: post.id.clone(),
            liked: engagement.is_liked,
            likes: engagement.likes,
        };
        if post.engagement.is_liked {
            self.outbox.push(self.signals.like(&post.id));
        }
        self.reader.update_post(post);
        Some(effect)
    }

    fn toggle_saved(&mut self) {
        let Some(mut post) = self.focused_post().cloned() else {
            return;
        };
        post.engagement.is_saved = !post.engagement.is_saved;
        if post.engagement.is_saved {
            self.outbox.push(self.signals.save(&post.id));
            self.set_status("Saved");
        }
        self.reader.update_post(post);
    }

    /// Rows reserved below page content for the footer
    pub fn footer_rows(&self) -> usize {
        let layout = &self.config.layout;
        (layout.footer_clearance / layout.line_height.max(1)).max(1) as usize
    }

    /// Lay out the open post for the reader body and report the geometry to the session
    pub fn layout_reader(&mut self, body: Rect, now: Instant) {
        let Some(session) = self.reader.session() else {
            return;
        };
        let key = (session.post_id().to_string(), body.width);
        if self.rendered_for.as_ref() != Some(&key) {
            self.rendered.clear();
            self.rendered_for = Some(key);
        }

        let Some(post) = self.reader.current_post() else {
            return;
        };
        let renderer = PageRenderer {
            theme: &self.theme,
            resolver: &self.resolver,
            width: body.width,
            footer_rows: self.footer_rows(),
        };
        let active = session.active_index();
        let exiting = session.navigator().exiting().map(|e| e.index);
        for index in std::iter::once(active).chain(exiting) {
            if let Some(page) = session.pages().get(index) {
                let has_next = index + 1 < session.page_count();
                self.rendered
                    .entry(index)
                    .or_insert_with(|| renderer.render(page, post, has_next));
            }
        }

        let content_rows = rows(self.rendered.get(&active).map_or(0, RenderedPage::height));
        self.viewport.area = body;
        let resize = Gesture::Resize {
            content: self.geometry.rows_to_px(content_rows),
            viewport: self.geometry.rows_to_px(body.height),
        };
        let _ = self.reader.handle(resize, now);
        if let Some(session) = self.reader.session() {
            self.viewport.scroll = self.geometry.px_to_rows(session.scroll_offset());
        }
    }

    pub fn rendered_page(&self, index: usize) -> Option<&RenderedPage> {
        self.rendered.get(&index)
    }

    /// Scroll row at which a page leaving in the given way stays pinned
    pub fn pinned_scroll(&self, index: usize, restore: ScrollRestore) -> usize {
        let content = self.rendered.get(&index).map_or(0, RenderedPage::height);
        restore.offset(
            content as u32,
            u32::from(self.viewport.area.height),
            self.footer_rows() as u32,
        ) as usize
    }

    fn footer_hit(&self, column: u16, row: u16) -> bool {
        let Some(session) = self.reader.session() else {
            return false;
        };
        if self.screen != Screen::Reader
            || session.navigator().is_transitioning()
            || !self.viewport.area.contains(Position::new(column, row))
        {
            return false;
        }
        let content_row = usize::from(self.viewport.scroll) + usize::from(row - self.viewport.area.y);
        self.rendered
            .get(&session.active_index())
            .and_then(|p| p.footer_row)
            == Some(content_row)
    }
}

/// Row count clamped to what a terminal coordinate can hold
fn rows(count: usize) -> u16 {
    u16::try_from(count).unwrap_or(u16::MAX)
}
