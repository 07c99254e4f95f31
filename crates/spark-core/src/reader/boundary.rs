//! Per-page detection of "leave this page" gestures
//!
//! The detector only reports intent. Whoever owns the page navigator decides
//! what to do with it.

use std::time::Instant;

use tracing::debug;

use crate::config::GestureConfig;

/// Direction the user is asking to move in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Next,
    Prev,
}

/// Live geometry of a page's scrollable region
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub offset: f32,
    pub content: f32,
    pub viewport: f32,
}

impl ScrollMetrics {
    pub fn at_bottom(&self, epsilon: f32) -> bool {
        self.offset + self.viewport >= self.content - epsilon
    }

    pub fn at_top(&self, epsilon: f32) -> bool {
        self.offset <= epsilon
    }

    /// Largest meaningful scroll offset
    pub fn max_offset(&self) -> f32 {
        (self.content - self.viewport).max(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct BoundaryDetector {
    config: GestureConfig,
    metrics: ScrollMetrics,
    active: bool,
    has_next: bool,
    has_prev: bool,
    touch_start_y: Option<f32>,
    locked_until: Option<Instant>,
}

impl BoundaryDetector {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            metrics: ScrollMetrics::default(),
            active: true,
            has_next: false,
            has_prev: false,
            touch_start_y: None,
            locked_until: None,
        }
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Inactive pages (e.g. both pages mounted mid-slide) report nothing
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.touch_start_y = None;
        }
    }

    pub fn set_neighbors(&mut self, has_prev: bool, has_next: bool) {
        self.has_prev = has_prev;
        self.has_next = has_next;
    }

    pub fn on_scroll(&mut self, offset: f32) {
        self.metrics.offset = offset.clamp(0.0, self.metrics.max_offset());
    }

    pub fn on_resize(&mut self, content: f32, viewport: f32) {
        self.metrics.content = content.max(0.0);
        self.metrics.viewport = viewport.max(0.0);
        self.metrics.offset = self.metrics.offset.min(self.metrics.max_offset());
    }

    pub fn is_locked(&self, now: Instant) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// Wheel delta; positive `dy` scrolls down
    pub fn on_wheel(&mut self, dy: f32, now: Instant) -> Option<Intent> {
        if !self.active || self.is_locked(now) {
            return None;
        }
        let eps = self.config.wheel_epsilon;
        let threshold = self.config.wheel_threshold;

        let intent = if self.has_next && self.metrics.at_bottom(eps) && dy > threshold {
            Some(Intent::Next)
        } else if self.has_prev && self.metrics.at_top(eps) && dy < -threshold {
            Some(Intent::Prev)
        } else {
            None
        };
        self.fire(intent, now)
    }

    pub fn on_touch_start(&mut self, y: f32) {
        if self.active {
            self.touch_start_y = Some(y);
        }
    }

    /// Forget a touch that turned out to be meant for someone else
    pub fn cancel_touch(&mut self) {
        self.touch_start_y = None;
    }

    /// Finger lifted; a pull past the boundary turns into an intent
    pub fn on_touch_end(&mut self, y: f32, now: Instant) -> Option<Intent> {
        let start = self.touch_start_y.take()?;
        if !self.active || self.is_locked(now) {
            return None;
        }
        // positive when the finger moved up, i.e. pulling the content further down
        let dy = start - y;
        let eps = self.config.touch_epsilon;
        let threshold = self.config.drag_threshold;

        let intent = if self.has_next && self.metrics.at_bottom(eps) && dy > threshold {
            Some(Intent::Next)
        } else if self.has_prev && self.metrics.at_top(eps) && -dy > threshold {
            Some(Intent::Prev)
        } else {
            None
        };
        self.fire(intent, now)
    }

    fn fire(&mut self, intent: Option<Intent>, now: Instant) -> Option<Intent> {
        if let Some(intent) = intent {
            debug!(?intent, offset = self.metrics.offset, "Page boundary intent");
            self.locked_until = Some(now + self.config.page_lock());
        }
        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn detector(offset: f32) -> BoundaryDetector {
        let mut d = BoundaryDetector::new(GestureConfig::default());
        d.set_neighbors(true, true);
        d.on_resize(1000.0, 400.0);
        d.on_scroll(offset);
        d
    }

    #[test]
    fn test_wheel_at_bottom_requests_next() {
        let now = Instant::now();
        let mut d = detector(600.0);
        assert_eq!(d.on_wheel(10.0, now), None);
        assert_eq!(d.on_wheel(25.0, now), Some(Intent::Next));
    }

    #[test]
    fn test_wheel_within_epsilon_counts_as_boundary() {
        let now = Instant::now();
        let mut d = detector(596.0);
        assert_eq!(d.on_wheel(25.0, now), Some(Intent::Next));

        let mut d = detector(4.0);
        assert_eq!(d.on_wheel(-25.0, now), Some(Intent::Prev));
    }

    #[test]
    fn test_wheel_mid_page_scrolls_normally() {
        let now = Instant::now();
        let mut d = detector(300.0);
        assert_eq!(d.on_wheel(100.0, now), None);
        assert_eq!(d.on_wheel(-100.0, now), None);
    }

    #[test]
    fn test_lock_swallows_repeated_intents() {
        let now = Instant::now();
        let mut d = detector(600.0);
        assert_eq!(d.on_wheel(40.0, now), Some(Intent::Next));
        assert_eq!(d.on_wheel(40.0, now + Duration::from_millis(100)), None);
        assert_eq!(d.on_wheel(40.0, now + Duration::from_millis(599)), None);
        assert_eq!(d.on_wheel(40.0, now + Duration::from_millis(600)), Some(Intent::Next));
    }

    #[test]
    fn test_touch_pull_past_boundary() {
        let now = Instant::now();
        let mut d = detector(600.0);
        d.on_touch_start(500.0);
        assert_eq!(d.on_touch_end(470.0, now), None);

        d.on_touch_start(500.0);
        assert_eq!(d.on_touch_end(450.0, now), Some(Intent::Next));

        let mut d = detector(0.0);
        d.on_touch_start(100.0);
        assert_eq!(d.on_touch_end(160.0, now), Some(Intent::Prev));
    }

    #[test]
    fn test_touch_end_without_start_is_ignored() {
        let mut d = detector(600.0);
        assert_eq!(d.on_touch_end(0.0, Instant::now()), None);
    }

    #[test]
    fn test_inactive_or_edge_pages_stay_silent() {
        let now = Instant::now();
        let mut d = detector(600.0);
        d.set_active(false);
        assert_eq!(d.on_wheel(100.0, now), None);

        let mut d = detector(600.0);
        d.set_neighbors(true, false);
        assert_eq!(d.on_wheel(100.0, now), None);
    }

    #[test]
    fn test_short_page_is_at_both_edges() {
        let now = Instant::now();
        let mut d = BoundaryDetector::new(GestureConfig::default());
        d.set_neighbors(true, true);
        d.on_resize(200.0, 400.0);
        assert!(d.metrics().at_top(5.0));
        assert!(d.metrics().at_bottom(5.0));
        assert_eq!(d.on_wheel(-30.0, now), Some(Intent::Prev));
    }
}
