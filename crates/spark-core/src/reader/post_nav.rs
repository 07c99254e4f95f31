//! Cross-post navigation over the feed order

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::GestureConfig;

/// Which side the incoming post slides in from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlideDirection {
    #[default]
    None,
    FromRight,
    FromLeft,
}

impl SlideDirection {
    fn between(previous: usize, next: usize) -> Self {
        match next.cmp(&previous) {
            std::cmp::Ordering::Greater => SlideDirection::FromRight,
            std::cmp::Ordering::Less => SlideDirection::FromLeft,
            std::cmp::Ordering::Equal => SlideDirection::None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostNavigator {
    config: GestureConfig,
    transition: Duration,
    post_ids: Vec<String>,
    current: usize,
    slide: SlideDirection,
    slide_started: Option<Instant>,
    locked_until: Option<Instant>,
    touch_start: Option<(f32, f32)>,
}

impl PostNavigator {
    pub fn new(post_ids: Vec<String>, config: GestureConfig, transition: Duration) -> Self {
        Self {
            config,
            transition,
            post_ids,
            current: 0,
            slide: SlideDirection::None,
            slide_started: None,
            locked_until: None,
            touch_start: None,
        }
    }

    pub fn len(&self) -> usize {
        self.post_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.post_ids.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_id(&self) -> Option<&str> {
        self.post_ids.get(self.current).map(String::as_str)
    }

    pub fn has_next(&self) -> bool {
        self.current + 1 < self.post_ids.len()
    }

    pub fn has_prev(&self) -> bool {
        self.current > 0
    }

    /// Replace the feed order, staying on the same post when it is still there
    pub fn set_posts(&mut self, post_ids: Vec<String>) {
        let keep = self
            .current_id()
            .and_then(|id| post_ids.iter().position(|p| p == id));
        self.current = keep.unwrap_or(0).min(post_ids.len().saturating_sub(1));
        self.post_ids = post_ids;
    }

    pub fn is_locked(&self, now: Instant) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// Slide of the last switch, regardless of whether it is still animating
    pub fn slide_direction(&self) -> SlideDirection {
        self.slide
    }

    /// Slide of the running post transition, `None` once it has finished
    pub fn slide(&self, now: Instant) -> SlideDirection {
        match self.slide_started {
            Some(started) if now.saturating_duration_since(started) < self.transition => self.slide,
            _ => SlideDirection::None,
        }
    }

    pub fn slide_progress(&self, now: Instant) -> Option<f64> {
        let started = self.slide_started?;
        let elapsed = now.saturating_duration_since(started);
        if elapsed >= self.transition || self.transition.is_zero() {
            return None;
        }
        Some(elapsed.as_secs_f64() / self.transition.as_secs_f64())
    }

    pub fn poll(&mut self, now: Instant) {
        if self.slide_started.is_some() && self.slide(now) == SlideDirection::None {
            self.slide = SlideDirection::None;
            self.slide_started = None;
        }
    }

    /// Whether a wheel delta is a post switch gesture rather than a scroll
    pub fn is_horizontal_wheel(&self, dx: f32, dy: f32) -> bool {
        dx.abs() > dy.abs() && dx.abs() > self.config.post_wheel_threshold
    }

    /// Whether a finished swipe is horizontal enough to switch posts
    pub fn is_horizontal_swipe(&self, dx: f32, dy: f32) -> bool {
        dx.abs() > self.config.post_swipe_threshold
            && dx.abs() > self.config.horizontal_dominance * dy.abs()
    }

    /// Horizontal wheel; positive `dx` moves to the next post
    pub fn on_wheel(&mut self, dx: f32, dy: f32, now: Instant) -> Option<usize> {
        if !self.is_horizontal_wheel(dx, dy) {
            return None;
        }
        self.step(if dx > 0.0 { 1 } else { -1 }, now)
    }

    pub fn on_touch_start(&mut self, x: f32, y: f32) {
        self.touch_start = Some((x, y));
    }

    /// Finger lifted; a leftward swipe moves to the next post
    pub fn on_touch_end(&mut self, x: f32, y: f32, now: Instant) -> Option<usize> {
        let (start_x, start_y) = self.touch_start.take()?;
        let dx = start_x - x;
        let dy = start_y - y;
        if !self.is_horizontal_swipe(dx, dy) {
            return None;
        }
        self.step(if dx > 0.0 { 1 } else { -1 }, now)
    }

    pub fn next(&mut self, now: Instant) -> Option<usize> {
        self.step(1, now)
    }

    pub fn prev(&mut self, now: Instant) -> Option<usize> {
        self.step(-1, now)
    }

    /// Move by `delta` posts. Dropped while locked or past either end.
    pub fn step(&mut self, delta: isize, now: Instant) -> Option<usize> {
        if self.is_locked(now) {
            debug!("Post switch dropped, navigator locked");
            return None;
        }
        let target = self.current.checked_add_signed(delta)?;
        if target >= self.post_ids.len() {
            return None;
        }
        self.locked_until = Some(now + self.config.post_lock());
        self.move_to(target, now);
        Some(target)
    }

    /// Programmatic selection (e.g. opening a post from the feed list)
    pub fn select(&mut self, index: usize, now: Instant) -> Option<usize> {
        if index >= self.post_ids.len() {
            return None;
        }
        self.move_to(index, now);
        Some(index)
    }

    fn move_to(&mut self, target: usize, now: Instant) {
        let previous = self.current;
        self.current = target;
        self.slide = SlideDirection::between(previous, target);
        self.slide_started = Some(now);
        debug!(from = previous, to = target, slide = ?self.slide, "Post switch");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn navigator(n: usize) -> PostNavigator {
        let ids = (0..n).map(|i| format!("post-{}", i)).collect();
        PostNavigator::new(ids, GestureConfig::default(), Duration::from_millis(300))
    }

    #[test]
    fn test_horizontal_wheel_switches_posts() {
        let now = Instant::now();
        let mut nav = navigator(3);

        assert_eq!(nav.on_wheel(20.0, 0.0, now), None);
        assert_eq!(nav.on_wheel(50.0, 60.0, now), None);
        assert_eq!(nav.on_wheel(50.0, 10.0, now), Some(1));
        assert_eq!(nav.current_id(), Some("post-1"));
        assert_eq!(nav.slide(now), SlideDirection::FromRight);
    }

    #[test]
    fn test_swipe_left_goes_next_and_right_goes_back() {
        let mut now = Instant::now();
        let mut nav = navigator(3);

        nav.on_touch_start(300.0, 100.0);
        assert_eq!(nav.on_touch_end(200.0, 120.0, now), Some(1));

        now += Duration::from_millis(400);
        nav.on_touch_start(100.0, 100.0);
        assert_eq!(nav.on_touch_end(200.0, 100.0, now), Some(0));
        assert_eq!(nav.slide(now), SlideDirection::FromLeft);
    }

    #[test]
    fn test_swipe_needs_horizontal_dominance() {
        let now = Instant::now();
        let mut nav = navigator(3);
        nav.on_touch_start(300.0, 100.0);
        // dx 60, dy 50: 60 < 1.5 * 50
        assert_eq!(nav.on_touch_end(240.0, 50.0, now), None);
        assert_eq!(nav.current_index(), 0);
    }

    #[test]
    fn test_lock_is_held_for_cooldown() {
        let now = Instant::now();
        let mut nav = navigator(5);
        assert_eq!(nav.next(now), Some(1));
        assert_eq!(nav.next(now + Duration::from_millis(399)), None);
        assert_eq!(nav.next(now + Duration::from_millis(400)), Some(2));
    }

    #[test]
    fn test_no_wraparound() {
        let now = Instant::now();
        let mut nav = navigator(2);
        assert_eq!(nav.prev(now), None);
        nav.select(1, now);
        assert_eq!(nav.next(now), None);
        assert_eq!(nav.current_index(), 1);
    }

    #[test]
    fn test_select_computes_slide_and_clears_after_transition() {
        let now = Instant::now();
        let mut nav = navigator(5);
        nav.select(3, now);
        assert_eq!(nav.slide(now), SlideDirection::FromRight);
        nav.select(1, now);
        assert_eq!(nav.slide(now), SlideDirection::FromLeft);

        let later = now + Duration::from_millis(300);
        nav.poll(later);
        assert_eq!(nav.slide(later), SlideDirection::None);
        assert_eq!(nav.slide_progress(later), None);
    }

    #[test]
    fn test_set_posts_keeps_current_post() {
        let now = Instant::now();
        let mut nav = navigator(3);
        nav.select(2, now);
        nav.set_posts(vec!["post-2".into(), "post-9".into()]);
        assert_eq!(nav.current_index(), 0);
        assert_eq!(nav.current_id(), Some("post-2"));

        nav.set_posts(Vec::new());
        assert_eq!(nav.current_id(), None);
    }
}
