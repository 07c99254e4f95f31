//! Page-level navigation state machine
//!
//! A transition starts on `next`/`prev` and resolves on its own once the
//! animation duration has passed. The deadline is checked lazily against the
//! `now` handed to every call, so nothing has to be scheduled or cancelled.

use std::time::{Duration, Instant};

use tracing::debug;

/// Animation direction of the page in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    None,
    Forward,
    Backward,
}

/// Where a page's scroll view lands when it becomes visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollRestore {
    #[default]
    Top,
    Bottom,
}

impl ScrollRestore {
    /// Scroll offset for this restore position.
    ///
    /// Bottom keeps `footer_clearance` of the content below the viewport so the
    /// page footer stays off-screen.
    pub fn offset(self, content: u32, viewport: u32, footer_clearance: u32) -> u32 {
        match self {
            ScrollRestore::Top => 0,
            ScrollRestore::Bottom => content
                .saturating_sub(viewport)
                .saturating_sub(footer_clearance),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Idle {
        page: usize,
    },
    Transitioning {
        from: usize,
        to: usize,
        direction: Direction,
        started: Instant,
        until: Instant,
    },
}

/// The page leaving the screen during a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitingPage {
    pub index: usize,
    pub scroll: ScrollRestore,
}

#[derive(Debug, Clone)]
pub struct PageNavigator {
    page_count: usize,
    state: NavState,
    entry: ScrollRestore,
    duration: Duration,
}

impl PageNavigator {
    /// A navigator over `page_count` pages, open at the first one
    pub fn new(page_count: usize, duration: Duration) -> Self {
        Self {
            page_count: page_count.max(1),
            state: NavState::Idle { page: 0 },
            entry: ScrollRestore::Top,
            duration,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    /// Index of the page being shown (or slid in)
    pub fn active_page(&self) -> usize {
        match self.state {
            NavState::Idle { page } => page,
            NavState::Transitioning { to, .. } => to,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, NavState::Transitioning { .. })
    }

    pub fn direction(&self) -> Direction {
        match self.state {
            NavState::Idle { .. } => Direction::None,
            NavState::Transitioning { direction, .. } => direction,
        }
    }

    pub fn has_next(&self) -> bool {
        self.active_page() + 1 < self.page_count
    }

    pub fn has_prev(&self) -> bool {
        self.active_page() > 0
    }

    /// How the active page should be positioned when it is first shown
    pub fn entry_scroll(&self) -> ScrollRestore {
        self.entry
    }

    /// Page sliding out and where its scroll view stays while it does
    pub fn exiting(&self) -> Option<ExitingPage> {
        match self.state {
            NavState::Idle { .. } => None,
            NavState::Transitioning { from, direction, .. } => Some(ExitingPage {
                index: from,
                scroll: match direction {
                    Direction::Backward => ScrollRestore::Top,
                    Direction::Forward | Direction::None => ScrollRestore::Bottom,
                },
            }),
        }
    }

    /// Reading progress through the post in `(0, 1]`
    pub fn progress(&self) -> f64 {
        (self.active_page() + 1) as f64 / self.page_count as f64
    }

    /// Fraction of the running transition that has elapsed, if any
    pub fn transition_progress(&self, now: Instant) -> Option<f64> {
        match self.state {
            NavState::Idle { .. } => None,
            NavState::Transitioning { started, until, .. } => {
                let total = until.saturating_duration_since(started);
                if total.is_zero() {
                    return Some(1.0);
                }
                let elapsed = now.saturating_duration_since(started);
                Some((elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0))
            }
        }
    }

    /// Resolve an expired transition. Returns true when one just finished.
    pub fn poll(&mut self, now: Instant) -> bool {
        if let NavState::Transitioning { to, until, .. } = self.state {
            if now >= until {
                self.state = NavState::Idle { page: to };
                return true;
            }
        }
        false
    }

    pub fn next(&mut self, now: Instant) -> bool {
        self.poll(now);
        if self.is_transitioning() || !self.has_next() {
            return false;
        }
        let from = self.active_page();
        self.start(from, from + 1, Direction::Forward, now);
        true
    }

    pub fn prev(&mut self, now: Instant) -> bool {
        self.poll(now);
        if self.is_transitioning() || !self.has_prev() {
            return false;
        }
        let from = self.active_page();
        self.start(from, from - 1, Direction::Backward, now);
        true
    }

    fn start(&mut self, from: usize, to: usize, direction: Direction, now: Instant) {
        debug!(from, to, ?direction, "Page transition");
        self.entry = match direction {
            Direction::Backward => ScrollRestore::Bottom,
            Direction::Forward | Direction::None => ScrollRestore::Top,
        };
        self.state = NavState::Transitioning {
            from,
            to,
            direction,
            started: now,
            until: now + self.duration,
        };
    }
}
