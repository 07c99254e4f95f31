use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent};
use spark_core::Post;

/// Event handler for terminal events
pub struct EventHandler {
    tick_rate: Duration,
    animation_tick: Duration,
}

/// Result of a background feed load
pub enum LoadResult {
    /// New displayed post list
    Loaded { posts: Vec<Post>, has_more: bool },
    Failed { error: String },
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        Self::with_animation_fps(tick_rate_ms, 60)
    }

    /// Handler that can poll faster while a slide is running
    pub fn with_animation_fps(tick_rate_ms: u64, animation_fps: u32) -> Self {
        let animation_tick = if animation_fps == 0 {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(1000 / u64::from(animation_fps))
        };
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
            animation_tick,
        }
    }

    /// Poll for the next event
    pub fn next(&self) -> Result<Option<AppEvent>> {
        self.poll(self.tick_rate)
    }

    /// Poll at animation frame rate
    pub fn next_animation(&self) -> Result<Option<AppEvent>> {
        self.poll(self.animation_tick)
    }

    fn poll(&self, timeout: Duration) -> Result<Option<AppEvent>> {
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    // crossterm reports releases too on some platforms
                    if key.kind == KeyEventKind::Press {
                        Ok(Some(AppEvent::Key(key)))
                    } else {
                        Ok(None)
                    }
                }
                Event::Mouse(mouse) => Ok(Some(AppEvent::Mouse(mouse))),
                Event::Resize(w, h) => Ok(Some(AppEvent::Resize(w, h))),
                _ => Ok(None),
            }
        } else {
            Ok(Some(AppEvent::Tick))
        }
    }
}

/// Application events
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    /// Wheel, press and release; drag is ignored
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// Periodic wake-up; drives animation deadlines
    Tick,
}
