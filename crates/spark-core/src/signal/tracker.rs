use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Interaction events fed to the recommender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Click,
    Like,
    Comment,
    Save,
    ReadToSecond,
    ReadAlmostComplete,
}

impl SignalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalKind::Click => "click",
            SignalKind::Like => "like",
            SignalKind::Comment => "comment",
            SignalKind::Save => "save",
            SignalKind::ReadToSecond => "read_to_second",
            SignalKind::ReadAlmostComplete => "read_almost_complete",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub post_id: String,
    pub kind: SignalKind,
}

impl Signal {
    pub fn new(post_id: impl Into<String>, kind: SignalKind) -> Self {
        Self {
            post_id: post_id.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ReadProgress {
    sent_second: bool,
    sent_almost: bool,
}

/// Decides which signals an interaction produces, deduplicating where needed
#[derive(Debug, Default)]
pub struct SignalTracker {
    clicked: HashSet<String>,
    progress: HashMap<String, ReadProgress>,
}

impl SignalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opening a post; only the first open counts
    pub fn click(&mut self, post_id: &str) -> Option<Signal> {
        if !self.clicked.insert(post_id.to_string()) {
            return None;
        }
        Some(Signal::new(post_id, SignalKind::Click))
    }

    pub fn like(&self, post_id: &str) -> Signal {
        Signal::new(post_id, SignalKind::Like)
    }

    pub fn save(&self, post_id: &str) -> Signal {
        Signal::new(post_id, SignalKind::Save)
    }

    /// Reading position changed; `page` is 1-based
    pub fn track_read_progress(&mut self, post_id: &str, page: usize, total: usize) -> Vec<Signal> {
        if total < 2 {
            return Vec::new();
        }
        let state = self.progress.entry(post_id.to_string()).or_default();
        let mut signals = Vec::new();

        if page >= 2 && !state.sent_second {
            state.sent_second = true;
            signals.push(Signal::new(post_id, SignalKind::ReadToSecond));
        }

        // ceil(total * 0.75) in integers
        let almost = (total * 3).div_ceil(4);
        if page >= almost && !state.sent_almost {
            state.sent_almost = true;
            signals.push(Signal::new(post_id, SignalKind::ReadAlmostComplete));
        }

        signals
    }

    pub fn reset_progress(&mut self, post_id: &str) {
        self.progress.remove(post_id);
    }

    pub fn reset(&mut self) {
        self.clicked.clear();
        self.progress.clear();
    }
}
