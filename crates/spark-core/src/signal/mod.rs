//! Recommendation signals derived from reading behaviour

mod sink;
mod tracker;

pub use sink::{dispatch, LogSink, SignalSink};
pub use tracker::{Signal, SignalKind, SignalTracker};
