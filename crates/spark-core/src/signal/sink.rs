use async_trait::async_trait;
use tracing::{info, warn};

use super::tracker::Signal;
use crate::Result;

/// Delivery of recommendation signals
#[async_trait]
pub trait SignalSink: Send + Sync {
    async fn send(&self, signal: &Signal) -> Result<()>;
}

/// Writes signals to the log instead of a backend
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl SignalSink for LogSink {
    async fn send(&self, signal: &Signal) -> Result<()> {
        info!(post = %signal.post_id, kind = %signal.kind, "Recommendation signal");
        Ok(())
    }
}

/// Send every signal; failures are logged and never surface to the caller
pub async fn dispatch<I>(sink: &dyn SignalSink, signals: I)
where
    I: IntoIterator<Item = Signal>,
{
    for signal in signals {
        if let Err(e) = sink.send(&signal).await {
            warn!(post = %signal.post_id, kind = %signal.kind, error = %e, "Failed to send signal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalKind;
    use crate::Error;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        sent: Mutex<Vec<Signal>>,
    }

    #[async_trait]
    impl SignalSink for Recording {
        async fn send(&self, signal: &Signal) -> Result<()> {
            if signal.post_id == "broken" {
                return Err(Error::Other("rejected".into()));
            }
            self.sent.lock().unwrap().push(signal.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dispatch_keeps_going_after_failures() {
        let sink = Recording::default();
        dispatch(
            &sink,
            vec![
                Signal::new("broken", SignalKind::Click),
                Signal::new("p1", SignalKind::Like),
            ],
        )
        .await;
        let sent = sink.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].post_id, "p1");
    }

    #[tokio::test]
    async fn test_log_sink_accepts_everything() {
        assert!(LogSink.send(&Signal::new("p", SignalKind::Save)).await.is_ok());
    }
}
