use crate::types::ScanTarget;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;

/// Advisory per-attempt notification. Not part of the scan result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Attempt `attempt` (1-based) failed; the worker now waits `backoff`.
    AttemptFailed {
        target: ScanTarget,
        attempt: u32,
        backoff: Duration,
    },
    Open { target: ScanTarget, attempts: u32 },
    Closed { target: ScanTarget, attempts: u32 },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::AttemptFailed {
                target,
                attempt,
                backoff,
            } => write!(
                f,
                "Attempt {attempt} to {target} failed. Waiting {backoff:?}..."
            ),
            ProgressEvent::Open { target, .. } => {
                write!(f, "Connection to {target} was successful")
            }
            ProgressEvent::Closed { target, attempts } => {
                write!(f, "Failed to connect to {target} after {attempts} attempts")
            }
        }
    }
}

/// Sending half handed to workers. Never blocks, never fails the scan.
#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl ProgressSink {
    /// A sink that drops every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// A connected sink and the receiver the output layer reads from.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn notify(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            // Receiver gone just means nobody is listening anymore.
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_read_like_progress_output() {
        let t = ScanTarget::new("scanme.nmap.org", 22);
        let failed = ProgressEvent::AttemptFailed {
            target: t.clone(),
            attempt: 2,
            backoff: Duration::from_secs(2),
        };
        assert_eq!(
            failed.to_string(),
            "Attempt 2 to scanme.nmap.org:22 failed. Waiting 2s..."
        );
        let closed = ProgressEvent::Closed { target: t, attempts: 3 };
        assert_eq!(
            closed.to_string(),
            "Failed to connect to scanme.nmap.org:22 after 3 attempts"
        );
    }

    #[test]
    fn dropped_receiver_is_ignored() {
        let (sink, rx) = ProgressSink::channel();
        drop(rx);
        sink.notify(ProgressEvent::Open {
            target: ScanTarget::new("h", 1),
            attempts: 1,
        });
    }
}
