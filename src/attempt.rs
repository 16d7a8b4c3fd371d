use crate::banner;
use crate::config::ScanConfig;
use crate::dialer::Connector;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::types::{AttemptOutcome, ScanTarget};
use std::sync::Arc;
use tokio::time;
use tokio_util::sync::CancellationToken;

/// Dials one target with retry and exponential backoff, then grabs a banner.
///
/// Every dial error (timeout, refused, unreachable, DNS) is treated the same:
/// wait `backoff_base * 2^i` and try again until the retry budget is spent.
/// The wait only suspends the calling worker.
pub struct Attempter<C: Connector> {
    connector: Arc<C>,
    config: ScanConfig,
    progress: ProgressSink,
}

impl<C: Connector> Clone for Attempter<C> {
    fn clone(&self) -> Self {
        Self {
            connector: self.connector.clone(),
            config: self.config.clone(),
            progress: self.progress.clone(),
        }
    }
}

impl<C: Connector> Attempter<C> {
    pub fn new(connector: Arc<C>, config: ScanConfig, progress: ProgressSink) -> Self {
        Self {
            connector,
            config,
            progress,
        }
    }

    pub async fn attempt(&self, target: ScanTarget) -> AttemptOutcome {
        self.attempt_with_cancel(target, &CancellationToken::new())
            .await
    }

    /// Like [`attempt`](Self::attempt), but gives up as soon as `cancel` fires.
    /// A cancelled attempt reports the port as not open.
    pub async fn attempt_with_cancel(
        &self,
        target: ScanTarget,
        cancel: &CancellationToken,
    ) -> AttemptOutcome {
        let retries = self.config.effective_retries();

        for i in 0..retries {
            let dialed = tokio::select! {
                biased;
                _ = cancel.cancelled() => return closed(target, i),
                res = self.connector.connect(&target) => res,
            };

            match dialed {
                Ok(mut stream) => {
                    let banner = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        b = banner::probe(
                            &mut stream,
                            self.config.banner_timeout,
                            self.config.banner_buffer_size,
                        ) => b,
                    };
                    drop(stream);
                    tracing::debug!(%target, attempt = i + 1, "port open");
                    self.progress.notify(ProgressEvent::Open {
                        target: target.clone(),
                        attempts: i + 1,
                    });
                    return AttemptOutcome {
                        target,
                        open: true,
                        banner,
                        attempts_used: i + 1,
                    };
                }
                Err(e) => {
                    let backoff = self.config.backoff_for(i);
                    tracing::debug!(%target, attempt = i + 1, error = %e, ?backoff, "dial failed");
                    self.progress.notify(ProgressEvent::AttemptFailed {
                        target: target.clone(),
                        attempt: i + 1,
                        backoff,
                    });
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return closed(target, i + 1),
                        _ = time::sleep(backoff) => {}
                    }
                }
            }
        }

        self.progress.notify(ProgressEvent::Closed {
            target: target.clone(),
            attempts: retries,
        });
        closed(target, retries)
    }
}

fn closed(target: ScanTarget, attempts_used: u32) -> AttemptOutcome {
    AttemptOutcome {
        target,
        open: false,
        banner: None,
        attempts_used,
    }
}
