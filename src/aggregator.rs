use crate::types::ScanResult;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const RESULT_CHANNEL_CAPACITY: usize = 1024;

/// Write handle held by each worker.
///
/// Records travel over a channel to a single collector task, so no worker
/// ever holds a lock and nothing is shared between writers.
#[derive(Debug, Clone)]
pub struct ResultSink {
    tx: mpsc::Sender<ScanResult>,
}

impl ResultSink {
    pub async fn record(&self, result: ScanResult) {
        if self.tx.send(result).await.is_err() {
            tracing::warn!("result collector stopped before all workers finished");
        }
    }
}

/// Owns the open-port findings of one run until every sink is gone.
#[derive(Debug)]
pub struct ResultAggregator {
    collector: JoinHandle<Vec<ScanResult>>,
}

impl ResultAggregator {
    /// Start the collector task. Must be called inside a tokio runtime.
    pub fn spawn() -> (ResultSink, ResultAggregator) {
        let (tx, mut rx) = mpsc::channel::<ScanResult>(RESULT_CHANNEL_CAPACITY);
        let collector = tokio::spawn(async move {
            let mut entries = Vec::new();
            while let Some(r) = rx.recv().await {
                entries.push(r);
            }
            entries
        });
        (ResultSink { tx }, ResultAggregator { collector })
    }

    /// Hand over everything recorded. Completes once every `ResultSink` clone
    /// has been dropped, so call it only after the writers are done.
    pub async fn snapshot(self) -> Vec<ScanResult> {
        match self.collector.await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(error = %e, "result collector task failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(port: u16) -> ScanResult {
        ScanResult {
            target: "h".into(),
            port,
            open: true,
            banner: None,
        }
    }

    #[tokio::test]
    async fn collects_from_many_writers() {
        let (sink, agg) = ResultAggregator::spawn();
        let mut handles = Vec::new();
        for w in 0..8u16 {
            let sink = sink.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..100u16 {
                    sink.record(open(w * 100 + i + 1)).await;
                }
            }));
        }
        drop(sink);
        for h in handles {
            h.await.unwrap();
        }

        let mut ports: Vec<u16> = agg.snapshot().await.into_iter().map(|r| r.port).collect();
        ports.sort_unstable();
        assert_eq!(ports, (1..=800).collect::<Vec<u16>>());
    }

    #[tokio::test]
    async fn no_writes_gives_empty_snapshot() {
        let (sink, agg) = ResultAggregator::spawn();
        drop(sink);
        assert!(agg.snapshot().await.is_empty());
    }
}
