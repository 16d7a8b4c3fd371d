use crate::aggregator::{ResultAggregator, ResultSink};
use crate::attempt::Attempter;
use crate::config::ScanConfig;
use crate::dialer::{Connector, TcpDialer};
use crate::progress::ProgressSink;
use crate::types::{ScanReport, ScanResult, ScanSummary, ScanTarget};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use ::time::{format_description::well_known, OffsetDateTime};

/// Scan every host against every port using plain TCP connects.
///
/// - `config.workers` workers pull targets from one bounded queue.
/// - Each target gets up to `config.max_retries` dials with exponential backoff.
/// - Open ports get a single passive banner read.
/// - Only open ports end up in the report; their order is unspecified.
pub async fn scan_targets(hosts: &[String], ports: &[u16], config: &ScanConfig) -> ScanReport {
    scan_targets_with_cancel(
        hosts,
        ports,
        config,
        CancellationToken::new(),
        ProgressSink::disabled(),
    )
    .await
}

/// Variant that accepts a `CancellationToken` and a progress sink.
pub async fn scan_targets_with_cancel(
    hosts: &[String],
    ports: &[u16],
    config: &ScanConfig,
    cancel: CancellationToken,
    progress: ProgressSink,
) -> ScanReport {
    let dialer = Arc::new(TcpDialer::new(config.connect_timeout));
    scan_with_connector(dialer, hosts, ports, config, cancel, progress).await
}

/// Hosts outer, ports inner. Duplicates are kept.
///
/// Lazy: a target is only built when the feeder is ready to queue it.
pub fn build_targets<'a>(
    hosts: &'a [String],
    ports: &'a [u16],
) -> impl Iterator<Item = ScanTarget> + 'a {
    hosts
        .iter()
        .flat_map(move |h| ports.iter().map(move |&p| ScanTarget::new(h.as_str(), p)))
}

/// Run the worker pool with any [`Connector`]. Never fails: per-target errors
/// stay inside the attempter, and cancellation just cuts the scan short.
pub async fn scan_with_connector<C: Connector>(
    connector: Arc<C>,
    hosts: &[String],
    ports: &[u16],
    config: &ScanConfig,
    cancel: CancellationToken,
    progress: ProgressSink,
) -> ScanReport {
    let start = Instant::now();
    let started_at = rfc3339_utc(OffsetDateTime::now_utc());

    if config.workers == 0 || hosts.is_empty() || ports.is_empty() {
        tracing::info!(
            workers = config.workers,
            hosts = hosts.len(),
            ports = ports.len(),
            "nothing to scan"
        );
        return ScanReport {
            summary: ScanSummary {
                total_ports_scanned: 0,
                open_count: 0,
                elapsed: start.elapsed(),
                started_at,
            },
            results: Vec::new(),
        };
    }

    let total = hosts.len() as u64 * ports.len() as u64;
    tracing::info!(total, workers = config.workers, "scan started");

    let (task_tx, task_rx) = mpsc::channel::<ScanTarget>(config.queue_capacity.max(1));
    let queue = Arc::new(Mutex::new(task_rx));
    let (sink, aggregator) = ResultAggregator::spawn();
    let scanned = Arc::new(AtomicU64::new(0));
    let attempter = Attempter::new(connector, config.clone(), progress);

    let mut set = JoinSet::new();
    for id in 0..config.workers {
        set.spawn(worker(
            id,
            queue.clone(),
            attempter.clone(),
            sink.clone(),
            scanned.clone(),
            cancel.clone(),
        ));
    }
    // Workers own the remaining handles; the collector stops when they exit.
    drop(sink);
    drop(queue);

    for target in build_targets(hosts, ports) {
        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            r = task_tx.send(target) => r,
        };
        if sent.is_err() {
            tracing::warn!("all workers exited before the queue was filled");
            break;
        }
    }
    // Closing the queue is the workers' signal to exit once it drains.
    drop(task_tx);

    while let Some(res) = set.join_next().await {
        if let Err(e) = res {
            tracing::warn!(error = %e, "scan worker panicked");
        }
    }

    let results = aggregator.snapshot().await;
    let summary = ScanSummary {
        total_ports_scanned: scanned.load(Ordering::Relaxed),
        open_count: results.len() as u64,
        elapsed: start.elapsed(),
        started_at,
    };
    tracing::info!(
        scanned = summary.total_ports_scanned,
        open = summary.open_count,
        elapsed = ?summary.elapsed,
        cancelled = cancel.is_cancelled(),
        "scan finished"
    );
    ScanReport { summary, results }
}

async fn worker<C: Connector>(
    id: usize,
    queue: Arc<Mutex<mpsc::Receiver<ScanTarget>>>,
    attempter: Attempter<C>,
    sink: ResultSink,
    scanned: Arc<AtomicU64>,
    cancel: CancellationToken,
) {
    loop {
        let next = {
            let mut rx = queue.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                t = rx.recv() => t,
            }
        };
        let Some(target) = next else {
            break;
        };

        let outcome = attempter.attempt_with_cancel(target, &cancel).await;
        scanned.fetch_add(1, Ordering::Relaxed);
        if let Some(result) = ScanResult::from_outcome(outcome) {
            sink.record(result).await;
        }
    }
    tracing::trace!(worker = id, "worker exiting");
}

/// Start stamp for the summary. Formatting a UTC time as RFC 3339 only fails
/// for years outside 0..=9999, which leaves the stamp empty.
fn rfc3339_utc(at: OffsetDateTime) -> String {
    at.format(&well_known::Rfc3339).unwrap_or_default()
}
