//! Lives in its own test binary: the global allocator below counts every
//! allocation in the process.
use async_trait::async_trait;
use std::alloc::{GlobalAlloc, Layout, System};
use std::io::{self, Cursor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tcp_sweep::config::ScanConfig;
use tcp_sweep::dialer::Connector;
use tcp_sweep::progress::ProgressSink;
use tcp_sweep::scanner::scan_with_connector;
use tcp_sweep::types::ScanTarget;
use tokio_util::sync::CancellationToken;

struct PeakTracking;

static CURRENT: AtomicUsize = AtomicUsize::new(0);
static PEAK: AtomicUsize = AtomicUsize::new(0);

unsafe impl GlobalAlloc for PeakTracking {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let p = System.alloc(layout);
        if !p.is_null() {
            let now = CURRENT.fetch_add(layout.size(), Ordering::SeqCst) + layout.size();
            PEAK.fetch_max(now, Ordering::SeqCst);
        }
        p
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        CURRENT.fetch_sub(layout.size(), Ordering::SeqCst);
    }
}

#[global_allocator]
static ALLOC: PeakTracking = PeakTracking;

/// Refuses every dial and stops the scan on the first one.
struct CancelOnFirstDial {
    cancel: CancellationToken,
}

#[async_trait]
impl Connector for CancelOnFirstDial {
    type Stream = Cursor<Vec<u8>>;

    async fn connect(&self, _target: &ScanTarget) -> io::Result<Self::Stream> {
        self.cancel.cancel();
        Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
    }
}

#[tokio::test]
async fn feeder_does_not_materialize_the_cross_product() {
    // 16 hosts x 65535 ports: about a million targets if built up front.
    let hosts: Vec<String> = (0..16).map(|i| format!("10.0.0.{i}")).collect();
    let ports: Vec<u16> = (1..=u16::MAX).collect();
    let cancel = CancellationToken::new();
    let connector = Arc::new(CancelOnFirstDial {
        cancel: cancel.clone(),
    });
    let config = ScanConfig {
        workers: 1,
        queue_capacity: 100,
        ..ScanConfig::default()
    };

    let baseline = CURRENT.load(Ordering::SeqCst);
    PEAK.store(baseline, Ordering::SeqCst);

    let report = scan_with_connector(
        connector,
        &hosts,
        &ports,
        &config,
        cancel,
        ProgressSink::disabled(),
    )
    .await;

    let peak_extra = PEAK.load(Ordering::SeqCst).saturating_sub(baseline);
    assert_eq!(report.summary.total_ports_scanned, 1);
    assert!(report.results.is_empty());
    assert!(
        peak_extra < 4 * 1024 * 1024,
        "scan allocated {peak_extra} extra bytes for one dial"
    );
}
