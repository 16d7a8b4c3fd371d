use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// One host:port pair to probe. Consumed by exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanTarget {
    pub host: String,
    pub port: u16,
}

impl ScanTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bracket IPv6 literals the same way a socket address would.
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// What a single connection attempter run produced for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub target: ScanTarget,
    pub open: bool,
    pub banner: Option<Vec<u8>>,
    pub attempts_used: u32,
}

/// One open-port finding, as emitted in the JSON report.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub target: String,
    pub port: u16,
    pub open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

impl ScanResult {
    /// Build the aggregate record for an open outcome. Returns `None` for closed ones.
    pub fn from_outcome(outcome: AttemptOutcome) -> Option<Self> {
        if !outcome.open {
            return None;
        }
        let banner = outcome
            .banner
            .filter(|b| !b.is_empty())
            .map(|b| String::from_utf8_lossy(&b).into_owned());
        Some(Self {
            target: outcome.target.host,
            port: outcome.target.port,
            open: true,
            banner,
        })
    }
}

/// Counters derived once the worker pool has drained.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub total_ports_scanned: u64,
    pub open_count: u64,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
    pub started_at: String,
}

fn as_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Summary plus the open-port findings of one scan run. Order of `results` is unspecified.
#[derive(Serialize, Debug, Clone, Default)]
pub struct ScanReport {
    pub summary: ScanSummary,
    pub results: Vec<ScanResult>,
}
