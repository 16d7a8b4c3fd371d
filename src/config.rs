use std::time::Duration;

pub const DEFAULT_WORKERS: usize = 100;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BANNER_BUFFER: usize = 1042;

/// Tunables for one scan run. Passed explicitly to the dialer, attempter and pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Number of concurrent workers. Zero means nothing gets scanned.
    pub workers: usize,
    /// Per-dial timeout.
    pub connect_timeout: Duration,
    /// Dial attempts per target, including the first one.
    pub max_retries: u32,
    /// Delay after failed attempt `i` is `backoff_base * 2^i`.
    pub backoff_base: Duration,
    /// Read deadline for the banner probe.
    pub banner_timeout: Duration,
    pub banner_buffer_size: usize,
    /// Capacity of the bounded task queue.
    pub queue_capacity: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            connect_timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: Duration::from_secs(1),
            banner_timeout: DEFAULT_TIMEOUT,
            banner_buffer_size: DEFAULT_BANNER_BUFFER,
            queue_capacity: 100,
        }
    }
}

impl ScanConfig {
    /// Backoff to wait after the failed attempt with 0-based index `attempt`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor)
    }

    /// At least one dial is always made.
    pub fn effective_retries(&self) -> u32 {
        self.max_retries.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        let cfg = ScanConfig::default();
        assert_eq!(cfg.backoff_for(0), Duration::from_secs(1));
        assert_eq!(cfg.backoff_for(1), Duration::from_secs(2));
        assert_eq!(cfg.backoff_for(2), Duration::from_secs(4));
    }

    #[test]
    fn zero_retries_still_dials_once() {
        let cfg = ScanConfig {
            max_retries: 0,
            ..ScanConfig::default()
        };
        assert_eq!(cfg.effective_retries(), 1);
    }

    #[test]
    fn huge_attempt_index_saturates() {
        let cfg = ScanConfig::default();
        assert!(cfg.backoff_for(40) >= cfg.backoff_for(31));
    }
}
