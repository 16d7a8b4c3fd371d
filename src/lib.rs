//! Library crate for tcp-sweep: a concurrent TCP connect scanner.
//!
//! [`scanner`] runs a fixed pool of workers over a bounded task queue. Each
//! worker dials through [`attempt::Attempter`] (retry with exponential
//! backoff), grabs a banner with [`banner::probe`], and sends open ports to
//! the [`aggregator::ResultAggregator`].
pub mod aggregator;
pub mod attempt;
pub mod banner;
pub mod config;
pub mod dialer;
pub mod error;
pub mod ports;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod targets;
pub mod types;
