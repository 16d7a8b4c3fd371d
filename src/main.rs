use std::path::PathBuf;
use std::time::Duration;

use tcp_sweep::config::{ScanConfig, DEFAULT_WORKERS};
use tcp_sweep::progress::ProgressSink;
use tcp_sweep::targets::DEFAULT_TARGET;
use tcp_sweep::{ports, report, scanner, targets};

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// tcp-sweep — concurrent TCP connect port scanner with retry/backoff and banner capture.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tcp-sweep",
    version,
    about = "Concurrent TCP connect port scanner with retry/backoff and banner capture.",
    long_about = None
)]
struct Cli {
    /// Hostname or IP address to scan.
    #[arg(long, default_value = DEFAULT_TARGET)]
    target: String,

    /// Comma-separated hosts, IPs or IPv4 CIDRs. Overrides --target.
    #[arg(long)]
    targets: Option<String>,

    /// First port of the scanned range.
    #[arg(long = "start-port", default_value_t = 1)]
    start_port: u32,

    /// Last port of the scanned range (inclusive).
    #[arg(long = "end-port", default_value_t = 1042)]
    end_port: u32,

    /// Comma-separated ports or ranges (e.g. 22,80,8000-8010). Overrides the range.
    #[arg(long)]
    ports: Option<String>,

    /// Number of concurrent workers.
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Per-attempt connect timeout in seconds.
    #[arg(long, default_value_t = 5)]
    timeout: u64,

    /// Banner read deadline in seconds.
    #[arg(long = "banner-timeout", default_value_t = 5)]
    banner_timeout: u64,

    /// Print open ports as a JSON array on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Write the full report (summary and results) as JSON to this path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Suppress per-attempt progress lines.
    #[arg(long, short, default_value_t = false)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let parsed_targets = match cli.targets.as_deref() {
        Some(list) => targets::parse_target_list(list),
        None => targets::parse_target_list(&cli.target),
    };
    for e in &parsed_targets.rejected {
        eprintln!("Skipping target: {e}");
    }

    let port_list = match cli.ports.as_deref() {
        Some(list) => {
            let parsed = ports::parse_port_list(list);
            for e in &parsed.rejected {
                eprintln!("Skipping port: {e}");
            }
            parsed.ports
        }
        None => ports::port_range(cli.start_port, cli.end_port),
    };

    let config = ScanConfig {
        workers: cli.workers,
        connect_timeout: Duration::from_secs(cli.timeout),
        banner_timeout: Duration::from_secs(cli.banner_timeout),
        ..ScanConfig::default()
    };

    // In JSON mode progress goes to stderr so stdout stays parseable.
    let (progress, mut events) = ProgressSink::channel();
    let to_stderr = cli.json;
    let quiet = cli.quiet;
    let printer = tokio::spawn(async move {
        while let Some(ev) = events.recv().await {
            if quiet {
                continue;
            }
            if to_stderr {
                eprintln!("{ev}");
            } else {
                println!("{ev}");
            }
        }
    });

    let cancel = CancellationToken::new();
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_ctrlc.cancel();
        }
    });

    let scan = scanner::scan_targets_with_cancel(
        &parsed_targets.hosts,
        &port_list,
        &config,
        cancel,
        progress,
    )
    .await;
    // The sink was moved into the scan; once it is dropped the printer drains and stops.
    let _ = printer.await;

    let summary = report::summary_text(&scan.summary);
    if cli.json {
        eprint!("{summary}");
        let json = report::results_json(&scan.results).context("failed to encode results")?;
        println!("{json}");
    } else {
        if !scan.results.is_empty() {
            println!("\n{}", report::results_table(&scan.results));
        }
        print!("{summary}");
    }

    if let Some(path) = cli.output.as_deref() {
        report::write_report_json(path, &scan)
            .with_context(|| format!("failed to write JSON report to {}", path.display()))?;
        eprintln!("Wrote JSON report to {}", path.display());
    }

    Ok(())
}
