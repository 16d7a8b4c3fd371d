use crate::banner;
use crate::error::ScanError;
use crate::types::{ScanReport, ScanResult, ScanSummary};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const BANNER_SNIPPET_MAX: usize = 60;

/// Final human-readable summary lines.
pub fn summary_text(summary: &ScanSummary) -> String {
    format!(
        "Scan started: {}\nTotal ports scanned: {}\nNumber of open ports: {}\nTotal time taken: {:.2?}\n",
        summary.started_at, summary.total_ports_scanned, summary.open_count, summary.elapsed
    )
}

/// Aligned table of open ports, sorted by host then port.
pub fn results_table(results: &[ScanResult]) -> String {
    let mut rows: Vec<&ScanResult> = results.iter().collect();
    rows.sort_by(|a, b| (&a.target, a.port).cmp(&(&b.target, b.port)));

    let mut host_w = "target".len();
    for r in &rows {
        host_w = host_w.max(r.target.len());
    }
    let port_w = 5usize;

    let mut out = String::new();
    out.push_str(&format!(
        "{:<host_w$}  {:>port_w$}  {}\n",
        "target", "port", "banner"
    ));
    out.push_str(&format!(
        "{:-<host_w$}  {:-<port_w$}  {:-<6}\n",
        "", "", ""
    ));
    for r in rows {
        let bsnip = r
            .banner
            .as_deref()
            .map(|b| banner::snippet(b, BANNER_SNIPPET_MAX))
            .unwrap_or_default();
        out.push_str(&format!(
            "{:<host_w$}  {:>port_w$}  {}\n",
            r.target, r.port, bsnip
        ));
    }
    out
}

/// JSON array of `{target, port, open, banner?}`.
pub fn results_json(results: &[ScanResult]) -> Result<String, ScanError> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// Write the whole report (summary plus results) as pretty JSON.
pub fn write_report_json(path: &Path, report: &ScanReport) -> Result<(), ScanError> {
    let mut file = File::create(path)?;
    serde_json::to_writer_pretty(&mut file, report)?;
    file.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample() -> Vec<ScanResult> {
        vec![
            ScanResult {
                target: "example.test".into(),
                port: 22,
                open: true,
                banner: Some("SSH-2.0-x\r\n".into()),
            },
            ScanResult {
                target: "example.test".into(),
                port: 80,
                open: true,
                banner: None,
            },
        ]
    }

    #[test]
    fn json_omits_missing_banner() {
        let json = results_json(&sample()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v[0]["banner"], "SSH-2.0-x\r\n");
        assert!(v[1].get("banner").is_none());
        assert_eq!(v[1]["port"], 80);
        assert_eq!(v[1]["open"], true);
    }

    #[test]
    fn report_file_has_summary_and_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.json");
        let report = ScanReport {
            summary: ScanSummary {
                total_ports_scanned: 2,
                open_count: 2,
                elapsed: Duration::from_millis(7250),
                started_at: "2026-01-01T00:00:00Z".into(),
            },
            results: sample(),
        };

        write_report_json(&path, &report).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["summary"]["total_ports_scanned"], 2);
        assert_eq!(v["summary"]["open_count"], 2);
        assert_eq!(v["summary"]["elapsed_ms"], 7250);
        assert_eq!(v["results"][0]["port"], 22);
        assert!(v["results"][1].get("banner").is_none());
    }

    #[test]
    fn summary_has_expected_lines() {
        let s = ScanSummary {
            total_ports_scanned: 2,
            open_count: 1,
            elapsed: Duration::from_millis(1500),
            started_at: "2026-01-01T00:00:00Z".into(),
        };
        let text = summary_text(&s);
        assert!(text.contains("Total ports scanned: 2"));
        assert!(text.contains("Number of open ports: 1"));
        assert!(text.contains("Total time taken: 1.50s"));
    }

    #[test]
    fn table_sorts_and_escapes() {
        let mut rows = sample();
        rows.reverse();
        let table = results_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[2].contains("22") && lines[2].contains("SSH-2.0-x\\r\\n"));
        assert!(lines[3].contains("80"));
    }
}
