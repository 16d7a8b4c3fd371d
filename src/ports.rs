use crate::error::ScanError;

/// Outcome of parsing a port list: the valid ports in input order plus one
/// error per rejected token.
#[derive(Debug, Default)]
pub struct ParsedPorts {
    pub ports: Vec<u16>,
    pub rejected: Vec<ScanError>,
}

/// Parse a comma-separated port list into TCP ports (1..=65535).
///
/// Supported tokens:
/// - single port number: `80`
/// - inclusive range: `8000-8010`
///
/// Whitespace and empty tokens are ignored. Duplicates are kept as given.
/// Bad tokens are collected in `rejected` and skipped.
pub fn parse_port_list(s: &str) -> ParsedPorts {
    let mut out = ParsedPorts::default();

    for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some((a, b)) = token.split_once('-') {
            let (a, b) = (a.trim(), b.trim());
            match (parse_port_str(a), parse_port_str(b)) {
                (Ok(start), Ok(end)) if start <= end => out.ports.extend(start..=end),
                _ => out.rejected.push(ScanError::InvalidRange {
                    start: a.to_string(),
                    end: b.to_string(),
                }),
            }
            continue;
        }

        match parse_port_str(token) {
            Ok(p) => out.ports.push(p),
            Err(e) => out.rejected.push(e),
        }
    }

    out
}

/// Inclusive `start..=end`, clamped to valid TCP ports. Empty when `start > end`.
pub fn port_range(start: u32, end: u32) -> Vec<u16> {
    let start = start.max(1);
    let end = end.min(u16::MAX as u32);
    if start > end {
        return Vec::new();
    }
    (start as u16..=end as u16).collect()
}

fn parse_port_str(s: &str) -> Result<u16, ScanError> {
    let val: u32 = s
        .parse::<u32>()
        .map_err(|_| ScanError::InvalidPort(s.to_string()))?;
    if val == 0 || val > 65535 {
        return Err(ScanError::InvalidPort(s.to_string()));
    }
    Ok(val as u16)
}
