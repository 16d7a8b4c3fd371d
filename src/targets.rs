use crate::error::ScanError;
use ipnet::IpNet;
use std::net::IpAddr;

pub const DEFAULT_TARGET: &str = "scanme.nmap.org";

/// Valid hosts in input order plus one error per rejected token.
#[derive(Debug, Default)]
pub struct ParsedTargets {
    pub hosts: Vec<String>,
    pub rejected: Vec<ScanError>,
}

/// Parse a comma-separated list of hostnames, IP literals and IPv4 CIDRs.
///
/// CIDRs expand to their host addresses. Order and duplicates are kept.
pub fn parse_target_list(s: &str) -> ParsedTargets {
    let mut out = ParsedTargets::default();
    for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match parse_target(token) {
            Ok(hosts) => out.hosts.extend(hosts),
            Err(e) => out.rejected.push(e),
        }
    }
    out
}

fn parse_target(token: &str) -> Result<Vec<String>, ScanError> {
    if token.contains('/') {
        let net = token
            .parse::<IpNet>()
            .map_err(|e| ScanError::InvalidTarget(format!("{token}: {e}")))?;
        let hosts = cidr_hosts(net);
        if hosts.is_empty() {
            return Err(ScanError::InvalidTarget(format!(
                "{token}: no scannable host addresses"
            )));
        }
        return Ok(hosts.into_iter().map(|ip| ip.to_string()).collect());
    }

    if let Ok(ip) = token.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
        return Ok(vec![ip.to_string()]);
    }

    if is_valid_hostname(token) {
        Ok(vec![token.to_string()])
    } else {
        Err(ScanError::InvalidTarget(token.to_string()))
    }
}

/// Host addresses a CIDR token stands for, in ascending order.
///
/// IPv4 networks drop their network and broadcast addresses except for /31
/// and /32, which have none. IPv6 networks are not swept and give nothing.
pub fn cidr_hosts(net: IpNet) -> Vec<IpAddr> {
    match net {
        IpNet::V4(v4) => v4.hosts().map(IpAddr::V4).collect(),
        IpNet::V6(_) => Vec::new(),
    }
}

/// RFC 1123 hostname syntax: dot-separated labels of 1-63 alphanumerics or
/// hyphens, no leading/trailing hyphen, 253 chars total.
fn is_valid_hostname(s: &str) -> bool {
    let s = s.strip_suffix('.').unwrap_or(s);
    if s.is_empty() || s.len() > 253 {
        return false;
    }
    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}
