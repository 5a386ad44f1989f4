use std::io;
use std::net::IpAddr;

use crate::error::PingError;

/// Resolves an endpoint to an address, preferring IPv4.
pub async fn resolve_host(host: &str) -> Result<IpAddr, PingError> {
    if let Ok(addr) = host.parse::<IpAddr>() {
        return Ok(addr);
    }

    let addrs: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|e| PingError::ResolutionError(format!("Failed to resolve {}: {}", host, e)))?
        .map(|addr| addr.ip())
        .collect();

    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| PingError::ResolutionError(format!("No addresses found for {}", host)))
}

/// Reads one endpoint per line. Lines are trimmed; blank lines and lines
/// starting with `#` are comments and never become endpoints.
pub fn load_hosts_from_file(file_path: &str) -> io::Result<Vec<String>> {
    let file_content = std::fs::read_to_string(file_path)?;

    Ok(file_content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ip_literals_skip_resolution() {
        assert_eq!(resolve_host("10.0.0.1").await.unwrap(), "10.0.0.1".parse::<IpAddr>().unwrap());
        assert_eq!(resolve_host("::1").await.unwrap(), "::1".parse::<IpAddr>().unwrap());
    }

    #[tokio::test]
    async fn localhost_resolves() {
        assert!(resolve_host("localhost").await.unwrap().is_loopback());
    }

    #[test]
    fn hosts_file_keeps_order_and_trims() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts.txt");
        std::fs::write(&path, "  b.example \r\n#skip\n\na.example\n").unwrap();

        let hosts = load_hosts_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(hosts, vec!["b.example", "a.example"]);
    }
}
