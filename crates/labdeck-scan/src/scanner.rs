//! Nmap process wrapper.
//!
//! Executes nmap as a child process via `tokio::process::Command` and
//! parses its normal text output. Two invocations are used: a ping
//! sweep (`-sn`) to enumerate live hosts and a per-host service probe
//! (`-Pn -sV --top-ports N`) whose `/tcp` lines double as banners.

use std::process::Output;

use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::error::{Result, ScanError};

/// Wall-clock budget for a single nmap invocation.
const SCAN_TIMEOUT: Duration = Duration::from_secs(120);

/// Wrapper around the nmap binary.
pub struct NmapScanner {
    nmap_path: String,
}

impl NmapScanner {
    pub fn new(nmap_path: &str) -> Self {
        Self {
            nmap_path: nmap_path.to_string(),
        }
    }

    /// Verify nmap is installed and accessible, returning its version
    /// banner. Used at startup for a log line; a missing binary is
    /// reported, not fatal.
    pub async fn verify(&self) -> Result<String> {
        let output = Command::new(&self.nmap_path)
            .arg("--version")
            .output()
            .await
            .map_err(|_| ScanError::ToolMissing {
                path: self.nmap_path.clone(),
            })?;

        let banner = String::from_utf8_lossy(&output.stdout);
        Ok(banner.lines().next().unwrap_or_default().to_string())
    }

    /// Ping sweep: enumerate live host addresses in `subnet`.
    ///
    /// `subnet` is any target expression nmap accepts. Fails wholesale:
    /// a failed or timed-out sweep never yields a partial host list.
    pub async fn ping_sweep(&self, subnet: &str) -> Result<Vec<String>> {
        let output = self.run(&["-sn", subnet]).await?;
        Ok(parse_sweep(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Service probe against a single host: open TCP ports plus the raw
    /// `/tcp` output lines as banners.
    pub async fn service_scan(&self, addr: &str, top_ports: u16) -> Result<(Vec<u16>, Vec<String>)> {
        let top_ports = top_ports.to_string();
        let output = self
            .run(&["-Pn", "-sV", "--top-ports", &top_ports, addr])
            .await?;
        Ok(parse_service_lines(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn run(&self, args: &[&str]) -> Result<Output> {
        let mut cmd = Command::new(&self.nmap_path);
        cmd.args(args).kill_on_drop(true);

        let output = match timeout(SCAN_TIMEOUT, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(_)) => {
                return Err(ScanError::ToolMissing {
                    path: self.nmap_path.clone(),
                })
            }
            Err(_) => {
                return Err(ScanError::ToolFailed {
                    detail: format!("timed out after {}s", SCAN_TIMEOUT.as_secs()),
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = if stderr.trim().is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(ScanError::ToolFailed { detail });
        }

        Ok(output)
    }
}

/// Extract host addresses from `nmap -sn` output.
///
/// Each `Nmap scan report for …` line names one live host; the address
/// is the last whitespace token, with parentheses stripped for the
/// `hostname (addr)` form.
fn parse_sweep(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| line.contains("Nmap scan report for"))
        .filter_map(|line| line.split_whitespace().last())
        .map(|token| token.trim_matches(|c| c == '(' || c == ')').to_string())
        .filter(|addr| !addr.is_empty())
        .collect()
}

/// Extract open ports and banner lines from `nmap -sV` output.
///
/// Every line containing `/tcp` is kept verbatim (trimmed) as a banner;
/// when its leading `<port>/tcp` prefix is numeric the port is recorded
/// as open. Ports come back sorted and deduplicated; banners keep their
/// input order.
fn parse_service_lines(stdout: &str) -> (Vec<u16>, Vec<String>) {
    let mut ports = Vec::new();
    let mut banners = Vec::new();
    for line in stdout.lines() {
        if let Some((prefix, _)) = line.split_once("/tcp") {
            if let Ok(port) = prefix.trim().parse::<u16>() {
                ports.push(port);
            }
            banners.push(line.trim().to_string());
        }
    }
    ports.sort_unstable();
    ports.dedup();
    (ports, banners)
}
