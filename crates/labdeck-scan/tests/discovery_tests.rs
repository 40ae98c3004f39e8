//! End-to-end discovery tests driven by a scripted stand-in for nmap.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use labdeck_scan::{run_discovery, DiscoveryEngine, NmapScanner, ScanError};
use labdeck_store::DiscoveryCache;

/// Emulates the two nmap invocations discovery makes: a `-sn` sweep
/// reporting three hosts and a per-host `-Pn -sV` probe. One host
/// always fails its probe to exercise the degraded path.
const FAKE_NMAP: &str = r#"#!/bin/sh
case "$1" in
  --version)
    echo "Nmap version 7.93 ( https://nmap.org )"
    ;;
  -sn)
    echo "Starting Nmap 7.93 ( https://nmap.org )"
    echo "Nmap scan report for router.lan (192.168.9.1)"
    echo "Host is up (0.0010s latency)."
    echo "Nmap scan report for 192.168.9.7"
    echo "Host is up (0.0020s latency)."
    echo "Nmap scan report for 192.168.9.66"
    echo "Host is up (0.0030s latency)."
    echo "Nmap done: 256 IP addresses (3 hosts up) scanned in 1.00 seconds"
    ;;
  *)
    for last; do :; done
    case "$last" in
      192.168.9.1)
        echo "PORT    STATE SERVICE  VERSION"
        echo "80/tcp  open  http     nginx 1.18.0"
        echo "443/tcp open  ssl/http nginx 1.18.0"
        ;;
      192.168.9.7)
        echo "PORT     STATE SERVICE VERSION"
        echo "22/tcp   open  ssh     OpenSSH 8.4p1"
        echo "3000/tcp open  http    Grafana http"
        ;;
      *)
        echo "Failed to resolve target" >&2
        exit 1
        ;;
    esac
    ;;
esac
"#;

const FAILING_NMAP: &str = r#"#!/bin/sh
echo "QUITTING: requires root privileges" >&2
exit 1
"#;

fn write_fake_nmap(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("nmap");
    fs::write(&path, contents).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn fake_engine(dir: &tempfile::TempDir, script: &str) -> DiscoveryEngine {
    let nmap = write_fake_nmap(dir, script);
    DiscoveryEngine::new(NmapScanner::new(nmap.to_str().unwrap()))
}

#[tokio::test]
async fn discover_probes_and_fingerprints_every_host() {
    let dir = tempfile::tempdir().unwrap();
    let engine = fake_engine(&dir, FAKE_NMAP);

    let hosts = engine.discover("192.168.9.0/24", 100).await.unwrap();
    assert_eq!(hosts.len(), 3);

    let router = &hosts[0];
    assert_eq!(router.address, "192.168.9.1");
    assert_eq!(router.open_ports, vec![80, 443]);
    assert_eq!(router.services, vec!["HTTP", "HTTPS"]);
    assert_eq!(router.role_guess.as_deref(), Some("Web server"));
    assert_eq!(router.suggested_links[0].url, "http://192.168.9.1");
    assert_eq!(router.suggested_links[1].url, "https://192.168.9.1");

    let grafana = &hosts[1];
    assert_eq!(grafana.address, "192.168.9.7");
    assert_eq!(grafana.open_ports, vec![22, 3000]);
    assert_eq!(grafana.services, vec!["SSH", "Grafana"]);
    assert_eq!(grafana.role_guess.as_deref(), Some("Monitoring"));
    assert!(grafana.labels.contains(&"grafana".to_string()));
    assert!(grafana.labels.contains(&"ssh".to_string()));
}

#[tokio::test]
async fn failed_service_probe_degrades_to_bare_host() {
    let dir = tempfile::tempdir().unwrap();
    let engine = fake_engine(&dir, FAKE_NMAP);

    let hosts = engine.discover("192.168.9.0/24", 100).await.unwrap();
    let bare = &hosts[2];
    assert_eq!(bare.address, "192.168.9.66");
    assert!(bare.open_ports.is_empty());
    assert!(bare.banners.is_empty());
    assert!(bare.services.is_empty());
    assert_eq!(bare.role_guess, None);
}

#[tokio::test]
async fn missing_binary_is_tool_missing() {
    let engine = DiscoveryEngine::new(NmapScanner::new("/nonexistent/bin/nmap"));
    let err = engine.discover("192.168.9.0/24", 100).await.unwrap_err();
    assert!(matches!(err, ScanError::ToolMissing { .. }));
}

#[tokio::test]
async fn failed_sweep_is_tool_failed_with_detail() {
    let dir = tempfile::tempdir().unwrap();
    let engine = fake_engine(&dir, FAILING_NMAP);

    let err = engine.discover("192.168.9.0/24", 100).await.unwrap_err();
    match err {
        ScanError::ToolFailed { detail } => assert!(detail.contains("QUITTING")),
        other => panic!("expected ToolFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn run_discovery_replaces_the_cache() {
    let dir = tempfile::tempdir().unwrap();
    let engine = fake_engine(&dir, FAKE_NMAP);
    let cache = DiscoveryCache::new(dir.path().join("last_scan.json"));

    // Stale contents from an earlier sweep.
    cache
        .replace(&[labdeck_core::types::Host::stub("10.9.9.9".to_string())])
        .unwrap();

    let hosts = run_discovery(&engine, &cache, "192.168.9.0/24", 100)
        .await
        .unwrap();
    assert_eq!(hosts.len(), 3);

    let cached = cache.load();
    assert_eq!(cached.len(), 3);
    assert_eq!(cached[0].address, "192.168.9.1");
}

#[tokio::test]
async fn scanner_verify_reports_version() {
    let dir = tempfile::tempdir().unwrap();
    let nmap = write_fake_nmap(&dir, FAKE_NMAP);
    let scanner = NmapScanner::new(nmap.to_str().unwrap());

    let banner = scanner.verify().await.unwrap();
    assert!(banner.starts_with("Nmap version 7.93"));
}
