//! On-disk cache of the most recent discovery sweep.
//!
//! The cache is replaced wholesale after each sweep and read back by
//! the API. It is advisory: a missing or unreadable file reads as an
//! empty host list rather than an error.

use std::fs;
use std::path::PathBuf;

use labdeck_core::types::Host;

use crate::error::Result;

/// Cache of the hosts found by the last discovery sweep.
pub struct DiscoveryCache {
    path: PathBuf,
}

impl DiscoveryCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Replace the cached host list with `hosts`.
    pub fn replace(&self, hosts: &[Host]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(hosts)?;
        fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), count = hosts.len(), "Discovery cache replaced");
        Ok(())
    }

    /// The cached host list, or empty if the cache is missing or stale
    /// beyond parsing.
    pub fn load(&self) -> Vec<Host> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(hosts) => hosts,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "Discarding unreadable discovery cache");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiscoveryCache::new(dir.path().join("last_scan.json"));
        assert!(cache.load().is_empty());
    }

    #[test]
    fn replace_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiscoveryCache::new(dir.path().join("last_scan.json"));

        let mut host = Host::stub("192.168.1.10".to_string());
        host.open_ports = vec![22, 80];
        cache.replace(std::slice::from_ref(&host)).unwrap();

        let hosts = cache.load();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].address, "192.168.1.10");
        assert_eq!(hosts[0].open_ports, vec![22, 80]);
    }

    #[test]
    fn replace_overwrites_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiscoveryCache::new(dir.path().join("last_scan.json"));

        let old: Vec<Host> = (0..3)
            .map(|i| Host::stub(format!("10.0.0.{i}")))
            .collect();
        cache.replace(&old).unwrap();

        let new = vec![Host::stub("10.0.0.99".to_string())];
        cache.replace(&new).unwrap();

        let hosts = cache.load();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].address, "10.0.0.99");
    }

    #[test]
    fn corrupt_cache_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_scan.json");
        fs::write(&path, "{broken").unwrap();

        let cache = DiscoveryCache::new(path);
        assert!(cache.load().is_empty());
    }

    #[test]
    fn replace_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiscoveryCache::new(dir.path().join("nested/deeper/last_scan.json"));
        cache.replace(&[]).unwrap();
        assert!(cache.load().is_empty());
        assert!(dir.path().join("nested/deeper/last_scan.json").exists());
    }
}
