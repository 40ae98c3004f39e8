//! Subnet discovery.
//!
//! Drives the nmap wrapper through a full sweep: enumerate live hosts,
//! probe each one's services, fingerprint the results. Hosts are probed
//! sequentially, so wall time grows with the host count; a per-host
//! probe failure degrades that host to empty results instead of
//! aborting the batch.

use std::time::Instant;

use uuid::Uuid;

use labdeck_core::types::Host;
use labdeck_store::DiscoveryCache;

use crate::error::Result;
use crate::fingerprint;
use crate::scanner::NmapScanner;

/// Discovery pipeline over an [`NmapScanner`].
pub struct DiscoveryEngine {
    scanner: NmapScanner,
}

impl DiscoveryEngine {
    pub fn new(scanner: NmapScanner) -> Self {
        Self { scanner }
    }

    /// Sweep `subnet` and return the discovered hosts, service-probed
    /// and fingerprinted.
    ///
    /// The initial host sweep fails wholesale; per-host service probes
    /// do not.
    pub async fn discover(&self, subnet: &str, top_ports: u16) -> Result<Vec<Host>> {
        let scan_id = Uuid::new_v4();
        let start = Instant::now();

        tracing::info!(
            scan_id = %scan_id,
            subnet = %subnet,
            top_ports,
            "Starting discovery sweep"
        );

        let addresses = self.scanner.ping_sweep(subnet).await?;
        let mut hosts = Vec::with_capacity(addresses.len());

        for address in addresses {
            let mut host = Host::stub(address);
            match self.scanner.service_scan(&host.address, top_ports).await {
                Ok((ports, banners)) => {
                    host.open_ports = ports;
                    host.banners = banners;
                }
                Err(e) => {
                    tracing::warn!(
                        scan_id = %scan_id,
                        address = %host.address,
                        error = %e,
                        "Service probe failed, recording host without details"
                    );
                }
            }
            fingerprint::annotate(&mut host);
            hosts.push(host);
        }

        tracing::info!(
            scan_id = %scan_id,
            subnet = %subnet,
            hosts = hosts.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Discovery complete"
        );

        Ok(hosts)
    }
}

/// Discover `subnet` and replace the discovery cache with the result.
///
/// A cache write failure is logged but does not fail the discovery;
/// the hosts are still returned to the caller.
pub async fn run_discovery(
    engine: &DiscoveryEngine,
    cache: &DiscoveryCache,
    subnet: &str,
    top_ports: u16,
) -> Result<Vec<Host>> {
    let hosts = engine.discover(subnet, top_ports).await?;
    if let Err(e) = cache.replace(&hosts) {
        tracing::warn!(error = %e, "Failed to persist discovery cache");
    }
    Ok(hosts)
}
