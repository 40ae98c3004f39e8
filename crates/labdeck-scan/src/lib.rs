//! labdeck-scan: Liveness probes and nmap-driven discovery for labdeck.
//!
//! Wraps nmap to sweep subnets and probe services, fingerprints the
//! results into roles and dashboard links, evaluates per-host health
//! checks, and runs the recurring scan schedule.

pub mod discovery;
pub mod error;
pub mod fingerprint;
pub mod probe;
pub mod scanner;
pub mod scheduler;

pub use discovery::{run_discovery, DiscoveryEngine};
pub use error::{Result, ScanError};
pub use scanner::NmapScanner;
pub use scheduler::ScanScheduler;
