//! labdeck-store: File persistence for the labdeck backend.
//!
//! Two stores, both plain JSON files under the data directory:
//! - [`ConfigStore`]: the live topology document with timestamped,
//!   retention-trimmed backups and validated restore.
//! - [`DiscoveryCache`]: a single-slot cache of the most recent
//!   discovery result, replaced wholesale on every scan.

pub mod cache;
pub mod error;
pub mod store;

pub use cache::DiscoveryCache;
pub use error::{Result, StoreError};
pub use store::ConfigStore;
