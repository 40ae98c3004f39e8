//! Application state.

use std::path::Path;
use std::sync::Arc;

use labdeck_core::Settings;
use labdeck_scan::{DiscoveryEngine, NmapScanner, ScanScheduler};
use labdeck_store::{ConfigStore, DiscoveryCache};

use crate::auth::secret_digest;

/// Filename of the discovery cache under the data directory.
const DISCOVERIES_FILE: &str = "discoveries.json";

/// Discovery cache rooted in the configured data directory. Shared by
/// the server state and the one-shot CLI mode.
pub fn discovery_cache(settings: &Settings) -> DiscoveryCache {
    DiscoveryCache::new(Path::new(&settings.data_dir).join(DISCOVERIES_FILE))
}

/// Shared state behind every route.
pub struct AppState {
    pub store: ConfigStore,
    pub cache: Arc<DiscoveryCache>,
    pub engine: Arc<DiscoveryEngine>,
    pub scheduler: ScanScheduler,
    /// SHA-256 digests of the configured secrets. Plaintext credentials
    /// are never held in memory.
    pub api_key_digest: Option<[u8; 32]>,
    pub bearer_digest: Option<[u8; 32]>,
}

impl AppState {
    pub fn new(settings: &Settings) -> labdeck_store::Result<Self> {
        let store = ConfigStore::new(&settings.data_dir, settings.backup_keep)?;
        let cache = Arc::new(discovery_cache(settings));
        let engine = Arc::new(DiscoveryEngine::new(NmapScanner::new(&settings.nmap_path)));
        let scheduler = ScanScheduler::new(engine.clone(), cache.clone());

        Ok(Self {
            store,
            cache,
            engine,
            scheduler,
            api_key_digest: settings.api_key.as_deref().map(secret_digest),
            bearer_digest: settings.bearer_token.as_deref().map(secret_digest),
        })
    }
}
