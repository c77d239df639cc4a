//! Application state: the read-only mission catalog and the user store.
//!
//! The catalog is assembled once from the TOML mission bank (MISSION_BANK_PATH)
//! and the built-in seeds. Users live in memory for the life of the process.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::catalog::MissionCatalog;
use crate::config::load_mission_bank_from_env;
use crate::seeds::seed_missions;
use crate::store::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<MissionCatalog>,
    pub users: UserStore,
}

impl AppState {
    /// Build state from env: load the bank, merge seeds, start with no users.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Self {
        let bank = load_mission_bank_from_env();
        let catalog = MissionCatalog::build(bank, seed_missions());
        if catalog.is_empty() {
            warn!(target: "cyberquest", "Mission catalog is empty; every submission will 404");
        }
        info!(target: "cyberquest", missions = catalog.len(), "Mission catalog ready");
        Self::with_catalog(catalog)
    }

    pub fn with_catalog(catalog: MissionCatalog) -> Self {
        Self { catalog: Arc::new(catalog), users: UserStore::new() }
    }
}
