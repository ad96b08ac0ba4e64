//! Application context - storage and service wiring

use std::path::Path;
use std::sync::Arc;

use gruha_fraud::{FraudConfig, FraudEngine};
use gruha_ledger::SqliteWalletStore;
use gruha_wallet::WalletService;

/// Wires a SQLite-backed wallet service from a data directory.
///
/// The directory holds `gruha.db`; an optional `fraud.json` overrides
/// the fraud engine defaults.
pub struct AppContext {
    service: WalletService,
}

impl AppContext {
    pub fn new(data_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(data_dir)?;

        let config_path = data_dir.join("fraud.json");
        let config = if config_path.exists() {
            FraudConfig::from_file(&config_path)?
        } else {
            FraudConfig::default()
        };

        let store = SqliteWalletStore::new(data_dir.join("gruha.db"))?;
        let service = WalletService::new(Arc::new(store), FraudEngine::new(config));
        Ok(Self { service })
    }

    pub fn service(&self) -> &WalletService {
        &self.service
    }
}
