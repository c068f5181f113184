pub mod calculators;
pub mod export;
pub mod grant;
pub mod portfolio;
pub mod settings;
pub mod vesting;

use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::debug;

use vestcalc_core::date_math;
use vestcalc_core::store::{FileStorage, PortfolioStore, StoreConfig};

/// Everything a subcommand needs from the global flags.
pub struct Context {
    pub data_dir: PathBuf,
    pub as_of: NaiveDate,
    pub store_config: StoreConfig,
}

impl Context {
    pub fn new(data_dir: PathBuf, as_of: Option<NaiveDate>, debounce_ms: Option<u64>) -> Self {
        let mut store_config = StoreConfig::default();
        if let Some(ms) = debounce_ms {
            store_config.debounce_ms = ms;
        }
        Context {
            data_dir,
            as_of: as_of.unwrap_or_else(date_math::today),
            store_config,
        }
    }

    pub fn open_store(&self) -> PortfolioStore<FileStorage> {
        debug!(
            data_dir = %self.data_dir.display(),
            key = %self.store_config.storage_key,
            "opening portfolio store"
        );
        PortfolioStore::open(
            FileStorage::new(self.data_dir.clone()),
            self.store_config.clone(),
        )
    }
}
