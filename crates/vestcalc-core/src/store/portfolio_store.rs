use chrono::Utc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::grant::{Grant, GrantInput, PortfolioSettings};
use crate::store::config::StoreConfig;
use crate::store::ids::IdGenerator;
use crate::store::scheduler::SaveScheduler;
use crate::store::state::PersistedState;
use crate::store::storage::KeyValueStorage;
use crate::VestCalcResult;

/// Owns the grant collection and settings, and persists them through a
/// [`KeyValueStorage`] with debounced writes.
///
/// Nothing else mutates portfolio state. Any snapshot still pending when the
/// store is dropped is written on drop.
pub struct PortfolioStore<S: KeyValueStorage> {
    storage: S,
    config: StoreConfig,
    state: PersistedState,
    scheduler: SaveScheduler<PersistedState>,
    ids: IdGenerator,
}

impl<S: KeyValueStorage> PortfolioStore<S> {
    /// An empty store with default settings. Nothing is read from storage.
    pub fn new(storage: S, config: StoreConfig) -> Self {
        let scheduler = SaveScheduler::new(config.debounce());
        PortfolioStore {
            storage,
            config,
            state: PersistedState::default(),
            scheduler,
            ids: IdGenerator::default(),
        }
    }

    /// Construct and restore the persisted portfolio.
    pub fn open(storage: S, config: StoreConfig) -> Self {
        let mut store = Self::new(storage, config);
        store.load();
        store
    }

    /// Restore state from storage. Missing, unreadable or corrupt records
    /// fall back to an empty portfolio with default settings.
    pub fn load(&mut self) {
        let key = self.config.storage_key.as_str();
        self.state = match self.storage.get(key) {
            Ok(Some(raw)) => match PersistedState::decode(&raw) {
                Ok(state) => {
                    debug!(key, grants = state.grants.len(), "Loaded portfolio");
                    state
                }
                Err(e) => {
                    warn!(key, error = %e, "Stored portfolio is corrupt; starting from defaults");
                    PersistedState::default()
                }
            },
            Ok(None) => {
                debug!(key, "No stored portfolio; starting from defaults");
                PersistedState::default()
            }
            Err(e) => {
                warn!(key, error = %e, "Storage unavailable; starting from defaults");
                PersistedState::default()
            }
        };
        self.scheduler.cancel();
        self.ids = IdGenerator::seeded(self.state.grants.iter().map(|g| g.id.as_str()));
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    pub fn grants(&self) -> &[Grant] {
        &self.state.grants
    }

    pub fn grant(&self, id: &str) -> Option<&Grant> {
        self.state.grants.iter().find(|g| g.id == id)
    }

    pub fn settings(&self) -> &PortfolioSettings {
        &self.state.settings
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Validate, assign a fresh id and append. Returns the stored record.
    pub fn add_grant(&mut self, candidate: GrantInput) -> VestCalcResult<Grant> {
        candidate.validate()?;
        let grant = candidate.into_grant(self.ids.next_id());
        debug!(grant_id = %grant.id, name = %grant.name, "Adding grant");
        self.state.grants.push(grant.clone());
        self.schedule_save();
        Ok(grant)
    }

    /// Replace the record with `id`, keeping the id. Returns `false` without
    /// touching anything when no grant has that id.
    pub fn update_grant(&mut self, id: &str, replacement: GrantInput) -> VestCalcResult<bool> {
        replacement.validate()?;
        let Some(slot) = self.state.grants.iter_mut().find(|g| g.id == id) else {
            debug!(grant_id = id, "Update ignored; no such grant");
            return Ok(false);
        };
        *slot = replacement.into_grant(id);
        self.schedule_save();
        Ok(true)
    }

    /// Remove the record with `id`. Returns `false` when there was none.
    pub fn delete_grant(&mut self, id: &str) -> bool {
        let before = self.state.grants.len();
        self.state.grants.retain(|g| g.id != id);
        if self.state.grants.len() == before {
            debug!(grant_id = id, "Delete ignored; no such grant");
            return false;
        }
        self.schedule_save();
        true
    }

    pub fn update_settings(&mut self, settings: PortfolioSettings) -> VestCalcResult<()> {
        settings.validate()?;
        self.state.settings = settings;
        self.schedule_save();
        Ok(())
    }

    /// Discard every grant, scenario and setting and delete the stored
    /// record. If the delete fails, a save of the empty portfolio is left
    /// pending instead. Confirmation is the caller's job.
    pub fn clear_all(&mut self) -> VestCalcResult<()> {
        info!(
            grants = self.state.grants.len(),
            "Clearing all portfolio data"
        );
        self.scheduler.cancel();
        self.state = PersistedState::default();
        self.ids = IdGenerator::default();
        if let Err(e) = self.storage.remove(&self.config.storage_key) {
            // The old record is still stored; overwrite it with the defaults.
            error!(key = %self.config.storage_key, error = %e, "Failed to remove stored portfolio");
            self.schedule_save();
            return Err(e);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub fn has_pending_save(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn next_save_due(&self) -> Option<Instant> {
        self.scheduler.due_at()
    }

    /// Event-loop tick: write the pending snapshot if its window has passed.
    /// Returns whether a write happened.
    pub fn poll(&mut self, now: Instant) -> VestCalcResult<bool> {
        match self.scheduler.take_due(now) {
            Some(snapshot) => self.write(snapshot).map(|_| true),
            None => Ok(false),
        }
    }

    /// Write any pending snapshot immediately.
    pub fn flush(&mut self) -> VestCalcResult<bool> {
        match self.scheduler.take_now() {
            Some(snapshot) => self.write(snapshot).map(|_| true),
            None => Ok(false),
        }
    }

    fn schedule_save(&mut self) {
        self.scheduler.schedule(Instant::now(), self.state.clone());
        debug!(window_ms = self.config.debounce_ms, "Save scheduled");
    }

    fn write(&mut self, mut snapshot: PersistedState) -> VestCalcResult<()> {
        let stamp = Utc::now();
        snapshot.last_updated = stamp;
        let result = snapshot
            .encode()
            .and_then(|raw| self.storage.set(&self.config.storage_key, &raw));

        match result {
            Ok(()) => {
                self.state.last_updated = stamp;
                info!(
                    key = %self.config.storage_key,
                    grants = snapshot.grants.len(),
                    "Portfolio saved"
                );
                Ok(())
            }
            Err(e) => {
                error!(key = %self.config.storage_key, error = %e, "Failed to save portfolio");
                // Keep the data in memory and retry on the next tick.
                self.scheduler.schedule(Instant::now(), snapshot);
                Err(e)
            }
        }
    }
}

impl<S: KeyValueStorage> Drop for PortfolioStore<S> {
    fn drop(&mut self) {
        if self.scheduler.is_pending() {
            if let Err(e) = self.flush() {
                error!(error = %e, "Unsaved portfolio changes lost on shutdown");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::VestingFrequency;
    use crate::store::storage::MemoryStorage;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn input(name: &str) -> GrantInput {
        GrantInput {
            name: name.into(),
            num_options: 1000,
            strike_price: dec!(2.5),
            grant_date: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
            vesting_period: dec!(4),
            cliff_period: dec!(1),
            vesting_frequency: VestingFrequency::Quarterly,
        }
    }

    fn store() -> (PortfolioStore<MemoryStorage>, MemoryStorage) {
        let storage = MemoryStorage::new();
        let store = PortfolioStore::open(storage.clone(), StoreConfig::default());
        (store, storage)
    }

    #[test]
    fn test_opens_empty_with_default_settings() {
        let (s, _) = store();
        assert!(s.grants().is_empty());
        assert_eq!(s.settings().current_stock_price, dec!(50));
        assert_eq!(s.settings().tax_rate, dec!(30));
        assert!(!s.has_pending_save());
    }

    #[test]
    fn test_add_assigns_distinct_ids() {
        let (mut s, _) = store();
        let a = s.add_grant(input("a")).unwrap();
        let b = s.add_grant(input("b")).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(s.grants().len(), 2);
        assert_eq!(s.grant(&b.id).unwrap().name, "b");
    }

    #[test]
    fn test_add_rejects_invalid_candidate() {
        let (mut s, _) = store();
        let mut bad = input("bad");
        bad.cliff_period = dec!(10);
        assert!(s.add_grant(bad).is_err());
        assert!(s.grants().is_empty());
        assert!(!s.has_pending_save());
    }

    #[test]
    fn test_update_preserves_id() {
        let (mut s, _) = store();
        let a = s.add_grant(input("a")).unwrap();
        let mut replacement = input("renamed");
        replacement.num_options = 42;
        assert!(s.update_grant(&a.id, replacement).unwrap());
        let g = s.grant(&a.id).unwrap();
        assert_eq!(g.name, "renamed");
        assert_eq!(g.num_options, 42);
        assert_eq!(g.id, a.id);
    }

    #[test]
    fn test_unknown_ids_are_silent_no_ops() {
        let (mut s, storage) = store();
        assert!(!s.update_grant("missing", input("x")).unwrap());
        assert!(!s.delete_grant("missing"));
        assert!(!s.has_pending_save());
        s.flush().unwrap();
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn test_writes_are_debounced() {
        let (mut s, storage) = store();
        s.add_grant(input("a")).unwrap();
        s.add_grant(input("b")).unwrap();
        s.add_grant(input("c")).unwrap();

        assert!(!s.poll(Instant::now()).unwrap());
        assert_eq!(storage.write_count(), 0);

        let later = Instant::now() + Duration::from_millis(600);
        assert!(s.poll(later).unwrap());
        assert_eq!(storage.write_count(), 1);

        let saved = PersistedState::decode(&storage.raw("stockOptionsData").unwrap()).unwrap();
        assert_eq!(saved.grants.len(), 3);
    }

    #[test]
    fn test_drop_flushes_pending_write() {
        let storage = MemoryStorage::new();
        {
            let mut s = PortfolioStore::open(storage.clone(), StoreConfig::default());
            s.add_grant(input("a")).unwrap();
        }
        assert_eq!(storage.write_count(), 1);
        let reopened = PortfolioStore::open(storage, StoreConfig::default());
        assert_eq!(reopened.grants().len(), 1);
    }

    #[test]
    fn test_clear_all_resets_and_removes_record() {
        let (mut s, storage) = store();
        s.add_grant(input("a")).unwrap();
        s.update_settings(PortfolioSettings {
            current_stock_price: dec!(80),
            tax_rate: dec!(40),
        })
        .unwrap();
        s.flush().unwrap();
        assert!(storage.raw("stockOptionsData").is_some());

        s.clear_all().unwrap();
        assert!(s.grants().is_empty());
        assert_eq!(*s.settings(), PortfolioSettings::default());
        assert!(!s.has_pending_save());
        assert!(storage.raw("stockOptionsData").is_none());
    }

    #[test]
    fn test_corrupt_record_falls_back_to_defaults() {
        let mut storage = MemoryStorage::new();
        storage.set("stockOptionsData", "{{{ definitely not json").unwrap();
        let s = PortfolioStore::open(storage, StoreConfig::default());
        assert!(s.grants().is_empty());
        assert_eq!(*s.settings(), PortfolioSettings::default());
    }

    #[test]
    fn test_settings_validated() {
        let (mut s, _) = store();
        let err = s.update_settings(PortfolioSettings {
            current_stock_price: dec!(10),
            tax_rate: dec!(150),
        });
        assert!(err.is_err());
        assert_eq!(*s.settings(), PortfolioSettings::default());
    }
}
