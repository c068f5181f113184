//! Authoritative in-memory portfolio with debounced persistence.
//!
//! [`PortfolioStore`] owns the grant collection and the settings. Every
//! mutation replaces a single pending-write slot; the host's event loop
//! calls [`PortfolioStore::poll`] and the write happens once the slot has
//! gone a full debounce window without being replaced.

pub mod config;
pub mod ids;
pub mod portfolio_store;
pub mod scheduler;
pub mod state;
pub mod storage;

pub use config::StoreConfig;
pub use ids::IdGenerator;
pub use portfolio_store::PortfolioStore;
pub use scheduler::SaveScheduler;
pub use state::{PersistedState, STATE_VERSION};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
