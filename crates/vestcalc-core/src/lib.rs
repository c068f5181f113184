pub mod date_math;
pub mod error;
pub mod grant;
pub mod types;
pub mod vesting;

#[cfg(feature = "valuation")]
pub mod valuation;

#[cfg(feature = "portfolio")]
pub mod portfolio;

#[cfg(feature = "store")]
pub mod store;

#[cfg(feature = "export")]
pub mod export;

pub use error::VestCalcError;
pub use grant::{Grant, GrantInput, PortfolioSettings, VestingFrequency};
pub use types::*;

/// Standard result type for all vestcalc operations
pub type VestCalcResult<T> = Result<T, VestCalcError>;
