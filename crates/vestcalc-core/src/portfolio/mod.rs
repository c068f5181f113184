pub mod aggregate;

pub use aggregate::{grant_breakdown, summarize, GrantPosition, PortfolioSnapshot};
