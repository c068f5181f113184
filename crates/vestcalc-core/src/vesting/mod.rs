pub mod schedule;
pub mod timeline;

pub use schedule::{unvested_quantity, vested_fraction, vested_pct, vested_quantity};
pub use timeline::{next_vest_event, vesting_timeline, VestingEvent};
