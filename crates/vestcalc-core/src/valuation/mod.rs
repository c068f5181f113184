pub mod calculators;
pub mod intrinsic;
pub mod what_if;

pub use crate::grant::validate_tax_rate;
pub use intrinsic::{
    after_tax_value, exit_scenario_value, intrinsic_value_per_unit, position_value,
    ExitScenarioValue,
};
