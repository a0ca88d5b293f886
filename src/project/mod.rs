//! Project definition and annual certificate generation

mod data;
mod generation;

pub use data::{ProjectConfig, Technology, TechnologyCapacity, SOLAR_CUF, WIND_CUF};
pub use generation::{annual_units, Generation, TechnologyOutput, HOURS_PER_YEAR};
