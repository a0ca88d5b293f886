//! Projection engine for single and multi-scenario certificate revenue projections

mod state;
mod engine;
mod cashflows;
mod resolver;
pub mod export;

pub use state::{ProjectionState, ScenarioPrices, YearContext};
pub use engine::{project, ProjectionEngine, ProjectionHorizon, MAX_HORIZON_YEARS};
pub use cashflows::{AggregateResult, CostPerUnit, FeeLine, TechnologyRevenue, UnitMetric, YearResult};
pub use resolver::{resolve_fee, resolve_year, select_tier, ResolvedFees};
