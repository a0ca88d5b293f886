//! I-REC Projection - Revenue and cost projection engine for renewable energy certificates
//!
//! This library provides:
//! - Annual certificate volume from project capacity and utilization
//! - Registry, issuer, and verification fee modeling (one-time, recurring, amortized)
//! - Multi-currency fee and price conversion into a reporting currency
//! - Multi-year, multi-scenario revenue, cost, and success fee projections
//! - CSV loaders for fee schedules and exchange rates, CSV export of results

pub mod error;
pub mod project;
pub mod assumptions;
pub mod projection;
pub mod scenario;
pub mod request;

// Re-export commonly used types
pub use error::{EngineError, LoadError};
pub use project::{ProjectConfig, Technology};
pub use assumptions::{Assumptions, ExchangeRates, FeeItem, FeeSchedule, MarketAssumptions, Price, PriceScenario};
pub use projection::{project, AggregateResult, ProjectionEngine, ProjectionHorizon, UnitMetric, YearResult};
pub use scenario::ScenarioRunner;
pub use request::ProjectionRequest;
