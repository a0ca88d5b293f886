//! Annual certificate volume from capacity and utilization

use serde::{Deserialize, Serialize};

use super::data::{ProjectConfig, Technology};
use crate::error::EngineError;

/// Hours in a projection year. Leap years are not modeled.
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Annual energy output in MWh, one certificate per MWh
pub fn annual_units(capacity_mw: f64, cuf: f64) -> f64 {
    capacity_mw * HOURS_PER_YEAR * cuf
}

/// Annual output of one technology segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyOutput {
    pub technology: Technology,
    pub capacity_mw: f64,
    pub annual_units: f64,
}

/// Certificate-eligible generation for a project.
///
/// Capacity is constant over the horizon, so this is computed once per
/// projection request and reused for every year and scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub outputs: Vec<TechnologyOutput>,
    pub total_capacity_mw: f64,
    pub total_units: f64,
}

impl Generation {
    pub fn from_project(project: &ProjectConfig) -> Result<Self, EngineError> {
        project.validate()?;

        let mut outputs = Vec::with_capacity(project.technologies.len());
        for tech in &project.technologies {
            outputs.push(TechnologyOutput {
                technology: tech.technology,
                capacity_mw: tech.capacity_mw,
                annual_units: annual_units(tech.capacity_mw, tech.cuf),
            });
        }

        let total_units = outputs.iter().map(|o| o.annual_units).sum();
        let total_capacity_mw = outputs.iter().map(|o| o.capacity_mw).sum();

        Ok(Self {
            outputs,
            total_capacity_mw,
            total_units,
        })
    }

    /// Units for a technology, zero if the project has none
    pub fn units_for(&self, technology: Technology) -> f64 {
        self.outputs
            .iter()
            .find(|o| o.technology == technology)
            .map(|o| o.annual_units)
            .unwrap_or(0.0)
    }

    pub fn has_volume(&self) -> bool {
        self.total_units > 0.0
    }
}
