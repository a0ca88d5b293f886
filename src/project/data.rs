//! Project configuration: installed capacity and utilization per technology

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::EngineError;

/// Standard Indian solar capacity utilization factor
pub const SOLAR_CUF: f64 = 0.20;

/// Standard Indian wind capacity utilization factor
pub const WIND_CUF: f64 = 0.35;

/// Generation technology of a plant segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Technology {
    Solar,
    Wind,
    Hydro,
    Biomass,
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Technology::Solar => "Solar",
            Technology::Wind => "Wind",
            Technology::Hydro => "Hydro",
            Technology::Biomass => "Biomass",
        };
        f.pad(label)
    }
}

/// Nameplate capacity and utilization for one technology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyCapacity {
    pub technology: Technology,

    /// Nameplate capacity in MW
    pub capacity_mw: f64,

    /// Capacity utilization factor, 0 < cuf <= 1
    pub cuf: f64,
}

/// A renewable project whose output is certified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Display label only
    #[serde(default = "default_project_name")]
    pub name: String,

    pub technologies: Vec<TechnologyCapacity>,
}

fn default_project_name() -> String {
    "Hybrid Wind-Solar Project".to_string()
}

impl ProjectConfig {
    /// Create an empty project; add segments with [`ProjectConfig::with_technology`]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            technologies: Vec::new(),
        }
    }

    pub fn with_technology(mut self, technology: Technology, capacity_mw: f64, cuf: f64) -> Self {
        self.technologies.push(TechnologyCapacity {
            technology,
            capacity_mw,
            cuf,
        });
        self
    }

    /// Wind-solar hybrid using the standard Indian utilization factors
    pub fn hybrid(name: impl Into<String>, solar_mw: f64, wind_mw: f64) -> Self {
        Self::new(name)
            .with_technology(Technology::Solar, solar_mw, SOLAR_CUF)
            .with_technology(Technology::Wind, wind_mw, WIND_CUF)
    }

    /// Combined nameplate capacity across all technologies (MW)
    pub fn total_capacity_mw(&self) -> f64 {
        self.technologies.iter().map(|t| t.capacity_mw).sum()
    }

    pub fn capacity_of(&self, technology: Technology) -> Option<&TechnologyCapacity> {
        self.technologies.iter().find(|t| t.technology == technology)
    }

    /// Check capacity and utilization bounds.
    ///
    /// All-zero capacity is accepted: it produces zero volume and undefined
    /// per-unit metrics downstream rather than an error.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.technologies.is_empty() {
            return Err(EngineError::invalid(
                "project.technologies",
                "at least one technology is required",
            ));
        }

        let mut seen = HashSet::new();
        for tech in &self.technologies {
            if !seen.insert(tech.technology) {
                return Err(EngineError::invalid(
                    format!("project.technologies.{}", tech.technology),
                    "technology listed more than once",
                ));
            }
            validate_segment(tech.technology, tech.capacity_mw, tech.cuf)?;
        }

        Ok(())
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self::hybrid(default_project_name(), 10.0, 15.0)
    }
}

fn validate_segment(technology: Technology, capacity_mw: f64, cuf: f64) -> Result<(), EngineError> {
    if !capacity_mw.is_finite() || capacity_mw < 0.0 {
        return Err(EngineError::invalid(
            format!("{technology}.capacity_mw"),
            format!("must be a finite value >= 0, got {capacity_mw}"),
        ));
    }
    if !cuf.is_finite() || cuf <= 0.0 || cuf > 1.0 {
        return Err(EngineError::invalid(
            format!("{technology}.cuf"),
            format!("must be in (0, 1], got {cuf}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hybrid_defaults() {
        let project = ProjectConfig::hybrid("Alpha", 10.0, 15.0);
        assert_eq!(project.technologies.len(), 2);
        assert_eq!(project.total_capacity_mw(), 25.0);
        assert_eq!(project.capacity_of(Technology::Wind).map(|t| t.cuf), Some(WIND_CUF));
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_rejects_negative_capacity() {
        let project = ProjectConfig::hybrid("Bad", -1.0, 15.0);
        assert!(matches!(
            project.validate(),
            Err(EngineError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_rejects_cuf_out_of_range() {
        let zero = ProjectConfig::new("Zero CUF").with_technology(Technology::Solar, 5.0, 0.0);
        assert!(zero.validate().is_err());

        let above = ProjectConfig::new("High CUF").with_technology(Technology::Solar, 5.0, 1.01);
        assert!(above.validate().is_err());

        let full = ProjectConfig::new("Full CUF").with_technology(Technology::Hydro, 5.0, 1.0);
        assert!(full.validate().is_ok());
    }

    #[test]
    fn test_rejects_duplicates_and_empty() {
        assert!(ProjectConfig::new("Empty").validate().is_err());

        let dup = ProjectConfig::new("Dup")
            .with_technology(Technology::Solar, 1.0, 0.2)
            .with_technology(Technology::Solar, 2.0, 0.2);
        assert!(dup.validate().is_err());
    }

    #[test]
    fn test_zero_capacity_is_valid() {
        let project = ProjectConfig::hybrid("Idle", 0.0, 0.0);
        assert!(project.validate().is_ok());
        assert_eq!(project.total_capacity_mw(), 0.0);
    }

    #[test]
    fn test_deserialize_snake_case_technology() {
        let json = r#"{"name":"P","technologies":[{"technology":"solar","capacity_mw":4.0,"cuf":0.19}]}"#;
        let project: ProjectConfig = serde_json::from_str(json).unwrap();
        assert_eq!(project.technologies[0].technology, Technology::Solar);
    }
}
