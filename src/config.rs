use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NbvError, Result};

/// Parameters of the two candidate samplers and the reference mesh they run against.
///
/// Every field has a default, so a partial JSON file only overrides what it names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub mesh_path: PathBuf,
    pub sphere_samples: usize,
    pub sphere_radius: f64,
    pub normal_views: usize,
    pub normal_distance: f64,
    /// How many nearest surface samples feed each normal estimate.
    pub normal_neighbors: usize,
    /// Seed for surface sampling. `None` draws fresh entropy on every call.
    pub seed: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            mesh_path: PathBuf::from("model.stl"),
            sphere_samples: 8,
            sphere_radius: 0.5,
            normal_views: 8,
            normal_distance: 0.3,
            normal_neighbors: 30,
            seed: None,
        }
    }
}

impl PlannerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Rejects settings that would make every request fail.
    pub fn validate(&self) -> Result<()> {
        check_count("sphere_samples", self.sphere_samples)?;
        check_count("normal_views", self.normal_views)?;
        check_count("normal_neighbors", self.normal_neighbors)?;
        check_distance("sphere_radius", self.sphere_radius)?;
        check_distance("normal_distance", self.normal_distance)?;
        Ok(())
    }
}

pub(crate) fn check_count(what: &'static str, count: usize) -> Result<()> {
    if count == 0 {
        return Err(NbvError::InvalidSampleCount { what, count });
    }
    Ok(())
}

pub(crate) fn check_distance(what: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(NbvError::InvalidDistance { what, value });
    }
    Ok(())
}
