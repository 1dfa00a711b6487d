//! Core configuration for vizij-temporal-core.

use serde::{Deserialize, Serialize};

use crate::error::TemporalError;
use crate::interp::InterpolationAlgorithm;

/// Per-property configuration.
/// Keep this minimal; expand as needed without breaking API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Algorithm given to newly created sample tables.
    pub default_algorithm: InterpolationAlgorithm,
    /// Degree given to newly created sample tables.
    pub default_degree: u32,
    /// Initial capacity hint for the scratch pool (number of tables).
    pub scratch_tables: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_algorithm: InterpolationAlgorithm::Linear,
            default_degree: 1,
            scratch_tables: 4,
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self, TemporalError> {
        Ok(serde_json::from_str(text)?)
    }
}
