//! Scenario schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub units: UnitsDef,
    #[serde(default)]
    pub reservoirs: Vec<ReservoirDef>,
    #[serde(default)]
    pub fluxes: Vec<FluxDef>,
    #[serde(default)]
    pub run: RunDef,
}

/// Display labels; never used for conversion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitsDef {
    pub mass: String,
    pub time: String,
}

impl Default for UnitsDef {
    fn default() -> Self {
        Self {
            mass: "T".to_string(),
            time: "yr".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReservoirDef {
    pub key: u32,
    pub name: String,
    #[serde(default = "default_m0")]
    pub m0: f64,
}

fn default_m0() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FluxDef {
    pub from: u32,
    pub to: u32,
    #[serde(default)]
    pub name: String,
    pub law: FluxLawDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FluxLawDef {
    /// Fixed rate.
    Constant { rate: f64 },
    /// `k * source mass`.
    Proportional { k: f64 },
    /// `rate + slope * t`.
    Linear { rate: f64, slope: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunDef {
    #[serde(default)]
    pub t_start: f64,
    pub t_end: f64,
    #[serde(default = "default_t_step")]
    pub t_step: f64,
    /// Steps between progress notices; 0 disables them.
    #[serde(default)]
    pub progress_interval: usize,
}

fn default_t_step() -> f64 {
    1.0
}

impl Default for RunDef {
    fn default() -> Self {
        Self {
            t_start: 0.0,
            t_end: 10_000.0,
            t_step: 1.0,
            progress_interval: 0,
        }
    }
}
