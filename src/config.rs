//! Run configuration, loadable from TOML.
//!
//! ```toml
//! tau = 1.1
//! nx = 3
//! ny = 24
//! force = [1.0e-8, 0.0]
//! depth = 24.0
//! dx = 1.0
//!
//! [run]
//! tolerance = 1.0e-10
//! max_iterations = 2000000
//! log_every = 1000
//! ```
//!
//! Every key is optional; missing keys take the values above.

use crate::error::{LbmError, Result};
use crate::solver::RunControls;
use crate::FloatNum;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// BGK relaxation time, must be > 0.5.
    pub tau: FloatNum,
    /// Nodes along the periodic axis.
    pub nx: usize,
    /// Nodes across the duct, between the two walls.
    pub ny: usize,
    /// Body force per unit mass in lattice units.
    pub force: [FloatNum; 2],
    /// Uniform aperture in lattice units.
    pub depth: FloatNum,
    /// Lattice spacing used to scale velocities and permeability.
    pub dx: FloatNum,
    pub run: RunControls,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            tau: 1.1,
            nx: 3,
            ny: 24,
            force: [1.0e-8, 0.0],
            depth: 24.0,
            dx: 1.0,
            run: RunControls::default(),
        }
    }
}

impl SimConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimConfig =
            toml::from_str(content).map_err(|e| LbmError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| LbmError::Config(e.to_string()))
    }

    /// Kinematic viscosity implied by `tau`.
    pub fn viscosity(&self) -> FloatNum {
        (self.tau - 0.5) / 3.0
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tau.is_finite() || self.tau <= 0.5 {
            return Err(LbmError::invalid("tau", self.tau, "must be greater than 0.5"));
        }
        if self.nx == 0 {
            return Err(LbmError::invalid("nx", self.nx, "must be positive"));
        }
        if self.ny == 0 {
            return Err(LbmError::invalid("ny", self.ny, "must be positive"));
        }
        if self.force.iter().any(|g| !g.is_finite()) {
            return Err(LbmError::invalid(
                "force",
                format!("{:?}", self.force),
                "must be finite",
            ));
        }
        if !self.depth.is_finite() || self.depth <= 0.0 {
            return Err(LbmError::invalid("depth", self.depth, "must be finite and positive"));
        }
        if !self.dx.is_finite() || self.dx <= 0.0 {
            return Err(LbmError::invalid("dx", self.dx, "must be finite and positive"));
        }
        self.run.validate()
    }
}
