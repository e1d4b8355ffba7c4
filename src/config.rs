//! # Configuration
//!
//! Tunable planner constants and per-run simulation settings. Both are
//! `serde` structs with per-field defaults so a YAML file only needs to name
//! the values it changes. The core assumes sanitized input; validation lives
//! here and is run by collaborators (batch runner, CLI, bindings) before a
//! simulation starts.

use crate::error::NavError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Geometric constants of the route planner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannerParams {
    /// Waypoints closer than this to their predecessor are collapsed.
    #[serde(default = "PlannerParams::default_waypoint_epsilon")]
    pub waypoint_epsilon: f64,
    /// Avoidance points sit this many barrier distances beside the obstacle.
    #[serde(default = "PlannerParams::default_side_clearance_factor")]
    pub side_clearance_factor: f64,
    /// Approach points are offset this many barrier distances back and sideways.
    #[serde(default = "PlannerParams::default_approach_clearance_factor")]
    pub approach_clearance_factor: f64,
    /// Repaired points are pushed out to this multiple of the barrier distance.
    #[serde(default = "PlannerParams::default_repair_margin")]
    pub repair_margin: f64,
}

impl PlannerParams {
    const fn default_waypoint_epsilon() -> f64 {
        0.1
    }

    const fn default_side_clearance_factor() -> f64 {
        1.5
    }

    const fn default_approach_clearance_factor() -> f64 {
        1.2
    }

    const fn default_repair_margin() -> f64 {
        1.1
    }

    pub fn validate(&self) -> Result<(), NavError> {
        let positive = [
            ("waypoint_epsilon", self.waypoint_epsilon),
            ("side_clearance_factor", self.side_clearance_factor),
            ("approach_clearance_factor", self.approach_clearance_factor),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(NavError::InvalidPlannerParam { field, value });
            }
        }
        // A margin below 1 would leave repaired points inside the barrier.
        if !(self.repair_margin.is_finite() && self.repair_margin >= 1.0) {
            return Err(NavError::InvalidPlannerParam {
                field: "repair_margin",
                value: self.repair_margin,
            });
        }
        Ok(())
    }
}

impl Default for PlannerParams {
    fn default() -> Self {
        Self {
            waypoint_epsilon: Self::default_waypoint_epsilon(),
            side_clearance_factor: Self::default_side_clearance_factor(),
            approach_clearance_factor: Self::default_approach_clearance_factor(),
            repair_margin: Self::default_repair_margin(),
        }
    }
}

/// Settings for one headless simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "SimulationConfig::default_barrier_distance")]
    pub barrier_distance: f64,
    /// Fraction of a segment covered per frame.
    #[serde(default = "SimulationConfig::default_speed")]
    pub speed: f64,
    /// Hard cap on simulated frames, guards against runs that never finish.
    #[serde(default = "SimulationConfig::default_frame_limit")]
    pub frame_limit: usize,
    /// Barrier violations are reported every this many frames.
    #[serde(default = "SimulationConfig::default_violation_check_interval")]
    pub violation_check_interval: usize,
    #[serde(default)]
    pub planner: PlannerParams,
}

impl SimulationConfig {
    const fn default_barrier_distance() -> f64 {
        1.5
    }

    const fn default_speed() -> f64 {
        0.02
    }

    const fn default_frame_limit() -> usize {
        1000
    }

    const fn default_violation_check_interval() -> usize {
        10
    }

    pub fn validate(&self) -> Result<(), NavError> {
        validate_barrier_distance(self.barrier_distance)?;
        validate_speed(self.speed)?;
        if self.frame_limit == 0 {
            return Err(NavError::ZeroFrameLimit);
        }
        self.planner.validate()
    }

    /// Parses and validates a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, NavError> {
        let config: SimulationConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, NavError> {
        let config: SimulationConfig = read_yaml_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, NavError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            barrier_distance: Self::default_barrier_distance(),
            speed: Self::default_speed(),
            frame_limit: Self::default_frame_limit(),
            violation_check_interval: Self::default_violation_check_interval(),
            planner: PlannerParams::default(),
        }
    }
}

pub(crate) fn read_yaml_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, NavError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| NavError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_yaml::from_str(&text)?)
}

/// Serializes `value` to `path`, creating missing parent directories.
pub(crate) fn write_yaml_file<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<(), NavError> {
    let path = path.as_ref();
    let io_error = |source| NavError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let text = serde_yaml::to_string(value)?;
    fs::write(path, text).map_err(io_error)
}

pub fn validate_barrier_distance(barrier_distance: f64) -> Result<(), NavError> {
    if barrier_distance.is_finite() && barrier_distance >= 0.0 {
        Ok(())
    } else {
        Err(NavError::InvalidBarrierDistance(barrier_distance))
    }
}

pub fn validate_speed(speed: f64) -> Result<(), NavError> {
    if speed.is_finite() && speed > 0.0 {
        Ok(())
    } else {
        Err(NavError::InvalidSpeed(speed))
    }
}
