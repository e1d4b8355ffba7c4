//! Error type shared by configuration loading, input validation and result
//! persistence. Planning, classification and stepping never fail.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by collaborators of the core: invalid inputs, unreadable
/// configuration or batch files, and result persistence.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("barrier distance must be a non-negative finite number (got {0})")]
    InvalidBarrierDistance(f64),
    #[error("speed must be a positive finite number (got {0})")]
    InvalidSpeed(f64),
    #[error("frame limit must be at least 1")]
    ZeroFrameLimit,
    #[error("{field} has a non-finite coordinate")]
    NonFiniteCoordinate { field: &'static str },
    #[error("barrier sweep step must be a positive finite number (got {0})")]
    InvalidSweepStep(f64),
    #[error("planner parameter {field} is out of range (got {value})")]
    InvalidPlannerParam { field: &'static str, value: f64 },
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(feature = "python")]
impl From<NavError> for pyo3::PyErr {
    fn from(err: NavError) -> Self {
        match err {
            NavError::Io { .. } => pyo3::exceptions::PyIOError::new_err(err.to_string()),
            _ => pyo3::exceptions::PyValueError::new_err(err.to_string()),
        }
    }
}
