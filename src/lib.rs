//! # Nakib Navigation Core
//!
//! Route planning and safety scoring for a single vehicle crossing a 2D field
//! of circular obstacles, with optional Python bindings.
//!
//! ## Components
//!
//! - **Planner**: builds an ordered waypoint route from start to goal that
//!   swings around each obstacle, pushing waypoints out of barrier circles.
//! - **Safety classifier**: scores a position as SAFE, MILD_UNSAFE or UNSAFE
//!   against the obstacle set and a barrier distance.
//! - **Segment stepper**: advances a vehicle along the route one frame at a
//!   time with linear interpolation.
//! - **Headless simulator**: runs test cases and scenario suites to
//!   completion and aggregates per-frame safety statistics.
//!
//! ## Usage
//!
//! ```
//! use nakib_nav::{classify, plan, NavigationState, Point, SafetyState};
//!
//! let obstacles = vec![Point::new(15.0, 15.0)];
//! let route = plan(Point::new(0.0, 0.0), Point::new(20.0, 20.0), &obstacles, 1.5);
//!
//! let mut vehicle = NavigationState::new(route, 0.02);
//! while !vehicle.advance() {
//!     let (state, _) = classify(&vehicle.position(), &obstacles, 1.5);
//!     assert_ne!(state, SafetyState::Unsafe);
//! }
//! ```
//!
//! With the `python` feature the crate builds the `nakib_nav` extension
//! module: `plan_route`, `classify`, `ensure_safe_point`, `run_test`.

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod config;
pub mod error;
pub mod events;
pub mod headless;
pub mod planner;
pub mod report;
pub mod safety;
pub mod scenarios;
pub mod stepper;
pub mod structs;

pub use config::{PlannerParams, SimulationConfig};
pub use error::NavError;
pub use events::{EventSink, LogSink, NavEvent, NullSink, WaypointKind};
pub use headless::{load_test_cases, run_batch, run_single_test, HeadlessSimulator, TestCase};
pub use planner::{ensure_safe_point, plan, RoutePlanner};
pub use report::{BatchSummary, FrameRecord, ResultCollector, TestResult};
pub use safety::{classify, first_barrier_violation};
pub use scenarios::{BarrierSweep, Suite};
pub use stepper::NavigationState;
pub use structs::{route_length, Point, Route, SafetyState, Vector2D, OBSTACLE_RADIUS};

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "plan_route")]
fn plan_route_py(start: Point, goal: Point, obstacles: Vec<Point>, barrier_distance: f64) -> PyResult<Vec<Point>> {
    config::validate_barrier_distance(barrier_distance)?;
    Ok(plan(start, goal, &obstacles, barrier_distance))
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "classify")]
fn classify_py(position: Point, obstacles: Vec<Point>, barrier_distance: f64) -> PyResult<(SafetyState, f64)> {
    config::validate_barrier_distance(barrier_distance)?;
    Ok(classify(&position, &obstacles, barrier_distance))
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "ensure_safe_point")]
fn ensure_safe_point_py(point: Point, obstacles: Vec<Point>, barrier_distance: f64) -> PyResult<Point> {
    config::validate_barrier_distance(barrier_distance)?;
    Ok(ensure_safe_point(point, &obstacles, barrier_distance))
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "path_length")]
fn path_length_py(path: Vec<Point>) -> f64 {
    route_length(&path)
}

/// Runs one headless test and returns its result; frame records are dropped.
#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "run_test", signature = (start, goal, obstacles, barrier_distance, speed=0.02, frame_limit=1000, description=String::new()))]
fn run_test_py(
    start: Point,
    goal: Point,
    obstacles: Vec<Point>,
    barrier_distance: f64,
    speed: f64,
    frame_limit: usize,
    description: String,
) -> PyResult<TestResult> {
    let config = SimulationConfig {
        barrier_distance,
        speed,
        frame_limit,
        ..SimulationConfig::default()
    };
    let case = TestCase::new(1, start, goal, obstacles, &config).with_description(description);
    let mut collector = ResultCollector::new();
    Ok(run_single_test(&case, &config, &mut collector, &mut LogSink)?)
}

#[cfg(feature = "python")]
#[pymodule]
fn nakib_nav(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Data structures
    m.add_class::<Point>()?;
    m.add_class::<Vector2D>()?;
    m.add_class::<SafetyState>()?;
    m.add_class::<NavigationState>()?;
    m.add_class::<TestResult>()?;

    // Planning and scoring
    m.add_function(wrap_pyfunction!(plan_route_py, m)?)?;
    m.add_function(wrap_pyfunction!(classify_py, m)?)?;
    m.add_function(wrap_pyfunction!(ensure_safe_point_py, m)?)?;

    // Utilities
    m.add_function(wrap_pyfunction!(path_length_py, m)?)?;
    m.add_function(wrap_pyfunction!(run_test_py, m)?)?;

    m.add("OBSTACLE_RADIUS", OBSTACLE_RADIUS)?;
    Ok(())
}
