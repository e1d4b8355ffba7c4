//! # Headless Simulation
//!
//! Runs planned routes to completion without rendering, classifying the
//! vehicle on every frame and collecting the results of whole test batches.

use crate::config::{read_yaml_file, validate_barrier_distance, validate_speed, write_yaml_file, SimulationConfig};
use crate::error::NavError;
use crate::events::{EventSink, NavEvent};
use crate::planner::RoutePlanner;
use crate::report::{FrameRecord, ResultCollector, TestResult};
use crate::safety::{classify, first_barrier_violation, nearest_obstacle_distance};
use crate::stepper::NavigationState;
use crate::structs::{Point, SafetyState};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One scenario of a batch: where to go, what is in the way and how much
/// clearance to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub test_id: usize,
    pub start: Point,
    pub goal: Point,
    pub obstacles: Vec<Point>,
    pub barrier_distance: f64,
    #[serde(default = "TestCase::default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub description: String,
}

impl TestCase {
    const fn default_speed() -> f64 {
        0.02
    }

    /// Test case using the barrier distance and speed of `config`.
    pub fn new(test_id: usize, start: Point, goal: Point, obstacles: Vec<Point>, config: &SimulationConfig) -> Self {
        TestCase {
            test_id,
            start,
            goal,
            obstacles,
            barrier_distance: config.barrier_distance,
            speed: config.speed,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn validate(&self) -> Result<(), NavError> {
        if !self.start.is_finite() {
            return Err(NavError::NonFiniteCoordinate { field: "start" });
        }
        if !self.goal.is_finite() {
            return Err(NavError::NonFiniteCoordinate { field: "goal" });
        }
        if !self.obstacles.iter().all(Point::is_finite) {
            return Err(NavError::NonFiniteCoordinate { field: "obstacles" });
        }
        validate_barrier_distance(self.barrier_distance)?;
        validate_speed(self.speed)
    }
}

/// Reads a batch of test cases from a YAML sequence.
pub fn load_test_cases(path: impl AsRef<Path>) -> Result<Vec<TestCase>, NavError> {
    read_yaml_file(path)
}

pub fn test_cases_from_yaml_str(yaml: &str) -> Result<Vec<TestCase>, NavError> {
    Ok(serde_yaml::from_str(yaml)?)
}

pub fn save_test_cases(path: impl AsRef<Path>, cases: &[TestCase]) -> Result<(), NavError> {
    write_yaml_file(path, cases)
}

/// A vehicle following its planned route through a fixed obstacle set.
#[derive(Debug, Clone)]
pub struct HeadlessSimulator {
    obstacles: Vec<Point>,
    barrier_distance: f64,
    navigation: NavigationState,
    frame: usize,
    violation_check_interval: usize,
    next_waypoint_check: usize,
}

impl HeadlessSimulator {
    /// Plans the route for `case` with the planner parameters of `config`.
    pub fn new(case: &TestCase, config: &SimulationConfig, sink: &mut dyn EventSink) -> Self {
        let planner = RoutePlanner::new(config.planner);
        let route = planner.plan(case.start, case.goal, &case.obstacles, case.barrier_distance, sink);

        HeadlessSimulator {
            obstacles: case.obstacles.clone(),
            barrier_distance: case.barrier_distance,
            navigation: NavigationState::new(route, case.speed),
            frame: 0,
            violation_check_interval: config.violation_check_interval,
            next_waypoint_check: 0,
        }
    }

    /// Advances one frame. Returns `true` while the vehicle is still on its
    /// way; the frame on which it arrives reports `false`.
    pub fn step(&mut self, sink: &mut dyn EventSink) -> bool {
        let arrived = self.navigation.advance_with(sink);
        self.check_reached_waypoints(sink);
        if arrived {
            return false;
        }

        if self.violation_check_interval > 0 && self.frame % self.violation_check_interval == 0 {
            let position = self.navigation.position();
            if let Some((obstacle_index, distance)) =
                first_barrier_violation(&position, &self.obstacles, self.barrier_distance)
            {
                sink.record(NavEvent::BarrierViolation {
                    position,
                    obstacle_index,
                    distance,
                    barrier_distance: self.barrier_distance,
                });
            }
        }
        self.frame += 1;
        true
    }

    /// Reports every waypoint reached since the last call that lies inside a
    /// barrier. Each waypoint is checked once.
    fn check_reached_waypoints(&mut self, sink: &mut dyn EventSink) {
        let route = self.navigation.waypoints();
        let reached = if self.navigation.is_done() {
            route.len().saturating_sub(1)
        } else {
            self.navigation.segment_index()
        };

        while self.next_waypoint_check <= reached && self.next_waypoint_check < route.len() {
            let index = self.next_waypoint_check;
            let point = route[index];
            if let Some((obstacle_index, distance)) =
                first_barrier_violation(&point, &self.obstacles, self.barrier_distance)
            {
                sink.record(NavEvent::WaypointInsideBarrier {
                    index,
                    point,
                    obstacle_index,
                    distance,
                    barrier_distance: self.barrier_distance,
                });
            }
            self.next_waypoint_check += 1;
        }
    }

    pub fn position(&self) -> Point {
        self.navigation.position()
    }

    pub fn distance_to_obstacles(&self) -> f64 {
        nearest_obstacle_distance(&self.navigation.position(), &self.obstacles)
    }

    pub fn safety(&self) -> (SafetyState, f64) {
        classify(&self.navigation.position(), &self.obstacles, self.barrier_distance)
    }

    pub fn route(&self) -> &[Point] {
        self.navigation.waypoints()
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    /// Frames completed while still en route.
    pub fn frames(&self) -> usize {
        self.frame
    }

    pub fn is_done(&self) -> bool {
        self.navigation.is_done()
    }
}

/// Simulates one test case, recording every en-route frame into `collector`.
///
/// Stops at the destination or after `config.frame_limit` frames, whichever
/// comes first.
pub fn run_single_test(
    case: &TestCase,
    config: &SimulationConfig,
    collector: &mut ResultCollector,
    sink: &mut dyn EventSink,
) -> Result<TestResult, NavError> {
    case.validate()?;
    config.validate()?;

    let mut simulator = HeadlessSimulator::new(case, config, sink);
    let mut result = TestResult::new(case.test_id, case.barrier_distance, case.description.clone());

    while result.total_frames < config.frame_limit && simulator.step(sink) {
        let (safety_state, distance) = simulator.safety();
        collector.record_frame(FrameRecord {
            test_id: case.test_id,
            frame: result.total_frames,
            position: simulator.position(),
            distance_to_obstacle: distance,
            safety_state,
        });
        result.observe(safety_state, distance);
    }

    if !simulator.is_done() {
        warn!(
            "Test {} stopped at the frame limit ({}) before reaching the goal",
            case.test_id, config.frame_limit
        );
    }
    Ok(result)
}

/// Runs every case in order. All cases are validated before the first one
/// is simulated.
pub fn run_batch(
    cases: &[TestCase],
    config: &SimulationConfig,
    sink: &mut dyn EventSink,
) -> Result<ResultCollector, NavError> {
    config.validate()?;
    for case in cases {
        case.validate()?;
    }

    info!("Running {} test case(s)", cases.len());
    let mut collector = ResultCollector::new();
    for (i, case) in cases.iter().enumerate() {
        info!(
            "Test {}/{}: {} (barrier {:.2}, {} obstacle(s))",
            i + 1,
            cases.len(),
            case.description,
            case.barrier_distance,
            case.obstacles.len()
        );
        let result = run_single_test(case, config, &mut collector, sink)?;
        info!(
            "  Result: {} (safe {}, mild unsafe {}, unsafe {}, min distance {:.3})",
            result.safety_status(),
            result.safe_frames,
            result.mild_unsafe_frames,
            result.unsafe_frames,
            result.min_distance_observed
        );
        collector.push_result(result);
    }
    Ok(collector)
}
