//! # Scenario Suites
//!
//! Built-in batches of [`TestCase`]s and a barrier-distance sweep generator.
//!
//! Every case holds a single obstacle: a configuration with several obstacles
//! is expanded into one case per obstacle, all sharing the configuration name
//! as description so the report groups them together.

use crate::error::NavError;
use crate::headless::TestCase;
use crate::structs::Point;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

const SUITE_SPEED: f64 = 0.02;

const COMPREHENSIVE_BARRIERS: [f64; 8] = [0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0];

const COMPREHENSIVE_LAYOUTS: [(&str, &[(f64, f64)]); 8] = [
    ("1_obstacle_after_10", &[(15.0, 15.0)]),
    ("2_obstacles_after_10", &[(12.0, 12.0), (17.0, 17.0)]),
    ("3_obstacles_after_10", &[(11.0, 11.0), (15.0, 15.0), (18.0, 18.0)]),
    ("clustered_obstacles_after_10", &[(13.0, 13.0), (14.0, 14.0), (15.0, 15.0)]),
    ("diagonal_obstacles_after_10", &[(12.0, 8.0), (15.0, 15.0), (18.0, 12.0)]),
    (
        "dense_obstacles_after_10",
        &[(11.0, 11.0), (12.0, 12.0), (13.0, 13.0), (14.0, 14.0), (15.0, 15.0)],
    ),
    (
        "scattered_obstacles_after_10",
        &[(11.0, 9.0), (13.0, 16.0), (15.0, 11.0), (17.0, 18.0), (19.0, 13.0)],
    ),
    ("narrow_path_obstacles", &[(12.0, 10.0), (12.0, 14.0), (16.0, 10.0), (16.0, 14.0)]),
];

const ADVANCED_BARRIERS: [f64; 6] = [0.5, 1.0, 1.5, 2.0, 2.5, 3.0];

const ADVANCED_LAYOUTS: [(&str, &[(f64, f64)]); 5] = [
    ("single_center_obstacle", &[(15.0, 15.0)]),
    ("double_symmetric_obstacles", &[(12.0, 12.0), (17.0, 17.0)]),
    ("triangular_obstacles", &[(11.0, 11.0), (15.0, 15.0), (18.0, 18.0)]),
    (
        "wall_of_obstacles",
        &[(13.0, 10.0), (13.0, 12.0), (13.0, 14.0), (13.0, 16.0), (13.0, 18.0)],
    ),
    ("checkerboard_obstacles", &[(12.0, 12.0), (12.0, 16.0), (16.0, 12.0), (16.0, 16.0)]),
];

/// Built-in test suites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Suite {
    /// One obstacle at (5,4) with five barrier distances.
    Sample,
    /// Eight layouts between (0,0) and (20,20), barriers 0.5 to 4.0.
    Comprehensive,
    /// Five structured layouts, barriers 0.5 to 3.0.
    Advanced,
}

impl Suite {
    pub fn cases(self) -> Vec<TestCase> {
        match self {
            Suite::Sample => sample_suite(),
            Suite::Comprehensive => comprehensive_suite(),
            Suite::Advanced => advanced_suite(),
        }
    }
}

pub fn sample_suite() -> Vec<TestCase> {
    [1.0, 1.5, 2.0, 2.5, 3.0]
        .iter()
        .enumerate()
        .map(|(i, &barrier_distance)| TestCase {
            test_id: i + 1,
            start: Point::new(0.0, 0.0),
            goal: Point::new(10.0, 8.0),
            obstacles: vec![Point::new(5.0, 4.0)],
            barrier_distance,
            speed: SUITE_SPEED,
            description: "Single obstacle at (5,4)".to_string(),
        })
        .collect()
}

pub fn comprehensive_suite() -> Vec<TestCase> {
    expand_layouts(&COMPREHENSIVE_LAYOUTS, &COMPREHENSIVE_BARRIERS)
}

pub fn advanced_suite() -> Vec<TestCase> {
    expand_layouts(&ADVANCED_LAYOUTS, &ADVANCED_BARRIERS)
}

/// One case per layout, barrier and obstacle, numbered from 1 in that order.
fn expand_layouts(layouts: &[(&str, &[(f64, f64)])], barriers: &[f64]) -> Vec<TestCase> {
    let mut cases = Vec::new();
    for &(name, obstacles) in layouts {
        for &barrier_distance in barriers {
            for &obstacle in obstacles {
                cases.push(TestCase {
                    test_id: cases.len() + 1,
                    start: Point::new(0.0, 0.0),
                    goal: Point::new(20.0, 20.0),
                    obstacles: vec![Point::from(obstacle)],
                    barrier_distance,
                    speed: SUITE_SPEED,
                    description: name.to_string(),
                });
            }
        }
    }
    cases
}

/// Custom batch sweeping the barrier distance over a range for a fixed
/// obstacle layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarrierSweep {
    pub start: Point,
    pub goal: Point,
    pub obstacles: Vec<Point>,
    pub speed: f64,
    pub min_barrier: f64,
    pub max_barrier: f64,
    pub step: f64,
}

impl Default for BarrierSweep {
    fn default() -> Self {
        BarrierSweep {
            start: Point::new(0.0, 0.0),
            goal: Point::new(20.0, 20.0),
            obstacles: vec![Point::new(10.0, 10.0), Point::new(12.0, 12.0), Point::new(14.0, 14.0)],
            speed: SUITE_SPEED,
            min_barrier: 0.5,
            max_barrier: 3.0,
            step: 0.5,
        }
    }
}

impl BarrierSweep {
    /// Barrier distances from `min_barrier` up to `max_barrier` inclusive,
    /// rounded to two decimals. Empty when the range is inverted.
    pub fn barriers(&self) -> Result<Vec<f64>, NavError> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(NavError::InvalidSweepStep(self.step));
        }

        let mut barriers = Vec::new();
        let mut i = 0;
        loop {
            let barrier = self.min_barrier + i as f64 * self.step;
            if barrier > self.max_barrier + 1e-9 {
                break;
            }
            barriers.push((barrier * 100.0).round() / 100.0);
            i += 1;
        }
        Ok(barriers)
    }

    /// One case per barrier and obstacle.
    pub fn cases(&self) -> Result<Vec<TestCase>, NavError> {
        let mut cases = Vec::new();
        for barrier_distance in self.barriers()? {
            for &obstacle in &self.obstacles {
                let test_id = cases.len() + 1;
                cases.push(TestCase {
                    test_id,
                    start: self.start,
                    goal: self.goal,
                    obstacles: vec![obstacle],
                    barrier_distance,
                    speed: self.speed,
                    description: format!("Custom_test_{test_id}"),
                });
            }
        }
        Ok(cases)
    }
}
