//! # Safety Classification
//!
//! Scores the vehicle's instantaneous proximity to the obstacle set.
//!
//! - `distance <  OBSTACLE_RADIUS`  → [`SafetyState::Unsafe`] (collision)
//! - `distance <  barrier_distance` → [`SafetyState::MildUnsafe`]
//! - otherwise                      → [`SafetyState::Safe`]
//!
//! Thresholds are exclusive, so a distance exactly on a boundary lands on the
//! safer side.

use crate::structs::{Point, SafetyState, OBSTACLE_RADIUS};

/// Distance from `position` to the nearest obstacle center, `+inf` without obstacles.
pub fn nearest_obstacle_distance(position: &Point, obstacles: &[Point]) -> f64 {
    obstacles
        .iter()
        .map(|obstacle| position.distance(obstacle))
        .fold(f64::INFINITY, f64::min)
}

/// Maps a nearest-obstacle distance onto a [`SafetyState`].
pub fn state_for_distance(distance: f64, barrier_distance: f64) -> SafetyState {
    if distance < OBSTACLE_RADIUS {
        SafetyState::Unsafe
    } else if distance < barrier_distance {
        SafetyState::MildUnsafe
    } else {
        SafetyState::Safe
    }
}

/// Classifies `position` against every obstacle, returning the state and the
/// minimum observed distance.
pub fn classify(position: &Point, obstacles: &[Point], barrier_distance: f64) -> (SafetyState, f64) {
    let distance = nearest_obstacle_distance(position, obstacles);
    (state_for_distance(distance, barrier_distance), distance)
}

/// First obstacle, in input order, whose barrier strictly contains `position`.
pub fn first_barrier_violation(
    position: &Point,
    obstacles: &[Point],
    barrier_distance: f64,
) -> Option<(usize, f64)> {
    obstacles
        .iter()
        .enumerate()
        .map(|(index, obstacle)| (index, position.distance(obstacle)))
        .find(|&(_, distance)| distance < barrier_distance)
}
