//! # Core Data Structures
//!
//! This module defines the fundamental data types used throughout the library:
//!
//! - **Point**: 2D position in continuous space
//! - **Vector2D**: 2D offset/direction vector with arithmetic operations
//! - **SafetyState**: three-level proximity severity of the vehicle
//! - **Route**: ordered waypoints from start to goal
//!
//! Everything here is a plain value type. The geometry helpers never fail:
//! degenerate directions fall back to fixed axes instead of dividing by zero.

#[cfg(feature = "python")]
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// Physical collision radius shared by every obstacle.
pub const OBSTACLE_RADIUS: f64 = 0.5;

/// Direction used when a unit direction is requested between coincident points.
pub const FALLBACK_AXIS: Vector2D = Vector2D { x: 1.0, y: 0.0 };

/// Ordered waypoints, first element is the start.
pub type Route = Vec<Point>;

#[cfg_attr(feature = "python", pyclass)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub x: f64,
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub y: f64,
}

#[cfg_attr(feature = "python", pymethods)]
impl Point {
    #[cfg_attr(feature = "python", new)]
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Point at fraction `t` of the way from `self` to `other`.
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Unit vector pointing from `self` towards `other`, or [`FALLBACK_AXIS`]
    /// when the two points coincide.
    pub fn direction_to(&self, other: &Point) -> Vector2D {
        unit_direction(*self, *other)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn __str__(&self) -> String {
        format!("Point({:.2}, {:.2})", self.x, self.y)
    }

    pub fn __repr__(&self) -> String {
        self.__str__()
    }
}

impl Sub for Point {
    type Output = Vector2D;

    fn sub(self, other: Point) -> Vector2D {
        Vector2D {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Add<Vector2D> for Point {
    type Output = Point;

    fn add(self, other: Vector2D) -> Point {
        Point {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub<Vector2D> for Point {
    type Output = Point;

    fn sub(self, other: Vector2D) -> Point {
        Point {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

#[cfg_attr(feature = "python", pyclass)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2D {
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub x: f64,
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub y: f64,
}

#[cfg_attr(feature = "python", pymethods)]
impl Vector2D {
    #[cfg_attr(feature = "python", new)]
    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn normalize(&self) -> Vector2D {
        let mag = self.magnitude();
        if mag > 0.0 {
            Vector2D {
                x: self.x / mag,
                y: self.y / mag,
            }
        } else {
            Vector2D { x: 0.0, y: 0.0 }
        }
    }

    pub fn dot(&self, other: &Vector2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Counter-clockwise rotation by 90 degrees: `(x, y) -> (-y, x)`.
    pub fn perpendicular(&self) -> Vector2D {
        Vector2D {
            x: -self.y,
            y: self.x,
        }
    }

    /// Heading angle in radians, as used by renderers to orient the vehicle.
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn __str__(&self) -> String {
        format!("Vector2D({:.2}, {:.2})", self.x, self.y)
    }

    pub fn __repr__(&self) -> String {
        self.__str__()
    }
}

impl Add for Vector2D {
    type Output = Vector2D;

    fn add(self, other: Vector2D) -> Vector2D {
        Vector2D {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Vector2D {
    type Output = Vector2D;

    fn sub(self, other: Vector2D) -> Vector2D {
        Vector2D {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f64> for Vector2D {
    type Output = Vector2D;

    fn mul(self, scalar: f64) -> Vector2D {
        Vector2D {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl Neg for Vector2D {
    type Output = Vector2D;

    fn neg(self) -> Vector2D {
        Vector2D {
            x: -self.x,
            y: -self.y,
        }
    }
}

/// Unit vector from `from` to `to`. Coincident points yield [`FALLBACK_AXIS`].
pub fn unit_direction(from: Point, to: Point) -> Vector2D {
    let delta = to - from;
    let length = delta.magnitude();
    if length > 0.0 {
        delta * (1.0 / length)
    } else {
        FALLBACK_AXIS
    }
}

/// Proximity severity of the vehicle, ordered from least to most severe.
#[cfg_attr(feature = "python", pyclass(eq, eq_int))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyState {
    /// Outside every barrier.
    Safe,
    /// Inside a barrier but clear of the obstacle body.
    MildUnsafe,
    /// Inside an obstacle body.
    Unsafe,
}

impl SafetyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyState::Safe => "SAFE",
            SafetyState::MildUnsafe => "MILD_UNSAFE",
            SafetyState::Unsafe => "UNSAFE",
        }
    }
}

impl std::fmt::Display for SafetyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total polyline length of a route.
pub fn route_length(route: &[Point]) -> f64 {
    route.windows(2).map(|pair| pair[0].distance(&pair[1])).sum()
}
