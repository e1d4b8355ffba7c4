//! # Segment Stepper
//!
//! Frame-by-frame traversal of a planned route. The caller drives the state
//! machine by calling [`NavigationState::advance`] once per tick; each call
//! adds `speed` to the fractional progress along the current segment and
//! carries any overflow into the following segments.
//!
//! States:
//! - **Advancing**: `segment_index` addresses a segment of the route and
//!   `position == lerp(route[i], route[i + 1], progress)`.
//! - **Done**: the route is exhausted, `position` is clamped to the final
//!   waypoint and further calls are no-ops.

#[cfg(feature = "python")]
use pyo3::prelude::*;

use crate::events::{EventSink, NavEvent, NullSink};
use crate::structs::{unit_direction, Point, Route, Vector2D, FALLBACK_AXIS};

/// Slack on segment completion so summed speeds such as `10 * 0.1` still
/// complete a segment on the expected call.
const PROGRESS_TOLERANCE: f64 = 1e-9;

#[cfg_attr(feature = "python", pyclass)]
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    route: Route,
    speed: f64,
    segment_index: usize,
    progress: f64,
    position: Point,
    heading: Vector2D,
    done: bool,
    announced_segment: Option<usize>,
}

#[cfg_attr(feature = "python", pymethods)]
impl NavigationState {
    /// Starts at the first waypoint. Routes with fewer than two points have no
    /// segment to travel and start out done.
    #[cfg_attr(feature = "python", new)]
    pub fn new(route: Route, speed: f64) -> Self {
        let position = route.first().copied().unwrap_or_default();
        let heading = match route.as_slice() {
            [first, second, ..] => unit_direction(*first, *second),
            _ => FALLBACK_AXIS,
        };
        let done = route.len() < 2;

        NavigationState {
            route,
            speed,
            segment_index: 0,
            progress: 0.0,
            position,
            heading,
            done,
            announced_segment: None,
        }
    }

    /// Advances one frame. Returns `true` once the route is complete.
    pub fn advance(&mut self) -> bool {
        self.advance_with(&mut NullSink)
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Unit direction of the current segment; held over from the last segment
    /// once done.
    pub fn heading(&self) -> Vector2D {
        self.heading
    }

    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn route(&self) -> Route {
        self.route.clone()
    }

    pub fn segment_count(&self) -> usize {
        self.route.len().saturating_sub(1)
    }

    /// Index of the waypoint the vehicle is heading for; the final waypoint once done.
    pub fn waypoint_index(&self) -> usize {
        if self.done {
            self.route.len().saturating_sub(1)
        } else {
            self.segment_index + 1
        }
    }

    pub fn remaining_segments(&self) -> usize {
        if self.done {
            0
        } else {
            self.segment_count() - self.segment_index
        }
    }

    pub fn __str__(&self) -> String {
        if self.done {
            format!("NavigationState(DONE at {})", self.position.__str__())
        } else {
            format!(
                "NavigationState(segment {}/{}, progress {:.2}, at {})",
                self.segment_index + 1,
                self.segment_count(),
                self.progress,
                self.position.__str__()
            )
        }
    }
}

impl NavigationState {
    /// [`advance`](Self::advance), reporting segment and waypoint events to `sink`.
    pub fn advance_with(&mut self, sink: &mut dyn EventSink) -> bool {
        if self.done {
            return true;
        }

        if self.announced_segment != Some(self.segment_index) {
            let from = self.route[self.segment_index];
            let to = self.route[self.segment_index + 1];
            if self.segment_index == 0 {
                sink.record(NavEvent::WaypointReached { index: 0, point: from });
            }
            sink.record(NavEvent::SegmentStarted {
                segment: self.segment_index,
                from,
                to,
            });
            self.announced_segment = Some(self.segment_index);
        }

        self.progress += self.speed;
        while self.progress >= 1.0 - PROGRESS_TOLERANCE {
            self.progress = (self.progress - 1.0).max(0.0);
            self.segment_index += 1;
            sink.record(NavEvent::WaypointReached {
                index: self.segment_index,
                point: self.route[self.segment_index],
            });

            if self.segment_index >= self.segment_count() {
                self.done = true;
                self.progress = 0.0;
                self.position = self.route[self.route.len() - 1];
                sink.record(NavEvent::DestinationReached {
                    point: self.position,
                });
                return true;
            }
        }

        let from = self.route[self.segment_index];
        let to = self.route[self.segment_index + 1];
        self.position = from.lerp(&to, self.progress);
        self.heading = unit_direction(from, to);
        false
    }

    pub fn waypoints(&self) -> &[Point] {
        &self.route
    }
}
