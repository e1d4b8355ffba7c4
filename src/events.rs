//! # Navigation Events
//!
//! Planning and stepping report what they do through an [`EventSink`] supplied
//! by the caller. The core never touches a global logger: a renderer can
//! collect events into a `Vec`, the batch runner can forward them to the `log`
//! facade with [`LogSink`], and hot loops can drop them with [`NullSink`].

use crate::structs::{Point, Route};
use log::{debug, info, warn};

/// Role of a waypoint emitted by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaypointKind {
    /// Point leading the vehicle to the chosen side of an obstacle.
    Approach,
    /// Point abeam the obstacle, on the side closer to the goal.
    Avoidance,
    /// The (possibly repaired) goal.
    Goal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent {
    PlanStarted {
        start: Point,
        goal: Point,
        obstacle_count: usize,
        barrier_distance: f64,
    },
    PlanningAroundObstacle {
        index: usize,
        center: Point,
    },
    PointRepaired {
        original: Point,
        repaired: Point,
        obstacle_index: usize,
    },
    WaypointAdded {
        point: Point,
        kind: WaypointKind,
    },
    /// Candidate dropped because it lies within epsilon of the previous waypoint.
    WaypointSkipped {
        point: Point,
        kind: WaypointKind,
    },
    RoutePlanned {
        route: Route,
        length: f64,
    },
    SegmentStarted {
        segment: usize,
        from: Point,
        to: Point,
    },
    WaypointReached {
        index: usize,
        point: Point,
    },
    DestinationReached {
        point: Point,
    },
    BarrierViolation {
        position: Point,
        obstacle_index: usize,
        distance: f64,
        barrier_distance: f64,
    },
    /// A waypoint the vehicle just reached lies inside an obstacle's barrier.
    WaypointInsideBarrier {
        index: usize,
        point: Point,
        obstacle_index: usize,
        distance: f64,
        barrier_distance: f64,
    },
}

/// Receiver of [`NavEvent`]s.
pub trait EventSink {
    fn record(&mut self, event: NavEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _event: NavEvent) {}
}

impl EventSink for Vec<NavEvent> {
    fn record(&mut self, event: NavEvent) {
        self.push(event);
    }
}

/// Forwards events to the `log` facade.
///
/// Planning chatter goes to `debug`, milestones to `info` and barrier
/// violations to `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&mut self, event: NavEvent) {
        match event {
            NavEvent::PlanStarted {
                start,
                goal,
                obstacle_count,
                barrier_distance,
            } => info!(
                "Planning route {} -> {} around {} obstacle(s), barrier {:.2}",
                start.__str__(),
                goal.__str__(),
                obstacle_count,
                barrier_distance
            ),
            NavEvent::PlanningAroundObstacle { index, center } => {
                debug!("Planning around obstacle {} at {}", index + 1, center.__str__())
            }
            NavEvent::PointRepaired {
                original,
                repaired,
                obstacle_index,
            } => debug!(
                "Adjusted unsafe point {} to {} (obstacle {})",
                original.__str__(),
                repaired.__str__(),
                obstacle_index + 1
            ),
            NavEvent::WaypointAdded { point, kind } => {
                debug!("Added {:?} waypoint {}", kind, point.__str__())
            }
            NavEvent::WaypointSkipped { point, kind } => {
                debug!("Skipped {:?} waypoint {} (duplicate)", kind, point.__str__())
            }
            NavEvent::RoutePlanned { route, length } => info!(
                "Planned route with {} waypoint(s), length {:.3}",
                route.len(),
                length
            ),
            NavEvent::SegmentStarted { segment, from, to } => debug!(
                "Starting segment {}: {} -> {}",
                segment + 1,
                from.__str__(),
                to.__str__()
            ),
            NavEvent::WaypointReached { index, point } => {
                debug!("Reached waypoint {}: {}", index, point.__str__())
            }
            NavEvent::DestinationReached { point } => {
                info!("Vehicle reached the destination at {}", point.__str__())
            }
            NavEvent::BarrierViolation {
                position,
                obstacle_index,
                distance,
                barrier_distance,
            } => warn!(
                "Barrier violation at {}: obstacle {} at distance {:.3} (barrier {:.2})",
                position.__str__(),
                obstacle_index + 1,
                distance,
                barrier_distance
            ),
            NavEvent::WaypointInsideBarrier {
                index,
                point,
                obstacle_index,
                distance,
                barrier_distance,
            } => warn!(
                "Waypoint {} at {} is inside the barrier of obstacle {} (distance {:.3}, barrier {:.2})",
                index,
                point.__str__(),
                obstacle_index + 1,
                distance,
                barrier_distance
            ),
        }
    }
}
