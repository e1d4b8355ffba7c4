//! # Route Planner
//!
//! Deterministic, locally-reasoned waypoint generation around circular
//! obstacles.
//!
//! ## Algorithm
//!
//! Obstacles are processed strictly in input order, all relative to one global
//! approach direction (start → goal):
//! 1. Two candidate side points lie beside the obstacle along the
//!    perpendicular of the approach direction; the one closer to the goal wins.
//! 2. An approach point is placed behind the obstacle (against the approach
//!    direction) and shifted towards the winning side.
//! 3. Both points are pushed out of every barrier by [`RoutePlanner::ensure_safe_point`]
//!    and appended unless they duplicate the previous waypoint.
//! 4. The repaired goal closes the route.
//!
//! The repair is sequential and local: pushing a point out of one barrier can
//! move it into a barrier that was already resolved. This is acceptable for
//! sparse, well-separated obstacles and is not corrected here.

use crate::config::PlannerParams;
use crate::events::{EventSink, NavEvent, NullSink, WaypointKind};
use crate::structs::{route_length, unit_direction, Point, Route, Vector2D, FALLBACK_AXIS};

#[derive(Debug, Clone, Copy, Default)]
pub struct RoutePlanner {
    params: PlannerParams,
}

impl RoutePlanner {
    pub fn new(params: PlannerParams) -> Self {
        RoutePlanner { params }
    }

    pub fn params(&self) -> &PlannerParams {
        &self.params
    }

    /// Pushes `point` radially out of every barrier that strictly contains it,
    /// to `barrier_distance * repair_margin` from that obstacle's center.
    ///
    /// `fallback` is the push direction used when the point sits exactly on a
    /// center.
    pub fn ensure_safe_point(
        &self,
        point: Point,
        obstacles: &[Point],
        barrier_distance: f64,
        fallback: Vector2D,
        sink: &mut dyn EventSink,
    ) -> Point {
        let fallback = if fallback.magnitude() > 0.0 {
            fallback.normalize()
        } else {
            FALLBACK_AXIS.perpendicular()
        };

        let mut safe_point = point;
        for (index, obstacle) in obstacles.iter().enumerate() {
            if safe_point.distance(obstacle) >= barrier_distance {
                continue;
            }

            let away = safe_point - *obstacle;
            let direction = if away.magnitude() > 0.0 {
                away.normalize()
            } else {
                fallback
            };
            let repaired = *obstacle + direction * (barrier_distance * self.params.repair_margin);

            sink.record(NavEvent::PointRepaired {
                original: safe_point,
                repaired,
                obstacle_index: index,
            });
            safe_point = repaired;
        }

        safe_point
    }

    /// Plans a route from `start` to `goal` around `obstacles`.
    ///
    /// Never fails: pathological layouts still produce a route, possibly one
    /// that grazes a barrier.
    ///
    /// When start and goal differ the route always has at least two points.
    /// If every candidate collapsed into the start, the repaired goal is
    /// appended even when it lies within `waypoint_epsilon` of the start, so
    /// this is the one case where consecutive waypoints may be closer than
    /// epsilon.
    pub fn plan(
        &self,
        start: Point,
        goal: Point,
        obstacles: &[Point],
        barrier_distance: f64,
        sink: &mut dyn EventSink,
    ) -> Route {
        sink.record(NavEvent::PlanStarted {
            start,
            goal,
            obstacle_count: obstacles.len(),
            barrier_distance,
        });

        if obstacles.is_empty() {
            let route = if start == goal {
                vec![start]
            } else {
                vec![start, goal]
            };
            return self.finish(route, sink);
        }

        let main_direction = unit_direction(start, goal);
        let perp = main_direction.perpendicular();
        let side_offset = barrier_distance * self.params.side_clearance_factor;
        let safe_distance = barrier_distance * self.params.approach_clearance_factor;

        let mut route = vec![start];

        for (index, &obstacle) in obstacles.iter().enumerate() {
            sink.record(NavEvent::PlanningAroundObstacle {
                index,
                center: obstacle,
            });

            let side1 = obstacle + perp * side_offset;
            let side2 = obstacle - perp * side_offset;
            // Ties keep side1.
            let best_side = if goal.distance(&side2) < goal.distance(&side1) {
                side2
            } else {
                side1
            };

            let side_sign = if perp.dot(&(best_side - obstacle)) >= 0.0 {
                1.0
            } else {
                -1.0
            };
            let approach_point =
                obstacle - main_direction * safe_distance + perp * (side_sign * safe_distance);

            let approach_point =
                self.ensure_safe_point(approach_point, obstacles, barrier_distance, perp, sink);
            let avoidance_point =
                self.ensure_safe_point(best_side, obstacles, barrier_distance, perp, sink);

            self.push_waypoint(&mut route, approach_point, WaypointKind::Approach, sink);
            self.push_waypoint(&mut route, avoidance_point, WaypointKind::Avoidance, sink);
        }

        let final_point = self.ensure_safe_point(goal, obstacles, barrier_distance, perp, sink);
        self.push_waypoint(&mut route, final_point, WaypointKind::Goal, sink);

        let mut route = collapse_near_duplicates(&route, self.params.waypoint_epsilon);
        if route.len() < 2 && start != goal {
            route.push(final_point);
        }

        self.finish(route, sink)
    }

    fn push_waypoint(
        &self,
        route: &mut Route,
        point: Point,
        kind: WaypointKind,
        sink: &mut dyn EventSink,
    ) {
        let is_new = route
            .last()
            .map_or(true, |last| last.distance(&point) > self.params.waypoint_epsilon);

        if is_new {
            route.push(point);
            sink.record(NavEvent::WaypointAdded { point, kind });
        } else {
            sink.record(NavEvent::WaypointSkipped { point, kind });
        }
    }

    fn finish(&self, route: Route, sink: &mut dyn EventSink) -> Route {
        sink.record(NavEvent::RoutePlanned {
            route: route.clone(),
            length: route_length(&route),
        });
        route
    }
}

/// Drops every point within `epsilon` of the last kept point, keeping the
/// first of each cluster and preserving order.
pub fn collapse_near_duplicates(points: &[Point], epsilon: f64) -> Route {
    let mut clean: Route = Vec::with_capacity(points.len());
    for &point in points {
        match clean.last() {
            Some(last) if last.distance(&point) <= epsilon => {}
            _ => clean.push(point),
        }
    }
    clean
}

/// Plans a route with the default planner parameters, discarding events.
pub fn plan(start: Point, goal: Point, obstacles: &[Point], barrier_distance: f64) -> Route {
    RoutePlanner::default().plan(start, goal, obstacles, barrier_distance, &mut NullSink)
}

/// Standalone point repair with default parameters. A point exactly on an
/// obstacle center is pushed along +y.
pub fn ensure_safe_point(point: Point, obstacles: &[Point], barrier_distance: f64) -> Point {
    RoutePlanner::default().ensure_safe_point(
        point,
        obstacles,
        barrier_distance,
        FALLBACK_AXIS.perpendicular(),
        &mut NullSink,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_point_eq(actual: Point, expected: Point) {
        assert_relative_eq!(actual.x, expected.x, epsilon = 1e-9);
        assert_relative_eq!(actual.y, expected.y, epsilon = 1e-9);
    }

    // ==================== Obstacle-free planning ====================

    #[test]
    fn test_no_obstacles_is_straight_line() {
        let start = Point::new(0.0, 0.0);
        let goal = Point::new(10.0, 8.0);
        assert_eq!(plan(start, goal, &[], 1.5), vec![start, goal]);
    }

    #[test]
    fn test_no_obstacles_keeps_close_but_distinct_goal() {
        let start = Point::new(0.0, 0.0);
        let goal = Point::new(0.05, 0.0);
        assert_eq!(plan(start, goal, &[], 1.5), vec![start, goal]);
    }

    #[test]
    fn test_no_obstacles_coincident_start_goal() {
        let p = Point::new(2.0, 2.0);
        assert_eq!(plan(p, p, &[], 1.5), vec![p]);
    }

    // ==================== Single obstacle ====================

    #[test]
    fn test_single_obstacle_on_axis_tie_resolves_to_first_side() {
        // Both side points are equidistant from the goal, so side1 (+perp) wins.
        let route = plan(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            &[Point::new(5.0, 0.0)],
            1.0,
        );

        assert_eq!(route.len(), 4);
        assert_point_eq(route[0], Point::new(0.0, 0.0));
        assert_point_eq(route[1], Point::new(3.8, 1.2)); // approach
        assert_point_eq(route[2], Point::new(5.0, 1.5)); // avoidance
        assert_point_eq(route[3], Point::new(10.0, 0.0));
    }

    #[test]
    fn test_single_obstacle_picks_side_closer_to_goal() {
        let route = plan(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            &[Point::new(5.0, 0.5)],
            1.0,
        );

        assert_eq!(route.len(), 4);
        assert_point_eq(route[1], Point::new(3.8, -0.7));
        assert_point_eq(route[2], Point::new(5.0, -1.0));
        assert_point_eq(route[3], Point::new(10.0, 0.0));
    }

    #[test]
    fn test_diagonal_scenario_keeps_clearance_and_reaches_goal() {
        let obstacle = Point::new(15.0, 15.0);
        let route = plan(Point::new(0.0, 0.0), Point::new(20.0, 20.0), &[obstacle], 1.5);

        let nearest = route
            .iter()
            .map(|p| p.distance(&obstacle))
            .fold(f64::INFINITY, f64::min);
        assert!(nearest >= 1.5 * 1.2, "nearest waypoint at {nearest}");
        assert_eq!(route.first(), Some(&Point::new(0.0, 0.0)));
        assert_eq!(route.last(), Some(&Point::new(20.0, 20.0)));
    }

    #[test]
    fn test_goal_inside_barrier_is_repaired() {
        let obstacle = Point::new(10.0, 0.0);
        let route = plan(Point::new(0.0, 0.0), Point::new(10.5, 0.0), &[obstacle], 2.0);

        let last = *route.last().unwrap();
        assert_relative_eq!(last.distance(&obstacle), 2.2, epsilon = 1e-9);
        assert_point_eq(last, Point::new(12.2, 0.0));
    }

    // ==================== Route invariants ====================

    fn sparse_layouts() -> Vec<Vec<Point>> {
        let layouts: Vec<Vec<(f64, f64)>> = vec![
            vec![(15.0, 15.0)],
            vec![(12.0, 12.0), (17.0, 17.0)],
            vec![(11.0, 9.0)],
            vec![(13.0, 16.0)],
            vec![(19.0, 13.0)],
            vec![(5.0, 4.0)],
        ];
        layouts
            .into_iter()
            .map(|layout| layout.into_iter().map(Point::from).collect())
            .collect()
    }

    #[test]
    fn test_consecutive_waypoints_are_separated() {
        for obstacles in sparse_layouts() {
            for barrier in [0.5, 1.0, 1.5, 2.0, 2.5, 3.0] {
                let route = plan(Point::new(0.0, 0.0), Point::new(20.0, 20.0), &obstacles, barrier);
                assert!(route.len() >= 2);
                for pair in route.windows(2) {
                    assert!(
                        pair[0].distance(&pair[1]) > 0.1,
                        "duplicate waypoints {:?} with barrier {barrier}",
                        pair
                    );
                }
            }
        }
    }

    #[test]
    fn test_waypoints_clear_every_barrier_for_sparse_layouts() {
        for obstacles in sparse_layouts() {
            for barrier in [0.5, 1.0, 1.5, 2.0] {
                let route = plan(Point::new(0.0, 0.0), Point::new(20.0, 20.0), &obstacles, barrier);
                for waypoint in route.iter().skip(1) {
                    for obstacle in &obstacles {
                        assert!(
                            waypoint.distance(obstacle) >= barrier - 1e-9,
                            "waypoint {} inside barrier {barrier} of {}",
                            waypoint.__str__(),
                            obstacle.__str__()
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_dense_layout_still_returns_a_route() {
        let obstacles: Vec<Point> = (11..=15).map(|i| Point::new(i as f64, i as f64)).collect();
        let route = plan(Point::new(0.0, 0.0), Point::new(20.0, 20.0), &obstacles, 4.0);
        assert!(route.len() >= 2);
        assert_eq!(route[0], Point::new(0.0, 0.0));
        assert!(route.iter().all(Point::is_finite));
    }

    #[test]
    fn test_coincident_start_goal_with_obstacle_uses_fallback_direction() {
        let p = Point::new(0.0, 0.0);
        let route = plan(p, p, &[Point::new(3.0, 0.0)], 1.0);
        assert!(!route.is_empty());
        assert_eq!(route[0], p);
        assert!(route.iter().all(Point::is_finite));
    }

    #[test]
    fn test_goal_within_epsilon_of_start_still_yields_two_points() {
        let start = Point::new(0.0, 0.0);
        let goal = Point::new(0.05, 0.0);
        let mut events: Vec<NavEvent> = Vec::new();

        let route = RoutePlanner::default().plan(start, goal, &[Point::new(0.0, 0.0)], 0.01, &mut events);

        assert_eq!(route, vec![start, goal]);
        assert!(route[0].distance(&route[1]) < PlannerParams::default().waypoint_epsilon);
        // Approach, avoidance and goal were all dropped as duplicates of the start.
        let skipped = events
            .iter()
            .filter(|e| matches!(e, NavEvent::WaypointSkipped { .. }))
            .count();
        assert_eq!(skipped, 3);
    }

    #[test]
    fn test_planning_is_deterministic() {
        let obstacles = vec![Point::new(12.0, 8.0), Point::new(15.0, 15.0), Point::new(18.0, 12.0)];
        let a = plan(Point::new(0.0, 0.0), Point::new(20.0, 20.0), &obstacles, 2.5);
        let b = plan(Point::new(0.0, 0.0), Point::new(20.0, 20.0), &obstacles, 2.5);
        assert_eq!(a, b);
    }

    // ==================== Point repair ====================

    #[test]
    fn test_repair_leaves_safe_point_untouched() {
        let point = Point::new(5.0, 5.0);
        assert_eq!(ensure_safe_point(point, &[Point::new(0.0, 0.0)], 2.0), point);
    }

    #[test]
    fn test_repair_point_on_barrier_boundary_is_untouched() {
        let point = Point::new(2.0, 0.0);
        assert_eq!(ensure_safe_point(point, &[Point::new(0.0, 0.0)], 2.0), point);
    }

    #[test]
    fn test_repair_pushes_radially_to_margin() {
        let repaired = ensure_safe_point(Point::new(1.0, 0.0), &[Point::new(0.0, 0.0)], 2.0);
        assert_point_eq(repaired, Point::new(2.2, 0.0));
    }

    #[test]
    fn test_repair_point_on_center_uses_fallback() {
        let repaired = ensure_safe_point(Point::new(2.0, 2.0), &[Point::new(2.0, 2.0)], 1.0);
        assert_point_eq(repaired, Point::new(2.0, 3.1));

        let planner = RoutePlanner::default();
        let repaired = planner.ensure_safe_point(
            Point::new(2.0, 2.0),
            &[Point::new(2.0, 2.0)],
            1.0,
            Vector2D::new(-3.0, 0.0),
            &mut NullSink,
        );
        assert_point_eq(repaired, Point::new(0.9, 2.0));
    }

    #[test]
    fn test_repair_is_sequential_and_may_reenter_earlier_barrier() {
        // Pushed out of A, then out of B straight back into A.
        let obstacles = vec![Point::new(0.0, 0.0), Point::new(1.5, 0.0)];
        let repaired = ensure_safe_point(Point::new(0.9, 0.0), &obstacles, 1.0);
        assert_point_eq(repaired, Point::new(0.4, 0.0));
        assert!(repaired.distance(&obstacles[0]) < 1.0);
    }

    #[test]
    fn test_repair_with_zero_barrier_is_noop() {
        let point = Point::new(1.0, 1.0);
        assert_eq!(ensure_safe_point(point, &[point], 0.0), point);
    }

    // ==================== Collapsing & events ====================

    #[test]
    fn test_collapse_keeps_first_of_cluster() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(0.05, 0.0),
            Point::new(0.09, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 0.08),
        ];
        let clean = collapse_near_duplicates(&points, 0.1);
        assert_eq!(clean, vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
    }

    #[test]
    fn test_custom_params_change_offsets() {
        let planner = RoutePlanner::new(PlannerParams {
            side_clearance_factor: 2.0,
            approach_clearance_factor: 1.5,
            ..PlannerParams::default()
        });
        let route = planner.plan(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            &[Point::new(5.0, 0.0)],
            1.0,
            &mut NullSink,
        );
        assert_point_eq(route[1], Point::new(3.5, 1.5));
        assert_point_eq(route[2], Point::new(5.0, 2.0));
    }

    #[test]
    fn test_plan_reports_events() {
        let mut events: Vec<NavEvent> = Vec::new();
        let route = RoutePlanner::default().plan(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            &[Point::new(5.0, 0.0)],
            1.0,
            &mut events,
        );

        assert!(matches!(
            events.first(),
            Some(NavEvent::PlanStarted { obstacle_count: 1, .. })
        ));
        assert!(events
            .iter()
            .any(|e| matches!(e, NavEvent::PlanningAroundObstacle { index: 0, .. })));
        let added: Vec<WaypointKind> = events
            .iter()
            .filter_map(|e| match e {
                NavEvent::WaypointAdded { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect();
        assert_eq!(
            added,
            vec![WaypointKind::Approach, WaypointKind::Avoidance, WaypointKind::Goal]
        );
        match events.last() {
            Some(NavEvent::RoutePlanned { route: planned, length }) => {
                assert_eq!(planned, &route);
                assert!(*length > 10.0);
            }
            other => panic!("expected RoutePlanned, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_reports_repairs() {
        let mut events: Vec<NavEvent> = Vec::new();
        RoutePlanner::default().plan(
            Point::new(0.0, 0.0),
            Point::new(10.5, 0.0),
            &[Point::new(10.0, 0.0)],
            2.0,
            &mut events,
        );
        assert!(events
            .iter()
            .any(|e| matches!(e, NavEvent::PointRepaired { obstacle_index: 0, .. })));
    }
}
