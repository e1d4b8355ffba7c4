//! # Result Aggregation
//!
//! Per-frame records and per-test summaries produced by headless runs, plus
//! the grouped batch report:
//!
//! - status breakdown (SAFE / MILD_UNSAFE / UNSAFE) per configuration group,
//!   per barrier distance and overall,
//! - the optimal barrier distance of a group: the smallest barrier whose run
//!   stayed SAFE on every frame,
//! - when no run in a group is SAFE, the barrier with the fewest unsafe frames.

#[cfg(feature = "python")]
use pyo3::prelude::*;

use crate::config::write_yaml_file;
use crate::error::NavError;
use crate::structs::{Point, SafetyState};
use log::info;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Vehicle state observed on one frame of one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub test_id: usize,
    pub frame: usize,
    pub position: Point,
    pub distance_to_obstacle: f64,
    pub safety_state: SafetyState,
}

/// Frame counts and closest approach of a single test run.
#[cfg_attr(feature = "python", pyclass(get_all))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub test_id: usize,
    pub barrier_distance: f64,
    pub total_frames: usize,
    pub safe_frames: usize,
    pub mild_unsafe_frames: usize,
    pub unsafe_frames: usize,
    pub min_distance_observed: f64,
    #[serde(default)]
    pub description: String,
}

impl TestResult {
    pub fn new(test_id: usize, barrier_distance: f64, description: impl Into<String>) -> Self {
        TestResult {
            test_id,
            barrier_distance,
            total_frames: 0,
            safe_frames: 0,
            mild_unsafe_frames: 0,
            unsafe_frames: 0,
            min_distance_observed: f64::INFINITY,
            description: description.into(),
        }
    }

    /// Counts one frame.
    pub fn observe(&mut self, state: SafetyState, distance: f64) {
        self.total_frames += 1;
        self.min_distance_observed = self.min_distance_observed.min(distance);
        match state {
            SafetyState::Safe => self.safe_frames += 1,
            SafetyState::MildUnsafe => self.mild_unsafe_frames += 1,
            SafetyState::Unsafe => self.unsafe_frames += 1,
        }
    }
}

#[cfg_attr(feature = "python", pymethods)]
impl TestResult {
    /// Worst state seen on any frame.
    pub fn safety_status(&self) -> SafetyState {
        if self.unsafe_frames > 0 {
            SafetyState::Unsafe
        } else if self.mild_unsafe_frames > 0 {
            SafetyState::MildUnsafe
        } else {
            SafetyState::Safe
        }
    }

    pub fn __str__(&self) -> String {
        format!(
            "TestResult(id={}, barrier={:.2}, {} over {} frame(s), min distance {:.3})",
            self.test_id,
            self.barrier_distance,
            self.safety_status(),
            self.total_frames,
            self.min_distance_observed
        )
    }
}

/// Number of tests per overall status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub safe: usize,
    pub mild_unsafe: usize,
    #[serde(rename = "unsafe")]
    pub unsafe_count: usize,
}

impl StatusBreakdown {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a TestResult>) -> Self {
        let mut breakdown = StatusBreakdown::default();
        for result in results {
            match result.safety_status() {
                SafetyState::Safe => breakdown.safe += 1,
                SafetyState::MildUnsafe => breakdown.mild_unsafe += 1,
                SafetyState::Unsafe => breakdown.unsafe_count += 1,
            }
        }
        breakdown
    }

    pub fn total(&self) -> usize {
        self.safe + self.mild_unsafe + self.unsafe_count
    }

    /// Share of tests in `state`, in percent. Zero for an empty breakdown.
    pub fn percentage(&self, state: SafetyState) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let count = match state {
            SafetyState::Safe => self.safe,
            SafetyState::MildUnsafe => self.mild_unsafe,
            SafetyState::Unsafe => self.unsafe_count,
        };
        count as f64 / total as f64 * 100.0
    }
}

/// Barrier distance that came closest to being safe when none was.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestEffortBarrier {
    pub barrier_distance: f64,
    pub unsafe_frames: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub description: String,
    pub breakdown: StatusBreakdown,
    pub optimal_barrier_distance: Option<f64>,
    pub best_effort: Option<BestEffortBarrier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarrierSummary {
    pub barrier_distance: f64,
    pub breakdown: StatusBreakdown,
}

/// Grouped report over a batch of test results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// One entry per description, in order of first appearance.
    pub groups: Vec<GroupSummary>,
    /// One entry per barrier distance, ascending.
    pub by_barrier: Vec<BarrierSummary>,
    pub overall: StatusBreakdown,
    pub optimal_barrier_distance: Option<f64>,
}

impl BatchSummary {
    pub fn from_results(results: &[TestResult]) -> Self {
        let mut grouped: Vec<(&str, Vec<&TestResult>)> = Vec::new();
        for result in results {
            match grouped
                .iter_mut()
                .find(|(description, _)| *description == result.description)
            {
                Some((_, members)) => members.push(result),
                None => grouped.push((result.description.as_str(), vec![result])),
            }
        }

        let groups = grouped
            .into_iter()
            .map(|(description, members)| {
                let optimal_barrier_distance = optimal_barrier(members.iter().copied());
                let best_effort = if optimal_barrier_distance.is_some() {
                    None
                } else {
                    members
                        .iter()
                        .min_by_key(|r| r.unsafe_frames)
                        .map(|r| BestEffortBarrier {
                            barrier_distance: r.barrier_distance,
                            unsafe_frames: r.unsafe_frames,
                        })
                };
                GroupSummary {
                    description: description.to_string(),
                    breakdown: StatusBreakdown::from_results(members.iter().copied()),
                    optimal_barrier_distance,
                    best_effort,
                }
            })
            .collect();

        let mut barriers: Vec<f64> = results.iter().map(|r| r.barrier_distance).collect();
        barriers.sort_by_key(|&b| OrderedFloat(b));
        barriers.dedup();
        let by_barrier = barriers
            .into_iter()
            .map(|barrier_distance| BarrierSummary {
                barrier_distance,
                breakdown: StatusBreakdown::from_results(
                    results.iter().filter(|r| r.barrier_distance == barrier_distance),
                ),
            })
            .collect();

        BatchSummary {
            groups,
            by_barrier,
            overall: StatusBreakdown::from_results(results),
            optimal_barrier_distance: optimal_barrier(results),
        }
    }

    /// Writes the report to the `log` facade at `info` level.
    pub fn log(&self) {
        info!("==== TEST SUMMARY REPORT ====");
        for group in &self.groups {
            info!("Configuration: {}", group.description);
            log_breakdown(&group.breakdown);
            if let Some(barrier) = group.optimal_barrier_distance {
                info!("  optimal barrier distance: {barrier}");
            } else if let Some(best) = group.best_effort {
                info!(
                    "  best barrier distance: {} (unsafe frames: {})",
                    best.barrier_distance, best.unsafe_frames
                );
            }
        }
        info!("Overall statistics ({} tests)", self.overall.total());
        log_breakdown(&self.overall);
        if let Some(barrier) = self.optimal_barrier_distance {
            info!("  overall optimal barrier distance: {barrier}");
        }
    }
}

fn log_breakdown(breakdown: &StatusBreakdown) {
    let total = breakdown.total();
    info!(
        "  SAFE: {}/{} ({:.1}%)",
        breakdown.safe,
        total,
        breakdown.percentage(SafetyState::Safe)
    );
    info!(
        "  MILD_UNSAFE: {}/{} ({:.1}%)",
        breakdown.mild_unsafe,
        total,
        breakdown.percentage(SafetyState::MildUnsafe)
    );
    info!(
        "  UNSAFE: {}/{} ({:.1}%)",
        breakdown.unsafe_count,
        total,
        breakdown.percentage(SafetyState::Unsafe)
    );
}

/// Smallest barrier distance among results whose run stayed SAFE.
pub fn optimal_barrier<'a>(results: impl IntoIterator<Item = &'a TestResult>) -> Option<f64> {
    results
        .into_iter()
        .filter(|r| r.safety_status() == SafetyState::Safe)
        .map(|r| r.barrier_distance)
        .min_by_key(|&b| OrderedFloat(b))
}

/// Accumulates frame records and test results across a batch.
#[derive(Debug, Default, Clone)]
pub struct ResultCollector {
    results: Vec<TestResult>,
    frames: Vec<FrameRecord>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frame(&mut self, record: FrameRecord) {
        self.frames.push(record);
    }

    pub fn push_result(&mut self, result: TestResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    /// Frames recorded for one test, in frame order.
    pub fn frames_for(&self, test_id: usize) -> impl Iterator<Item = &FrameRecord> {
        self.frames.iter().filter(move |f| f.test_id == test_id)
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_results(&self.results)
    }

    pub fn save_results(&self, path: impl AsRef<Path>) -> Result<(), NavError> {
        write_yaml_file(path, &self.results)
    }

    pub fn save_frames(&self, path: impl AsRef<Path>) -> Result<(), NavError> {
        write_yaml_file(path, &self.frames)
    }

    pub fn save_summary(&self, path: impl AsRef<Path>) -> Result<(), NavError> {
        write_yaml_file(path, &self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::read_yaml_file;

    fn result(test_id: usize, barrier: f64, frames: [usize; 3], description: &str) -> TestResult {
        TestResult {
            test_id,
            barrier_distance: barrier,
            total_frames: frames.iter().sum(),
            safe_frames: frames[0],
            mild_unsafe_frames: frames[1],
            unsafe_frames: frames[2],
            min_distance_observed: 1.0,
            description: description.to_string(),
        }
    }

    #[test]
    fn test_observe_counts_sum_to_total() {
        let mut r = TestResult::new(1, 1.5, "single");
        r.observe(SafetyState::Safe, 4.0);
        r.observe(SafetyState::MildUnsafe, 1.2);
        r.observe(SafetyState::MildUnsafe, 1.0);
        r.observe(SafetyState::Unsafe, 0.3);

        assert_eq!(r.total_frames, 4);
        assert_eq!(r.safe_frames + r.mild_unsafe_frames + r.unsafe_frames, r.total_frames);
        assert_eq!(r.min_distance_observed, 0.3);
    }

    #[test]
    fn test_new_result_is_safe_with_infinite_min_distance() {
        let r = TestResult::new(7, 2.0, "");
        assert_eq!(r.safety_status(), SafetyState::Safe);
        assert!(r.min_distance_observed.is_infinite());
    }

    #[test]
    fn test_status_is_worst_frame() {
        assert_eq!(result(1, 1.0, [10, 0, 0], "a").safety_status(), SafetyState::Safe);
        assert_eq!(result(1, 1.0, [10, 3, 0], "a").safety_status(), SafetyState::MildUnsafe);
        assert_eq!(result(1, 1.0, [10, 3, 1], "a").safety_status(), SafetyState::Unsafe);
    }

    #[test]
    fn test_breakdown_percentages() {
        let results = vec![
            result(1, 1.0, [5, 0, 0], "a"),
            result(2, 1.0, [5, 1, 0], "a"),
            result(3, 1.0, [5, 1, 1], "a"),
            result(4, 1.0, [5, 0, 0], "a"),
        ];
        let breakdown = StatusBreakdown::from_results(&results);
        assert_eq!(breakdown.total(), 4);
        assert_eq!(breakdown.percentage(SafetyState::Safe), 50.0);
        assert_eq!(breakdown.percentage(SafetyState::MildUnsafe), 25.0);
        assert_eq!(breakdown.percentage(SafetyState::Unsafe), 25.0);
        assert_eq!(StatusBreakdown::default().percentage(SafetyState::Safe), 0.0);
    }

    #[test]
    fn test_optimal_barrier_is_smallest_safe() {
        let results = vec![
            result(1, 0.5, [0, 0, 3], "a"),
            result(2, 2.0, [9, 0, 0], "a"),
            result(3, 1.0, [9, 2, 0], "a"),
            result(4, 1.5, [9, 0, 0], "a"),
        ];
        assert_eq!(optimal_barrier(&results), Some(1.5));
        assert_eq!(optimal_barrier(&results[..1]), None);
    }

    #[test]
    fn test_summary_groups_by_description_in_order() {
        let results = vec![
            result(1, 1.0, [5, 0, 0], "clustered"),
            result(2, 0.5, [1, 1, 4], "single"),
            result(3, 2.0, [5, 0, 0], "clustered"),
            result(4, 1.0, [1, 1, 2], "single"),
            result(5, 1.5, [1, 1, 2], "single"),
        ];
        let summary = BatchSummary::from_results(&results);

        let names: Vec<&str> = summary.groups.iter().map(|g| g.description.as_str()).collect();
        assert_eq!(names, vec!["clustered", "single"]);

        let clustered = &summary.groups[0];
        assert_eq!(clustered.breakdown.safe, 2);
        assert_eq!(clustered.optimal_barrier_distance, Some(1.0));
        assert_eq!(clustered.best_effort, None);

        // Ties on unsafe frames keep the first result.
        let single = &summary.groups[1];
        assert_eq!(single.optimal_barrier_distance, None);
        assert_eq!(
            single.best_effort,
            Some(BestEffortBarrier {
                barrier_distance: 1.0,
                unsafe_frames: 2
            })
        );

        assert_eq!(summary.overall.total(), 5);
        assert_eq!(summary.optimal_barrier_distance, Some(1.0));

        let barriers: Vec<f64> = summary.by_barrier.iter().map(|b| b.barrier_distance).collect();
        assert_eq!(barriers, vec![0.5, 1.0, 1.5, 2.0]);
        assert_eq!(summary.by_barrier[1].breakdown.total(), 2);
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_results(&[]);
        assert!(summary.groups.is_empty());
        assert!(summary.by_barrier.is_empty());
        assert_eq!(summary.overall.total(), 0);
        assert_eq!(summary.optimal_barrier_distance, None);
        summary.log();
    }

    #[test]
    fn test_collector_filters_frames_by_test() {
        let mut collector = ResultCollector::new();
        for (test_id, frame) in [(1, 0), (1, 1), (2, 0)] {
            collector.record_frame(FrameRecord {
                test_id,
                frame,
                position: Point::new(frame as f64, 0.0),
                distance_to_obstacle: 3.0,
                safety_state: SafetyState::Safe,
            });
        }
        assert_eq!(collector.frames().len(), 3);
        assert_eq!(collector.frames_for(1).count(), 2);
        assert_eq!(collector.frames_for(3).count(), 0);
    }

    #[test]
    fn test_saved_results_can_be_read_back() {
        let mut collector = ResultCollector::new();
        collector.push_result(result(1, 1.5, [3, 1, 0], "single"));
        let mut unfinished = TestResult::new(2, 2.0, "empty");
        unfinished.observe(SafetyState::Safe, f64::INFINITY);
        collector.push_result(unfinished);

        let dir = std::env::temp_dir().join(format!("nakib-report-{}", std::process::id()));
        let path = dir.join("nested").join("results.yaml");
        collector.save_results(&path).unwrap();
        collector.save_summary(dir.join("summary.yaml")).unwrap();

        let loaded: Vec<TestResult> = read_yaml_file(&path).unwrap();
        assert_eq!(loaded, collector.results());
        assert!(loaded[1].min_distance_observed.is_infinite());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
