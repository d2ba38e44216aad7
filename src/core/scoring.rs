//! Per-file grading, confidence, and project-level aggregation.
//!
//! Every number here is a pure function of its inputs: no wall-clock
//! reads, no thread-order dependence. The bootstrap interval is the one
//! place pseudo-randomness enters, and it uses a small seeded generator
//! documented below rather than the host's `rand` so a given seed always
//! reproduces the same interval across platforms and crate versions.

use std::collections::HashMap;

use crate::core::config::{MetricWeights, RoleWeights};
use crate::core::model::{Confidence, FileMetrics, Role};

/// The four scored metrics plus the blended grade, used both per-file and
/// as the project-level rollup shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricTotals {
    pub duplication: f64,
    pub lint: f64,
    pub typing: f64,
    pub complexity: f64,
    pub grade: f64,
}

/// Blend a file's four metric scores into one grade, weighted by
/// `weights` and renormalized by their sum so a zeroed-out weight table
/// doesn't divide by zero.
pub fn weighted_grade(metrics: &FileMetrics, weights: &MetricWeights) -> f64 {
    let numerator = (1.0 - metrics.duplication_ratio) * weights.duplication * 100.0
        + metrics.lint_weighted_score * weights.lint
        + metrics.typing_score * weights.typing
        + metrics.complexity_score * weights.complexity;
    let denominator = (weights.duplication + weights.lint + weights.typing + weights.complexity).max(1e-6);
    numerator / denominator
}

/// Per-file confidence: a LOC-scaled base (`log1p(loc) / log1p(300)`,
/// capped at 1) multiplied by a per-metric degradation/parse-failure
/// penalty, then averaged into an overall figure.
pub fn file_confidence(
    loc: usize,
    parser_success: bool,
    duplication_parser_success: bool,
    lint_degraded: bool,
    typing_degraded: bool,
) -> Confidence {
    let mut base = (((loc as f64).ln_1p()) / (300_f64).ln_1p()).min(1.0);
    base *= if parser_success { 1.0 } else { 0.6 };

    let duplication = base * if duplication_parser_success { 1.0 } else { 0.5 };
    let lint = base * if lint_degraded { 0.4 } else { 1.0 };
    let typing = base * if typing_degraded { 0.4 } else { 1.0 };
    let complexity = base * if parser_success { 1.0 } else { 0.5 };
    let overall = ((duplication + lint + typing + complexity) / 4.0).min(1.0);

    Confidence { duplication, lint, typing, complexity, overall }
}

/// One file's contribution to the project rollup.
pub struct FileContribution<'a> {
    pub role: Role,
    pub loc: usize,
    pub metrics: &'a FileMetrics,
    pub grade: f64,
}

/// Role- and LOC-weighted mean of each metric (and the grade) across all
/// files: each file's contribution is scaled by `role_weight * loc`.
pub fn aggregate_project(files: &[FileContribution<'_>], role_weights: &RoleWeights) -> MetricTotals {
    let mut totals = MetricTotals::default();
    let mut weight_total = 0.0_f64;

    for file in files {
        let role_weight = file.role.weight(role_weights);
        let factor = role_weight * file.loc as f64;
        totals.duplication += (1.0 - file.metrics.duplication_ratio) * factor * 100.0;
        totals.lint += file.metrics.lint_weighted_score * factor;
        totals.typing += file.metrics.typing_score * factor;
        totals.complexity += file.metrics.complexity_score * factor;
        totals.grade += file.grade * factor;
        weight_total += factor;
    }

    if weight_total == 0.0 {
        return MetricTotals::default();
    }
    let denom = weight_total.max(1e-6);
    MetricTotals {
        duplication: totals.duplication / denom,
        lint: totals.lint / denom,
        typing: totals.typing / denom,
        complexity: totals.complexity / denom,
        grade: totals.grade / denom,
    }
}

/// A splitmix64 generator, chosen for a tiny, dependency-free, portable
/// implementation with good statistical properties — not a stand-in for
/// CPython's Mersenne Twister, which this project has no need to bit-match.
/// Given the same `(seed, iterations)`, the bootstrap interval below is
/// reproducible across platforms and crate versions.
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    /// Pick a uniformly-distributed index in `0..len`.
    fn index(&mut self, len: usize) -> usize {
        (self.next_u64() % len as u64) as usize
    }
}

/// A `[lower, upper]` 90% bootstrap confidence interval on the mean of
/// `values`, resampling with replacement `iterations` times.
pub fn bootstrap_interval(values: &[f64], iterations: usize, seed: u64) -> [f64; 2] {
    if values.is_empty() {
        return [0.0, 0.0];
    }
    let mut rng = SplitMix64::new(seed);
    let mut samples: Vec<f64> = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        let mut sum = 0.0;
        for _ in 0..values.len() {
            sum += values[rng.index(values.len())];
        }
        samples.push(sum / values.len() as f64);
    }
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = samples.len();
    let lower_idx = ((0.05 * (n - 1) as f64) as usize).min(n - 1);
    let upper_idx = ((0.95 * (n - 1) as f64) as usize).min(n - 1);
    [samples[lower_idx], samples[upper_idx]]
}

/// Role- and parser-failure-agnostic mean of one metric's per-file
/// confidence values, falling back to `0.0` when there are no files.
pub fn mean_confidence(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let count = values.clone().count();
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::LintCounts;

    fn metrics() -> FileMetrics {
        FileMetrics {
            duplication_ratio: 0.0,
            lint_counts: LintCounts::default(),
            lint_weighted_score: 100.0,
            typing_errors: 0,
            typing_score: 100.0,
            annotation_coverage: 1.0,
            cognitive_complexity: 0,
            complexity_score: 100.0,
            complexity_per_loc: 0.0,
        }
    }

    #[test]
    fn perfect_metrics_grade_100() {
        let weights = MetricWeights::default();
        assert!((weighted_grade(&metrics(), &weights) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_weights_do_not_divide_by_zero() {
        let weights = MetricWeights { duplication: 0.0, lint: 0.0, typing: 0.0, complexity: 0.0 };
        let grade = weighted_grade(&metrics(), &weights);
        assert!(grade.is_finite());
    }

    #[test]
    fn confidence_scales_with_loc() {
        let small = file_confidence(5, true, true, false, false);
        let large = file_confidence(2000, true, true, false, false);
        assert!(small.overall < large.overall);
        assert!(large.overall <= 1.0);
    }

    #[test]
    fn degradation_halves_the_affected_metric_only() {
        let clean = file_confidence(300, true, true, false, false);
        let lint_degraded = file_confidence(300, true, true, true, false);
        assert!(lint_degraded.lint < clean.lint);
        assert_eq!(lint_degraded.typing, clean.typing);
    }

    #[test]
    fn bootstrap_is_deterministic_for_a_seed() {
        let values = vec![80.0, 90.0, 70.0, 60.0, 100.0];
        let a = bootstrap_interval(&values, 200, 1337);
        let b = bootstrap_interval(&values, 200, 1337);
        assert_eq!(a, b);
        assert!(a[0] <= a[1]);
    }

    #[test]
    fn bootstrap_empty_values_is_zero_interval() {
        assert_eq!(bootstrap_interval(&[], 100, 1337), [0.0, 0.0]);
    }

    #[test]
    fn aggregate_weights_by_role_and_loc() {
        let m = metrics();
        let files = vec![
            FileContribution { role: Role::Default, loc: 100, metrics: &m, grade: 100.0 },
            FileContribution { role: Role::Generated, loc: 10_000, metrics: &m, grade: 0.0 },
        ];
        // Generated role has weight 0.0 by default, so it must not drag the grade down.
        let totals = aggregate_project(&files, &RoleWeights::default());
        assert!((totals.grade - 100.0).abs() < 1e-9);
    }

    #[test]
    fn aggregate_with_no_files_is_zeroed() {
        let totals = aggregate_project(&[], &RoleWeights::default());
        assert_eq!(totals.grade, 0.0);
    }
}
