//! In-memory report data model.
//!
//! These types are constructed once per scan and are immutable
//! thereafter; [`ProjectReport`] owns its [`FileReport`]s and there is no
//! cross-scan state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::config::{RoleWeights, WeightsConfig};

/// The heuristic role a source file plays, used only to weight its
/// contribution to the project aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Default,
    Test,
    Config,
    Vendor,
    Generated,
}

impl Role {
    /// Heuristically classify a path by substring hints, matching the
    /// precedence order test > config > vendor > generated > default.
    pub fn detect(path: &str) -> Self {
        let lower = path.to_lowercase();
        const TEST_HINTS: &[&str] = &["tests", "test_"];
        const CONFIG_HINTS: &[&str] = &["config", "settings", "cfg", "ini", "yml", "yaml"];
        const VENDOR_HINTS: &[&str] = &["vendor", "third_party", "site-packages"];
        const GENERATED_HINTS: &[&str] = &["build", "dist"];

        if TEST_HINTS.iter().any(|h| lower.contains(h)) {
            Role::Test
        } else if CONFIG_HINTS.iter().any(|h| lower.contains(h)) {
            Role::Config
        } else if VENDOR_HINTS.iter().any(|h| lower.contains(h)) {
            Role::Vendor
        } else if GENERATED_HINTS.iter().any(|h| lower.contains(h)) {
            Role::Generated
        } else {
            Role::Default
        }
    }

    /// Look up this role's aggregation weight in a [`RoleWeights`] table.
    pub fn weight(&self, weights: &RoleWeights) -> f64 {
        match self {
            Role::Default => weights.default,
            Role::Test => weights.test,
            Role::Config => weights.config,
            Role::Vendor => weights.vendor,
            Role::Generated => weights.generated,
        }
    }

    /// Lowercase string form, used for map keys and serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Default => "default",
            Role::Test => "test",
            Role::Config => "config",
            Role::Vendor => "vendor",
            Role::Generated => "generated",
        }
    }
}

/// A source file as read from disk, before any analyzer has touched it.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path relative to the scan root, using `/` separators.
    pub path: String,
    /// Raw file contents.
    pub source: String,
    /// Count of line separators in `source`.
    pub loc: usize,
    /// Heuristically assigned role.
    pub role: Role,
}

impl SourceFile {
    /// Build a record from a relative path and its contents. `loc` is the
    /// count of newline-terminated lines, matching `str::lines` applied to
    /// content that may or may not end in a trailing newline.
    pub fn new(path: impl Into<String>, source: impl Into<String>) -> Self {
        let path = path.into();
        let source = source.into();
        let loc = source.matches('\n').count() + usize::from(!source.is_empty() && !source.ends_with('\n'));
        let role = Role::detect(&path);
        Self {
            path,
            source,
            loc,
            role,
        }
    }
}

/// A single architecture-conformance violation: an import crossing an
/// edge the configured policy does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureViolation {
    pub file: String,
    pub from_layer: String,
    pub to_layer: String,
    pub import_name: String,
}

/// Per-file metrics contributed by each analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetrics {
    pub duplication_ratio: f64,
    pub lint_counts: LintCounts,
    pub lint_weighted_score: f64,
    pub typing_errors: u32,
    pub typing_score: f64,
    pub annotation_coverage: f64,
    pub cognitive_complexity: u32,
    pub complexity_score: f64,
    pub complexity_per_loc: f64,
}

/// Lint category counts, `{C, W, R, E}`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LintCounts {
    #[serde(rename = "C")]
    pub c: u32,
    #[serde(rename = "W")]
    pub w: u32,
    #[serde(rename = "R")]
    pub r: u32,
    #[serde(rename = "E")]
    pub e: u32,
}

/// Per-file confidence, one weight in `[0, 1]` per metric plus an overall
/// figure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Confidence {
    pub duplication: f64,
    pub lint: f64,
    pub typing: f64,
    pub complexity: f64,
    pub overall: f64,
}

/// A fully-scored file, ready to be folded into the project aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: String,
    pub loc: usize,
    pub role: String,
    pub metrics: FileMetrics,
    pub grade: f64,
    pub confidence: Confidence,
    pub missing_reasons: Vec<String>,
}

/// Project-level summary: the role- and LOC-weighted mean of each metric.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub duplication: f64,
    pub lint: f64,
    pub typing: f64,
    pub complexity: f64,
    pub grade: f64,
}

/// Project-level confidence: per-metric means plus the bootstrap interval
/// on the grade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfidence {
    pub per_metric: HashMap<String, f64>,
    pub intervals: HashMap<String, [f64; 2]>,
    pub degraded: Vec<String>,
}

/// The project-level rollup of a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectReport {
    pub path: String,
    pub weights: WeightsSnapshot,
    pub role_weights: RoleWeightsSnapshot,
    pub summary: ProjectSummary,
    pub confidence: ProjectConfidence,
    pub architecture_violations: Vec<ArchitectureViolation>,
}

/// A serializable snapshot of the weights actually used for a scan,
/// echoed back in the report for reproducibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightsSnapshot {
    pub metrics: HashMap<String, f64>,
    pub pylint_categories: HashMap<String, f64>,
}

impl From<&WeightsConfig> for WeightsSnapshot {
    fn from(w: &WeightsConfig) -> Self {
        Self {
            metrics: HashMap::from([
                ("duplication".to_string(), w.metrics.duplication),
                ("lint".to_string(), w.metrics.lint),
                ("typing".to_string(), w.metrics.typing),
                ("complexity".to_string(), w.metrics.complexity),
            ]),
            pylint_categories: HashMap::from([
                ("C".to_string(), w.pylint_categories.c),
                ("W".to_string(), w.pylint_categories.w),
                ("R".to_string(), w.pylint_categories.r),
                ("E".to_string(), w.pylint_categories.e),
            ]),
        }
    }
}

/// A serializable snapshot of per-role aggregation weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleWeightsSnapshot(pub HashMap<String, f64>);

impl From<&RoleWeights> for RoleWeightsSnapshot {
    fn from(w: &RoleWeights) -> Self {
        Self(HashMap::from([
            ("default".to_string(), w.default),
            ("test".to_string(), w.test),
            ("config".to_string(), w.config),
            ("vendor".to_string(), w.vendor),
            ("generated".to_string(), w.generated),
        ]))
    }
}

/// Run metadata, echoed at the top of the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub generated_at: String,
    pub cq_version: String,
    pub tools: HashMap<String, String>,
}

/// The full report: metadata, project rollup, and per-file detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub project: ProjectReport,
    pub files: Vec<FileReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_detection_prefers_test_over_config() {
        assert_eq!(Role::detect("tests/test_config.py"), Role::Test);
    }

    #[test]
    fn role_detection_defaults() {
        assert_eq!(Role::detect("src/core/service.py"), Role::Default);
    }

    #[test]
    fn role_detection_vendor() {
        assert_eq!(Role::detect("third_party/lib.py"), Role::Vendor);
    }

    #[test]
    fn loc_counts_trailing_newline_correctly() {
        let f = SourceFile::new("a.py", "a\nb\nc\n");
        assert_eq!(f.loc, 3);
        let g = SourceFile::new("b.py", "a\nb\nc");
        assert_eq!(g.loc, 3);
        let h = SourceFile::new("empty.py", "");
        assert_eq!(h.loc, 0);
    }
}
