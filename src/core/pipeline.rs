//! Top-level scan orchestration: enumerate sources, run every detector
//! and tool adapter, score and aggregate, and assemble the final
//! [`Report`]. Mirrors the reference runner's single `run()` entry point,
//! split into named stages so each can be tested independently.

use std::collections::HashMap;
use std::path::Path;

use rayon::prelude::*;

use crate::core::ast_service;
use crate::core::config::Config;
use crate::core::errors::{CqError, Result};
use crate::core::model::{
    FileMetrics, FileReport, ProjectConfidence, ProjectReport, ProjectSummary, Report, ReportMeta,
    Role, SourceFile, WeightsSnapshot, RoleWeightsSnapshot,
};
use crate::core::scoring::{self, FileContribution};
use crate::detectors::{architecture, complexity, duplication};
use crate::tools::{lint, typing};

/// Drives one full scan of a project root against a resolved [`Config`].
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the full scan: enumerate, analyze, score, and assemble the
    /// report. `generated_at` is supplied by the caller (an RFC 3339
    /// timestamp) so the pipeline itself has no wall-clock dependency.
    pub async fn analyze_directory(&self, root: &Path, generated_at: String) -> Result<Report> {
        let sources = crate::core::fs_enum::enumerate_sources(root, &self.config.paths)
            .map_err(|e| CqError::pipeline("enumerate", e.to_string()))?;

        let parsed: Vec<(bool, f64)> = sources
            .par_iter()
            .map(|f| {
                let outcome = ast_service::parse(&f.source);
                match (&outcome.module, outcome.success) {
                    (Some(module), true) => {
                        let (annotated, total) = ast_service::count_annotation_coverage(module);
                        let coverage = if total > 0 { annotated as f64 / total as f64 } else { 0.0 };
                        (true, coverage)
                    }
                    _ => (false, 0.0),
                }
            })
            .collect();

        let duplication_out = duplication::analyze(&sources, &self.config.duplication);
        let architecture_violations = architecture::analyze(&sources, &self.config.arch);
        let complexity_out: HashMap<String, complexity::ComplexityOutcome> =
            complexity::analyze(&sources, &self.config.scoring.complexity_scale)
                .into_iter()
                .collect();

        let abs_paths: Vec<String> = sources
            .iter()
            .map(|f| root.join(&f.path).to_string_lossy().into_owned())
            .collect();
        let loc_map: HashMap<String, usize> = sources
            .iter()
            .zip(&abs_paths)
            .map(|(f, abs)| (abs.clone(), f.loc))
            .collect();

        let lint_out = lint::analyze(&abs_paths, &self.config.tools, &self.config.weights.pylint_categories).await;
        let typing_out = typing::analyze(
            &abs_paths,
            &loc_map,
            &self.config.tools,
            &self.config.scoring.typing_error_scale.per_1k_loc,
        )
        .await;

        let mut degraded_metrics: Vec<String> = Vec::new();
        if lint_out.degraded {
            degraded_metrics.push("lint".to_string());
        }
        if typing_out.degraded {
            degraded_metrics.push("typing".to_string());
        }
        degraded_metrics.sort();

        let mut files_report = Vec::with_capacity(sources.len());
        for (idx, source) in sources.iter().enumerate() {
            let abs = &abs_paths[idx];
            let (parser_success, coverage) = parsed[idx];
            let mut missing = Vec::new();

            let lint_counts = lint_out.counts.get(abs).copied().unwrap_or_default();
            let lint_score = lint_out.weighted_scores.get(abs).copied().unwrap_or(100.0);
            if lint_out.degraded {
                missing.push(lint_out.missing_reason.clone().unwrap_or_else(|| "pylint degraded".to_string()));
            }

            let typing_errors = typing_out.errors.get(abs).copied().unwrap_or(0);
            let typing_score = typing_out.scores.get(abs).copied().unwrap_or(100.0);
            if typing_out.degraded {
                missing.push(typing_out.missing_reason.clone().unwrap_or_else(|| "mypy degraded".to_string()));
            }

            let dup = duplication_out.get(&source.path);
            let duplication_ratio = dup.map(|d| d.ratio).unwrap_or(0.0);
            let duplication_parser_success = dup.map(|d| d.parser_success).unwrap_or(false);

            let comp = complexity_out.get(&source.path).copied().unwrap_or(complexity::ComplexityOutcome {
                raw: 0,
                per_loc: 0.0,
                score: 100.0,
            });

            let metrics = FileMetrics {
                duplication_ratio,
                lint_counts,
                lint_weighted_score: lint_score,
                typing_errors,
                typing_score,
                annotation_coverage: coverage,
                cognitive_complexity: comp.raw,
                complexity_score: comp.score,
                complexity_per_loc: comp.per_loc,
            };

            let grade = scoring::weighted_grade(&metrics, &self.config.weights.metrics);
            let confidence = scoring::file_confidence(
                source.loc,
                parser_success,
                duplication_parser_success,
                lint_out.degraded,
                typing_out.degraded,
            );

            files_report.push(FileReport {
                path: source.path.clone(),
                loc: source.loc,
                role: source.role.as_str().to_string(),
                metrics,
                grade,
                confidence,
                missing_reasons: missing,
            });
        }

        let contributions: Vec<FileContribution<'_>> = files_report
            .iter()
            .map(|f| FileContribution {
                role: Role::detect(&f.path),
                loc: f.loc,
                metrics: &f.metrics,
                grade: f.grade,
            })
            .collect();
        let project_metrics = scoring::aggregate_project(&contributions, &self.config.weights.roles);

        let grades: Vec<f64> = files_report.iter().map(|f| f.grade).collect();
        let interval = scoring::bootstrap_interval(&grades, self.config.bootstrap.iterations, self.config.bootstrap.seed);

        let per_metric = HashMap::from([
            ("duplication".to_string(), scoring::mean_confidence(files_report.iter().map(|f| f.confidence.duplication))),
            ("lint".to_string(), scoring::mean_confidence(files_report.iter().map(|f| f.confidence.lint))),
            ("typing".to_string(), scoring::mean_confidence(files_report.iter().map(|f| f.confidence.typing))),
            ("complexity".to_string(), scoring::mean_confidence(files_report.iter().map(|f| f.confidence.complexity))),
        ]);
        let intervals = HashMap::from([("grade".to_string(), interval)]);

        let project_report = ProjectReport {
            path: root.to_string_lossy().into_owned(),
            weights: WeightsSnapshot::from(&self.config.weights),
            role_weights: RoleWeightsSnapshot::from(&self.config.weights.roles),
            summary: ProjectSummary {
                duplication: project_metrics.duplication,
                lint: project_metrics.lint,
                typing: project_metrics.typing,
                complexity: project_metrics.complexity,
                grade: project_metrics.grade,
            },
            confidence: ProjectConfidence { per_metric, intervals, degraded: degraded_metrics },
            architecture_violations,
        };

        let tools: HashMap<String, String> = HashMap::from([
            ("pylint".to_string(), self.config.tools.pylint_cmd.clone()),
            ("mypy".to_string(), self.config.tools.mypy_cmd.clone()),
        ]);

        Ok(Report {
            meta: ReportMeta {
                generated_at,
                cq_version: crate::VERSION.to_string(),
                tools,
            },
            project: project_report,
            files: files_report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use tempfile::tempdir;

    #[tokio::test]
    async fn scan_of_empty_tree_produces_zeroed_report() {
        let dir = tempdir().unwrap();
        let pipeline = Pipeline::new(Config::default());
        let report = pipeline.analyze_directory(dir.path(), "2026-01-01T00:00:00Z".to_string()).await.unwrap();
        assert!(report.files.is_empty());
        assert_eq!(report.project.summary.grade, 0.0);
    }

    #[tokio::test]
    async fn scan_picks_up_python_files_and_scores_them() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "def f(a: int) -> int:\n    return a\n").unwrap();
        let pipeline = Pipeline::new(Config::default());
        let report = pipeline.analyze_directory(dir.path(), "2026-01-01T00:00:00Z".to_string()).await.unwrap();
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].path, "a.py");
        assert!(report.files[0].grade > 0.0);
    }
}
