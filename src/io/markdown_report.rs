//! Markdown rendering of a [`Report`]: a project summary table,
//! architecture violations, top-10 lists per metric, and the tool
//! versions used for the run.

use crate::core::model::Report;

/// Render `report` as a Markdown document.
pub fn render(report: &Report) -> String {
    let project = &report.project;
    let mut out = String::new();

    out.push_str("# Code Quotient Report\n\n");
    out.push_str("## Project Summary\n\n");
    out.push_str("| Metric | Score | Confidence |\n");
    out.push_str("| --- | --- | --- |\n");
    let per_metric = |key: &str| project.confidence.per_metric.get(key).copied().unwrap_or(0.0);
    out.push_str(&format!(
        "| Duplication | {:.2} | {:.2} |\n",
        project.summary.duplication,
        per_metric("duplication")
    ));
    out.push_str(&format!("| Lint | {:.2} | {:.2} |\n", project.summary.lint, per_metric("lint")));
    out.push_str(&format!("| Typing | {:.2} | {:.2} |\n", project.summary.typing, per_metric("typing")));
    out.push_str(&format!(
        "| Complexity | {:.2} | {:.2} |\n",
        project.summary.complexity,
        per_metric("complexity")
    ));
    let interval = project.confidence.intervals.get("grade").copied().unwrap_or([0.0, 0.0]);
    out.push_str(&format!(
        "| Grade | {:.2} | CI: {:.2}-{:.2} |\n",
        project.summary.grade, interval[0], interval[1]
    ));
    out.push('\n');

    out.push_str("## Architecture Violations\n\n");
    if project.architecture_violations.is_empty() {
        out.push_str("- None detected\n");
    } else {
        for v in &project.architecture_violations {
            out.push_str(&format!(
                "- `{}`: {} -> {} via `{}`\n",
                v.file, v.from_layer, v.to_layer, v.import_name
            ));
        }
    }
    out.push('\n');

    let mut by_duplication: Vec<_> = report.files.iter().collect();
    by_duplication.sort_by(|a, b| b.metrics.duplication_ratio.partial_cmp(&a.metrics.duplication_ratio).unwrap());
    out.push_str("## Top 10 Duplication\n\n");
    for file in by_duplication.iter().take(10) {
        out.push_str(&format!("- `{}` ({:.2})\n", file.path, file.metrics.duplication_ratio));
    }
    out.push('\n');

    let mut by_lint: Vec<_> = report.files.iter().collect();
    by_lint.sort_by(|a, b| a.metrics.lint_weighted_score.partial_cmp(&b.metrics.lint_weighted_score).unwrap());
    out.push_str("## Top 10 Lint Findings\n\n");
    for file in by_lint.iter().take(10) {
        let counts = &file.metrics.lint_counts;
        out.push_str(&format!(
            "- `{}` (score {:.2}, counts {{'C': {}, 'W': {}, 'R': {}, 'E': {}}})\n",
            file.path, file.metrics.lint_weighted_score, counts.c, counts.w, counts.r, counts.e
        ));
    }
    out.push('\n');

    let mut by_complexity: Vec<_> = report.files.iter().collect();
    by_complexity.sort_by(|a, b| {
        b.metrics.complexity_per_loc.partial_cmp(&a.metrics.complexity_per_loc).unwrap()
    });
    out.push_str("## Top 10 Cognitive Complexity\n\n");
    for file in by_complexity.iter().take(10) {
        out.push_str(&format!(
            "- `{}` (complexity {}, per LOC {:.2})\n",
            file.path, file.metrics.cognitive_complexity, file.metrics.complexity_per_loc
        ));
    }
    out.push('\n');

    out.push_str("## Tools\n\n");
    let mut tools: Vec<_> = report.meta.tools.iter().collect();
    tools.sort_by_key(|(name, _)| name.to_string());
    for (name, value) in tools {
        out.push_str(&format!("- {name}: {value}\n"));
    }
    out.push('\n');

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::*;
    use std::collections::HashMap;

    fn empty_report() -> Report {
        Report {
            meta: ReportMeta { generated_at: "now".to_string(), cq_version: "0.1.0".to_string(), tools: HashMap::new() },
            project: ProjectReport {
                path: ".".to_string(),
                weights: WeightsSnapshot { metrics: HashMap::new(), pylint_categories: HashMap::new() },
                role_weights: RoleWeightsSnapshot(HashMap::new()),
                summary: ProjectSummary { duplication: 0.0, lint: 0.0, typing: 0.0, complexity: 0.0, grade: 0.0 },
                confidence: ProjectConfidence { per_metric: HashMap::new(), intervals: HashMap::new(), degraded: vec![] },
                architecture_violations: vec![],
            },
            files: vec![],
        }
    }

    #[test]
    fn renders_headings_in_order() {
        let md = render(&empty_report());
        let summary_idx = md.find("## Project Summary").unwrap();
        let arch_idx = md.find("## Architecture Violations").unwrap();
        let tools_idx = md.find("## Tools").unwrap();
        assert!(summary_idx < arch_idx);
        assert!(arch_idx < tools_idx);
    }

    #[test]
    fn no_violations_renders_none_detected() {
        let md = render(&empty_report());
        assert!(md.contains("- None detected"));
    }
}
