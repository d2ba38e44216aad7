//! JSON serialization of a [`Report`], in the exact nested shape
//! downstream consumers (and [`crate::io::schema::validate`]) expect —
//! lint/typing/complexity each get their own sub-object rather than
//! being flattened.

use serde_json::{json, Value};

use crate::core::model::Report;

/// Build the serializable JSON tree for `report`.
pub fn serialize_report(report: &Report) -> Value {
    json!({
        "meta": {
            "generated_at": report.meta.generated_at,
            "cq_version": report.meta.cq_version,
            "tools": report.meta.tools,
        },
        "project": {
            "path": report.project.path,
            "weights": {
                "metrics": report.project.weights.metrics,
                "pylint_categories": report.project.weights.pylint_categories,
            },
            "role_weights": report.project.role_weights.0,
            "summary": {
                "duplication": report.project.summary.duplication,
                "lint": report.project.summary.lint,
                "typing": report.project.summary.typing,
                "complexity": report.project.summary.complexity,
                "grade": report.project.summary.grade,
            },
            "confidence": {
                "per_metric": report.project.confidence.per_metric,
                "intervals": report.project.confidence.intervals,
                "degraded": report.project.confidence.degraded,
            },
            "architecture": {
                "violations": report.project.architecture_violations.iter().map(|v| json!({
                    "file": v.file,
                    "from_layer": v.from_layer,
                    "to_layer": v.to_layer,
                    "import": v.import_name,
                })).collect::<Vec<_>>(),
            },
        },
        "files": report.files.iter().map(|file| json!({
            "path": file.path,
            "loc": file.loc,
            "role": file.role,
            "metrics": {
                "duplication_ratio": file.metrics.duplication_ratio,
                "lint": {
                    "C": file.metrics.lint_counts.c,
                    "W": file.metrics.lint_counts.w,
                    "R": file.metrics.lint_counts.r,
                    "E": file.metrics.lint_counts.e,
                    "weighted_score": file.metrics.lint_weighted_score,
                },
                "typing": {
                    "mypy_errors": file.metrics.typing_errors,
                    "annotation_coverage": file.metrics.annotation_coverage,
                    "score": file.metrics.typing_score,
                },
                "complexity": {
                    "cognitive": file.metrics.cognitive_complexity,
                    "per_loc": file.metrics.complexity_per_loc,
                    "score": file.metrics.complexity_score,
                },
            },
            "grade": file.grade,
            "confidence": {
                "duplication": file.confidence.duplication,
                "lint": file.confidence.lint,
                "typing": file.confidence.typing,
                "complexity": file.confidence.complexity,
                "overall": file.confidence.overall,
            },
            "missing_reasons": file.missing_reasons,
        })).collect::<Vec<_>>(),
    })
}

/// Render `report` as pretty-printed, key-sorted JSON text.
pub fn render(report: &Report) -> crate::core::errors::Result<String> {
    let value = serialize_report(report);
    let sorted = sort_keys(value);
    Ok(serde_json::to_string_pretty(&sorted)?)
}

/// Recursively sort object keys so output is byte-stable across runs,
/// matching `json.dumps(..., sort_keys=True)`.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted = serde_json::Map::new();
            let mut keys: Vec<_> = map.keys().cloned().collect();
            keys.sort();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(map[&key].clone()));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::*;
    use std::collections::HashMap;

    fn sample_report() -> Report {
        Report {
            meta: ReportMeta {
                generated_at: "2026-01-01T00:00:00Z".to_string(),
                cq_version: "0.1.0".to_string(),
                tools: HashMap::new(),
            },
            project: ProjectReport {
                path: ".".to_string(),
                weights: WeightsSnapshot { metrics: HashMap::new(), pylint_categories: HashMap::new() },
                role_weights: RoleWeightsSnapshot(HashMap::new()),
                summary: ProjectSummary { duplication: 90.0, lint: 90.0, typing: 90.0, complexity: 90.0, grade: 90.0 },
                confidence: ProjectConfidence { per_metric: HashMap::new(), intervals: HashMap::new(), degraded: vec![] },
                architecture_violations: vec![],
            },
            files: vec![],
        }
    }

    #[test]
    fn serializes_nested_lint_typing_complexity_shape() {
        let value = serialize_report(&sample_report());
        assert!(value["project"]["summary"]["grade"].is_number());
        assert!(value["files"].is_array());
    }

    #[test]
    fn render_produces_sorted_keys() {
        let text = render(&sample_report()).unwrap();
        assert!(text.contains("\"confidence\""));
    }
}
