//! Structural validation of the serialized report shape.
//!
//! No JSON-Schema-validator crate appears anywhere in the retrieved
//! corpus, so rather than reaching for an unrelated dependency this
//! checks the handful of required fields and types directly against the
//! `serde_json::Value` tree — the same shape `serialize_report` produces.
//! Validation failure is informational: the report is still written, and
//! the caller surfaces it as a non-zero exit code rather than aborting.

use serde_json::{json, Value};

/// A representative JSON Schema document describing the shape
/// [`validate`] checks. There is no schema-validator crate anywhere in
/// the retrieved corpus to drive off an embedded schema asset, so this
/// is generated from the same field list `validate` walks rather than
/// kept as a separate source of truth that could drift from it.
pub fn schema_document() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "cq report",
        "type": "object",
        "required": ["meta", "project", "files"],
        "properties": {
            "meta": {"type": "object"},
            "project": {
                "type": "object",
                "required": ["path", "weights", "role_weights", "summary", "confidence", "architecture"],
                "properties": {
                    "summary": {
                        "type": "object",
                        "required": ["duplication", "lint", "typing", "complexity", "grade"],
                        "properties": {
                            "duplication": {"type": "number"},
                            "lint": {"type": "number"},
                            "typing": {"type": "number"},
                            "complexity": {"type": "number"},
                            "grade": {"type": "number"}
                        }
                    }
                }
            },
            "files": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["path", "loc", "role", "metrics", "grade", "confidence", "missing_reasons"]
                }
            }
        }
    })
}

/// Validate `data` against the report shape, returning every violation
/// found (empty means valid).
pub fn validate(data: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    require_object(data, "$", &mut errors);
    require_field(data, "meta", &mut errors);
    require_field(data, "project", &mut errors);
    require_field(data, "files", &mut errors);

    if let Some(project) = data.get("project") {
        for field in ["path", "weights", "role_weights", "summary", "confidence", "architecture"] {
            require_field(project, field, &mut errors);
        }
        if let Some(summary) = project.get("summary") {
            for field in ["duplication", "lint", "typing", "complexity", "grade"] {
                require_number(summary, field, &mut errors, "project.summary");
            }
        }
    }

    if let Some(files) = data.get("files").and_then(Value::as_array) {
        for (idx, file) in files.iter().enumerate() {
            let ctx = format!("files[{idx}]");
            for field in ["path", "loc", "role", "metrics", "grade", "confidence", "missing_reasons"] {
                require_field_ctx(file, field, &ctx, &mut errors);
            }
        }
    } else if data.get("files").is_some() {
        errors.push("files must be an array".to_string());
    }

    errors
}

fn require_object(value: &Value, ctx: &str, errors: &mut Vec<String>) {
    if !value.is_object() {
        errors.push(format!("{ctx} must be an object"));
    }
}

fn require_field(value: &Value, field: &str, errors: &mut Vec<String>) {
    require_field_ctx(value, field, "$", errors);
}

fn require_field_ctx(value: &Value, field: &str, ctx: &str, errors: &mut Vec<String>) {
    if value.get(field).is_none() {
        errors.push(format!("{ctx}.{field} is required"));
    }
}

fn require_number(value: &Value, field: &str, errors: &mut Vec<String>, ctx: &str) {
    match value.get(field) {
        Some(v) if v.is_number() => {}
        Some(_) => errors.push(format!("{ctx}.{field} must be a number")),
        None => errors.push(format!("{ctx}.{field} is required")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn well_formed_report_validates_clean() {
        let data = json!({
            "meta": {},
            "project": {
                "path": ".",
                "weights": {},
                "role_weights": {},
                "summary": {"duplication": 1.0, "lint": 1.0, "typing": 1.0, "complexity": 1.0, "grade": 1.0},
                "confidence": {},
                "architecture": {"violations": []}
            },
            "files": []
        });
        assert!(validate(&data).is_empty());
    }

    #[test]
    fn missing_top_level_field_is_reported() {
        let data = json!({"project": {}, "files": []});
        let errors = validate(&data);
        assert!(errors.iter().any(|e| e.contains("meta")));
    }

    #[test]
    fn schema_document_describes_required_top_level_fields() {
        let doc = schema_document();
        let required = doc["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "files"));
    }

    #[test]
    fn missing_file_field_is_reported_with_index() {
        let data = json!({
            "meta": {},
            "project": {
                "path": ".", "weights": {}, "role_weights": {},
                "summary": {"duplication": 1.0, "lint": 1.0, "typing": 1.0, "complexity": 1.0, "grade": 1.0},
                "confidence": {}, "architecture": {"violations": []}
            },
            "files": [{"path": "a.py"}]
        });
        let errors = validate(&data);
        assert!(errors.iter().any(|e| e.contains("files[0].loc")));
    }
}
