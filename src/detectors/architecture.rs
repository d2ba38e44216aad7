//! Architecture-conformance checking.
//!
//! A path or imported module is classified into a layer by the
//! longest-matching configured prefix; an import from a file's layer to
//! a layer not named in the allowed-edge set is a violation. Files and
//! their imports are walked in the order they were provided, so output
//! order is a pure function of input order — no deduplication, no
//! sorting by severity.

use crate::core::ast_service;
use crate::core::config::ArchConfig;
use crate::core::model::{ArchitectureViolation, SourceFile};

/// Prefix-to-layer table, sorted longest-prefix-first once at
/// construction so lookups are a simple linear scan.
pub struct LayerMap {
    sorted_prefixes: Vec<(String, String)>,
    allowed_edges: Vec<[String; 2]>,
}

impl LayerMap {
    pub fn new(config: &ArchConfig) -> Self {
        let mut sorted_prefixes: Vec<(String, String)> = config
            .map
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        sorted_prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self {
            sorted_prefixes,
            allowed_edges: config.allowed_edges.clone(),
        }
    }

    fn layer_for(&self, normalized: &str) -> Option<&str> {
        self.sorted_prefixes
            .iter()
            .find(|(prefix, _)| normalized.starts_with(prefix.as_str()))
            .map(|(_, layer)| layer.as_str())
    }

    fn layer_for_path(&self, path: &str) -> Option<String> {
        let normalized = path.replace('\\', "/");
        self.layer_for(&normalized).map(str::to_string)
    }

    fn layer_for_module(&self, module: &str) -> Option<String> {
        let normalized = module.replace('.', "/");
        self.layer_for(&normalized).map(str::to_string)
    }

    fn edge_allowed(&self, from: &str, to: &str) -> bool {
        self.allowed_edges
            .iter()
            .any(|edge| edge[0] == from && edge[1] == to)
    }
}

/// Check every file for imports that cross a disallowed layer boundary.
/// Unparsable files and files outside any configured layer are silently
/// skipped, matching the reference analyzer.
pub fn analyze(files: &[SourceFile], config: &ArchConfig) -> Vec<ArchitectureViolation> {
    let map = LayerMap::new(config);
    let mut violations = Vec::new();

    for file in files {
        let outcome = ast_service::parse(&file.source);
        let module = match (outcome.module, outcome.success) {
            (Some(m), true) => m,
            _ => continue,
        };
        let from_layer = match map.layer_for_path(&file.path) {
            Some(l) => l,
            None => continue,
        };

        for (full_name, root) in ast_service::iter_imports(&module) {
            let lookup = if full_name.is_empty() { root.clone() } else { full_name.clone() };
            let target_layer = match map.layer_for_module(&lookup) {
                Some(l) => l,
                None => continue,
            };
            if !map.edge_allowed(&from_layer, &target_layer) {
                violations.push(ArchitectureViolation {
                    file: file.path.clone(),
                    from_layer: from_layer.clone(),
                    to_layer: target_layer,
                    import_name: full_name,
                });
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ArchConfig;

    fn config() -> ArchConfig {
        ArchConfig::default()
    }

    #[test]
    fn ui_importing_core_is_allowed() {
        let files = vec![SourceFile::new("src/ui/widgets.py", "import src.core.engine\n")];
        let violations = analyze(&files, &config());
        assert!(violations.is_empty());
    }

    #[test]
    fn core_importing_ui_is_a_violation() {
        let files = vec![SourceFile::new("src/core/engine.py", "import src.ui.widgets\n")];
        let violations = analyze(&files, &config());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].from_layer, "core");
        assert_eq!(violations[0].to_layer, "ui");
    }

    #[test]
    fn files_outside_any_layer_are_skipped() {
        let files = vec![SourceFile::new("scripts/run.py", "import src.ui.widgets\n")];
        assert!(analyze(&files, &config()).is_empty());
    }

    #[test]
    fn longest_prefix_wins() {
        let mut cfg = config();
        cfg.map.insert("src/core/legacy".to_string(), "ui".to_string());
        let files = vec![SourceFile::new("src/core/legacy/x.py", "import src.ui.widgets\n")];
        // src/core/legacy is the longer, more specific match -> layer ui -> ui->ui allowed.
        assert!(analyze(&files, &cfg).is_empty());
    }

    #[test]
    fn violations_are_emitted_in_file_and_import_order() {
        let files = vec![SourceFile::new(
            "src/core/engine.py",
            "import src.ui.a\nimport src.ui.b\n",
        )];
        let violations = analyze(&files, &config());
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].import_name, "src.ui.a");
        assert_eq!(violations[1].import_name, "src.ui.b");
    }
}
