//! Winnowing-based duplication detection.
//!
//! Each file is normalized to a token stream, hashed into overlapping
//! k-grams, and reduced to a fingerprint list by sliding-window
//! minimum selection. A file's duplication ratio is the fraction of its
//! own distinct fingerprints that reappear anywhere else in the project,
//! counted with multiplicity on the other side: the left-hand file
//! contributes a *set* of fingerprints, every other file's occurrences of
//! those fingerprints are counted as a *multiset* against it.

use std::collections::{HashMap, HashSet};

use md5::{Digest, Md5};

use crate::core::ast_service::{self, NormalizeOptions};
use crate::core::config::DuplicationConfig;
use crate::core::model::SourceFile;

/// Per-file duplication outcome.
#[derive(Debug, Clone)]
pub struct DuplicationOutcome {
    pub fingerprints: Vec<u32>,
    pub ratio: f64,
    pub parser_success: bool,
}

/// Analyze every file's duplication ratio against every other file in the
/// same batch.
pub fn analyze(files: &[SourceFile], config: &DuplicationConfig) -> HashMap<String, DuplicationOutcome> {
    let opts = NormalizeOptions {
        strip_literals: config.normalize.strip_literals,
        strip_comments: config.normalize.strip_comments,
        identifier_placeholder: &config.normalize.identifier_placeholder,
    };

    let mut fingerprints: Vec<(String, Vec<u32>, bool)> = Vec::with_capacity(files.len());
    for file in files {
        let (tokens, success) = ast_service::normalize_for_dup(&file.source, &opts);
        let fprints = fingerprint(&tokens, config.k.max(1), config.w.max(1));
        fingerprints.push((file.path.clone(), fprints, success));
    }

    let mut out = HashMap::with_capacity(fingerprints.len());
    for (path, fprints, success) in &fingerprints {
        let ratio = if fprints.is_empty() {
            0.0
        } else {
            let set_self: HashSet<u32> = fprints.iter().copied().collect();
            let mut overlaps = 0usize;
            for (other_path, other_fprints, _) in &fingerprints {
                if other_path == path {
                    continue;
                }
                overlaps += other_fprints.iter().filter(|h| set_self.contains(h)).count();
            }
            (overlaps as f64 / set_self.len().max(1) as f64).min(1.0)
        };
        out.insert(
            path.clone(),
            DuplicationOutcome {
                fingerprints: fprints.clone(),
                ratio,
                parser_success: *success,
            },
        );
    }
    out
}

fn stable_hash(text: &str) -> u32 {
    let digest = Md5::digest(text.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

fn fingerprint(tokens: &[String], k: usize, w: usize) -> Vec<u32> {
    if tokens.len() < k {
        return if tokens.is_empty() {
            Vec::new()
        } else {
            vec![stable_hash(&tokens.join(" "))]
        };
    }

    let mut hashes = Vec::new();
    let mut window: Vec<(u32, usize)> = Vec::new();
    let mut current: Option<(u32, usize)> = None;

    for i in 0..=(tokens.len() - k) {
        let kgram = &tokens[i..i + k];
        let hash_val = stable_hash(&kgram.join(" "));
        window.push((hash_val, i));
        if window.len() > w {
            window.remove(0);
        }
        let min = *window.iter().min_by_key(|&&(h, p)| (h, p)).unwrap();
        if current != Some(min) {
            current = Some(min);
            hashes.push(min.0);
        }
    }
    hashes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{DuplicationConfig, NormalizeConfig};

    fn config() -> DuplicationConfig {
        DuplicationConfig {
            k: 5,
            w: 2,
            normalize: NormalizeConfig {
                strip_literals: true,
                strip_comments: true,
                identifier_placeholder: "ID".to_string(),
            },
        }
    }

    #[test]
    fn identical_files_share_full_ratio() {
        let source = "def f(a, b):\n    x = a + b\n    y = a - b\n    return x * y\n";
        let files = vec![
            SourceFile::new("a.py", source),
            SourceFile::new("b.py", source),
        ];
        let out = analyze(&files, &config());
        assert!(out["a.py"].ratio > 0.9);
        assert!(out["b.py"].ratio > 0.9);
    }

    #[test]
    fn unique_file_has_zero_overlap() {
        let files = vec![
            SourceFile::new("a.py", "def f(a, b):\n    return a + b\n"),
            SourceFile::new("b.py", "class Widget:\n    def render(self):\n        print('hi')\n"),
        ];
        let out = analyze(&files, &config());
        assert_eq!(out["a.py"].ratio, 0.0);
        assert_eq!(out["b.py"].ratio, 0.0);
    }

    #[test]
    fn empty_source_has_no_fingerprints() {
        let files = vec![SourceFile::new("a.py", "")];
        let out = analyze(&files, &config());
        assert!(out["a.py"].fingerprints.is_empty());
        assert_eq!(out["a.py"].ratio, 0.0);
    }

    #[test]
    fn renaming_identifiers_does_not_change_fingerprints() {
        let files = vec![
            SourceFile::new("a.py", "def f(a, b):\n    x = a + b\n    y = a - b\n    return x * y\n"),
        ];
        let renamed = vec![
            SourceFile::new("a.py", "def g(p, q):\n    m = p + q\n    n = p - q\n    return m * n\n"),
        ];
        let out1 = analyze(&files, &config());
        let out2 = analyze(&renamed, &config());
        assert_eq!(out1["a.py"].fingerprints, out2["a.py"].fingerprints);
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let tokens: Vec<String> = "a b c d e f g h".split(' ').map(str::to_string).collect();
        assert_eq!(fingerprint(&tokens, 3, 2), fingerprint(&tokens, 3, 2));
    }
}
