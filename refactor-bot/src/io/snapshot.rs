//! File selection and repository snapshot assembly.
//!
//! The snapshot is best-effort context for the model, not an exact mirror:
//! an unreadable file is skipped and counted, never fatal. Selection and
//! truncation bounds keep the prompt within a predictable size.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

/// Extensions eligible for the snapshot (source and text formats).
const INCLUDE_EXTENSIONS: [&str; 22] = [
    "js", "ts", "tsx", "py", "rb", "go", "java", "cs", "cpp", "c", "h", "hpp", "rs", "swift",
    "php", "sh", "yml", "yaml", "json", "md", "html", "css",
];

/// Path fragments marking dependency, VCS-metadata, or vendored trees.
const EXCLUDE_SEGMENTS: [&str; 3] = ["node_modules/", ".git/", "vendor/"];

/// Bounds for snapshot assembly.
#[derive(Debug, Clone)]
pub struct SnapshotLimits {
    /// Per-file character cap.
    pub max_file_chars: usize,
    /// Maximum number of files included.
    pub max_files: usize,
}

impl Default for SnapshotLimits {
    fn default() -> Self {
        Self {
            max_file_chars: 4000,
            max_files: 150,
        }
    }
}

/// Assembled snapshot plus bookkeeping about what was left out.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Labeled excerpts, one per included file.
    pub text: String,
    pub included: usize,
    /// Files that could not be read and were silently omitted.
    pub skipped: usize,
}

/// True when `path` belongs in the snapshot: allow-listed extension and no
/// excluded segment anywhere in the path.
pub fn should_include_file(path: &str) -> bool {
    if EXCLUDE_SEGMENTS.iter().any(|seg| path.contains(seg)) {
        return false;
    }
    let Some(ext) = Path::new(path).extension().and_then(|e| e.to_str()) else {
        return false;
    };
    INCLUDE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

/// Filter the tracked-file listing, preserving its order.
pub fn select_files(tracked: &[String]) -> Vec<String> {
    tracked
        .iter()
        .filter(|path| should_include_file(path))
        .cloned()
        .collect()
}

/// Concatenate labeled, truncated excerpts of at most `limits.max_files`
/// files (by list order). Reads are lenient: invalid UTF-8 is replaced.
pub fn build_snapshot(root: &Path, files: &[String], limits: &SnapshotLimits) -> Snapshot {
    let mut parts = Vec::new();
    let mut skipped = 0usize;
    for rel in files.iter().take(limits.max_files) {
        match fs::read(root.join(rel)) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                let excerpt: String = text.chars().take(limits.max_file_chars).collect();
                parts.push(format!("--- {rel} ---\n{excerpt}"));
            }
            Err(err) => {
                warn!(path = %rel, err = %err, "skipping unreadable file");
                skipped += 1;
            }
        }
    }
    debug!(included = parts.len(), skipped, "snapshot assembled");
    Snapshot {
        text: parts.join("\n\n"),
        included: parts.len(),
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_allowlisted_extensions_case_insensitively() {
        assert!(should_include_file("src/main.rs"));
        assert!(should_include_file("docs/README.MD"));
        assert!(should_include_file("web/app.TSX"));
    }

    #[test]
    fn excludes_unknown_extensions_and_extensionless_paths() {
        assert!(!should_include_file("build/output.bin"));
        assert!(!should_include_file("Makefile"));
        assert!(!should_include_file("image.png"));
    }

    #[test]
    fn excludes_dependency_and_vendored_trees() {
        assert!(!should_include_file("node_modules/lodash/index.js"));
        assert!(!should_include_file(".git/hooks/pre-commit.sh"));
        assert!(!should_include_file("third_party/vendor/lib.go"));
    }

    #[test]
    fn selection_preserves_listing_order() {
        let tracked = vec![
            "b.rs".to_string(),
            "a.bin".to_string(),
            "a.rs".to_string(),
        ];
        assert_eq!(select_files(&tracked), vec!["b.rs", "a.rs"]);
    }

    #[test]
    fn snapshot_truncates_each_file_to_the_cap() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp.path().join("long.md"), "x".repeat(100)).expect("write");
        let limits = SnapshotLimits {
            max_file_chars: 10,
            max_files: 150,
        };
        let snap = build_snapshot(temp.path(), &["long.md".to_string()], &limits);
        assert_eq!(snap.text, format!("--- long.md ---\n{}", "x".repeat(10)));
    }

    #[test]
    fn snapshot_never_exceeds_max_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut files = Vec::new();
        for i in 0..5 {
            let name = format!("f{i}.md");
            std::fs::write(temp.path().join(&name), "content").expect("write");
            files.push(name);
        }
        let limits = SnapshotLimits {
            max_file_chars: 4000,
            max_files: 3,
        };
        let snap = build_snapshot(temp.path(), &files, &limits);
        assert_eq!(snap.included, 3);
        assert!(snap.text.contains("--- f2.md ---"));
        assert!(!snap.text.contains("--- f3.md ---"));
    }

    #[test]
    fn unreadable_files_are_counted_not_fatal() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp.path().join("ok.md"), "fine").expect("write");
        let files = vec!["missing.md".to_string(), "ok.md".to_string()];
        let snap = build_snapshot(temp.path(), &files, &SnapshotLimits::default());
        assert_eq!(snap.skipped, 1);
        assert_eq!(snap.included, 1);
        assert!(snap.text.contains("--- ok.md ---"));
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp.path().join("weird.md"), [0x66, 0xff, 0x6f]).expect("write");
        let snap = build_snapshot(
            temp.path(),
            &["weird.md".to_string()],
            &SnapshotLimits::default(),
        );
        assert_eq!(snap.skipped, 0);
        assert!(snap.text.contains('\u{fffd}'));
    }
}
