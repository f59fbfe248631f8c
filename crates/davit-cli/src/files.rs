//! File discovery: glob patterns to a concrete, deduplicated file list.

use std::collections::HashSet;

use davit_release::FileSet;
use tracing::warn;

/// Expands each pattern and collects the matching files, first-seen order,
/// deduplicated across patterns. Patterns matching zero files (including
/// malformed patterns) land in `unmatched`.
pub fn discover(patterns: &[String]) -> FileSet {
    let mut files = Vec::new();
    let mut seen = HashSet::new();
    let mut unmatched = Vec::new();

    for pattern in patterns {
        let mut matched_any = false;
        match glob::glob(pattern) {
            Ok(paths) => {
                for path in paths.flatten() {
                    if !path.is_file() {
                        continue;
                    }
                    matched_any = true;
                    if seen.insert(path.clone()) {
                        files.push(path);
                    }
                }
            }
            Err(error) => {
                warn!(pattern, %error, "invalid file pattern");
            }
        }
        if !matched_any {
            unmatched.push(pattern.clone());
        }
    }

    FileSet { files, unmatched }
}
