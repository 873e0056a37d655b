// SPDX-License-Identifier: PMPL-1.0-or-later
//! File and directory scanning for static analysis.
//!
//! Walks directory trees, picks out HTML files, and runs the static
//! analyzer on each one.

use crate::analyzer::{parse_error, StaticAnalyzer};
use crate::issue::Issue;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// File extensions to scan
const SCANNABLE_EXTENSIONS: &[&str] = &["html", "htm", "xhtml"];

/// Directories to skip
const SKIP_DIRS: &[&str] = &[
    "node_modules", "target", "dist", "vendor", "coverage", "outputs",
];

/// Issues found in one file
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub path: PathBuf,
    pub issues: Vec<Issue>,
}

/// Analyze a single file. Read failures become a single `PARSE_ERROR` issue.
pub fn scan_file(analyzer: &StaticAnalyzer, path: &Path) -> FileAnalysis {
    let issues = match std::fs::read(path) {
        Ok(bytes) => analyzer.analyze_bytes(&bytes),
        Err(e) => {
            warn!("Cannot read {}: {}", path.display(), e);
            vec![parse_error(&e.to_string())]
        }
    };

    FileAnalysis {
        path: path.to_path_buf(),
        issues,
    }
}

/// Analyze every HTML file under a directory, in path order
pub fn scan_directory(analyzer: &StaticAnalyzer, dir: &Path) -> Vec<FileAnalysis> {
    let mut results = Vec::new();

    info!("Scanning directory: {}", dir.display());

    for entry in WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_str().unwrap_or("");
            if e.depth() > 0 && e.file_type().is_dir() {
                return !SKIP_DIRS.contains(&name) && !name.starts_with('.');
            }
            true
        })
    {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        if !entry.file_type().is_file() || !is_scannable(entry.path()) {
            continue;
        }

        results.push(scan_file(analyzer, entry.path()));
    }

    info!(
        "Scanned {} files, found {} issues",
        results.len(),
        results.iter().map(|r| r.issues.len()).sum::<usize>()
    );

    results
}

/// Analyze a path that may be a file or a directory
pub fn scan_path(analyzer: &StaticAnalyzer, path: &Path) -> Vec<FileAnalysis> {
    if path.is_dir() {
        scan_directory(analyzer, path)
    } else {
        vec![scan_file(analyzer, path)]
    }
}

fn is_scannable(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| SCANNABLE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::PARSE_ERROR;
    use tempfile::TempDir;

    #[test]
    fn test_scan_nonexistent_dir() {
        let results = scan_directory(&StaticAnalyzer::new(), Path::new("/nonexistent/path"));
        assert!(results.is_empty());
    }

    #[test]
    fn test_missing_file_is_parse_error() {
        let result = scan_file(&StaticAnalyzer::new(), Path::new("/nonexistent/page.html"));
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].rule_id, PARSE_ERROR);
    }

    #[test]
    fn test_directory_walk_filters_and_skips() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::write(root.join("a.html"), "<img src=x>").unwrap();
        std::fs::write(root.join("notes.txt"), "<img src=x>").unwrap();
        std::fs::create_dir_all(root.join("node_modules")).unwrap();
        std::fs::write(root.join("node_modules").join("b.html"), "<img src=x>").unwrap();
        std::fs::create_dir_all(root.join("docs")).unwrap();
        std::fs::write(root.join("docs").join("c.HTM"), "<main><h1>x</h1></main>").unwrap();

        let results = scan_directory(&StaticAnalyzer::new(), root);
        let names: Vec<String> = results
            .iter()
            .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.html", "c.HTM"]);
        assert!(results[1].issues.is_empty());
    }
}
