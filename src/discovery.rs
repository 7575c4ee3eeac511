//! Batch driver
//!
//! Finds source files under a directory and minifies each one independently across the
//! rayon pool. Files are only read; writing results is left to the caller.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::BatchError;
use crate::minify::minify_source;
use crate::options::MinifyOptions;

// ═══════════════════════════════════════════════════════════════════════════════
// DISCOVERY
// ═══════════════════════════════════════════════════════════════════════════════

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

/// Every `.py` file under `dir`, sorted, skipping hidden directories and files.
pub fn discover_sources(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().map(|ext| ext == "py").unwrap_or(false))
        .collect();
    files.sort();
    debug!(dir = %dir.display(), files = files.len(), "sources discovered");
    files
}

// ═══════════════════════════════════════════════════════════════════════════════
// BATCH MINIFICATION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub original_size: usize,
    pub minified_size: Option<usize>,
    pub result: Result<String, BatchError>,
}

fn minify_file(path: &Path, options: &MinifyOptions) -> FileOutcome {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(source) => {
            return FileOutcome {
                path: path.to_path_buf(),
                original_size: 0,
                minified_size: None,
                result: Err(BatchError::Read {
                    path: path.display().to_string(),
                    source,
                }),
            }
        }
    };

    let filename = path.to_string_lossy();
    let result = minify_source(&source, &filename, options).map_err(BatchError::from);
    if let Err(err) = &result {
        warn!(path = %path.display(), %err, "file left unminified");
    }
    FileOutcome {
        path: path.to_path_buf(),
        original_size: source.len(),
        minified_size: result.as_ref().ok().map(String::len),
        result,
    }
}

/// Minify every file in parallel. Outcomes keep the order of `paths`.
pub fn minify_files(paths: &[PathBuf], options: &MinifyOptions) -> Vec<FileOutcome> {
    paths
        .par_iter()
        .map(|path| minify_file(path, options))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedFile {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub files: usize,
    pub minified: usize,
    pub original_bytes: usize,
    pub minified_bytes: usize,
    pub failures: Vec<FailedFile>,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[FileOutcome]) -> Self {
        let mut summary = BatchSummary {
            files: outcomes.len(),
            ..BatchSummary::default()
        };
        for outcome in outcomes {
            match (&outcome.result, outcome.minified_size) {
                (Ok(_), Some(size)) => {
                    summary.minified += 1;
                    summary.original_bytes += outcome.original_size;
                    summary.minified_bytes += size;
                }
                (Err(err), _) => summary.failures.push(FailedFile {
                    path: outcome.path.display().to_string(),
                    message: err.to_string(),
                }),
                (Ok(_), None) => {}
            }
        }
        summary
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("minifier-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("pkg")).unwrap();
        fs::create_dir_all(dir.join(".hidden")).unwrap();
        dir
    }

    #[test]
    fn test_discovers_python_files_only() {
        let dir = scratch_dir("discover");
        fs::write(dir.join("b.py"), "x = 1\n").unwrap();
        fs::write(dir.join("pkg/a.py"), "y = 2\n").unwrap();
        fs::write(dir.join("notes.txt"), "text").unwrap();
        fs::write(dir.join(".hidden/c.py"), "z = 3\n").unwrap();

        let files = discover_sources(&dir);
        assert_eq!(files, vec![dir.join("b.py"), dir.join("pkg/a.py")]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_summary_counts_failures() {
        let dir = scratch_dir("batch");
        fs::write(dir.join("good.py"), "value = 1 + 1\n").unwrap();
        fs::write(dir.join("bad.py"), "def (:\n").unwrap();
        let missing = dir.join("missing.py");

        let mut paths = discover_sources(&dir);
        paths.push(missing);
        let outcomes = minify_files(&paths, &MinifyOptions::default());
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[1].result.as_deref().ok(), Some("value=2"));

        let summary = BatchSummary::from_outcomes(&outcomes);
        assert_eq!(summary.files, 3);
        assert_eq!(summary.minified, 1);
        assert_eq!(summary.original_bytes, 14);
        assert_eq!(summary.minified_bytes, 7);
        assert_eq!(summary.failures.len(), 2);

        let json = summary.to_json();
        assert!(json.contains("\"minifiedBytes\": 7"));
        fs::remove_dir_all(&dir).unwrap();
    }
}
