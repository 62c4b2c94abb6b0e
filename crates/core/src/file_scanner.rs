//! File scanning utilities
//!
//! Finds build descriptors below a project root.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Descriptor file names recognized by [`scan_descriptors`]
pub const DESCRIPTOR_FILE_NAMES: &[&str] = &["build.gradle.kts"];

/// File scanner with configurable filters
pub struct FileScanner {
    root: PathBuf,
    file_names: Vec<String>,
    exclude_patterns: Vec<String>,
}

impl FileScanner {
    /// Create a new file scanner rooted at the given path
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            file_names: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }

    /// Only keep files with one of these exact names
    pub fn with_file_names(mut self, names: &[&str]) -> Self {
        self.file_names = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add patterns to exclude (glob patterns)
    pub fn exclude(mut self, patterns: &[&str]) -> Self {
        self.exclude_patterns = patterns.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Scan and return matching files, sorted by path
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(Error::new(
                crate::error::ErrorCode::InvalidPath,
                format!("Not a directory: {}", self.root.display()),
            ));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !entry.file_type().is_file() {
                continue;
            }

            if !self.file_names.is_empty() {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if !self.file_names.iter().any(|n| n == name) {
                    continue;
                }
            }

            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            if self.should_exclude(&relative.to_string_lossy()) {
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    fn should_exclude(&self, path_str: &str) -> bool {
        self.exclude_patterns.iter().any(|pattern| {
            glob::Pattern::new(pattern)
                .map(|pat| pat.matches(path_str))
                .unwrap_or(false)
        })
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.') && n != "." && n != "..")
        .unwrap_or(false)
}

/// Scan for Android build descriptors, skipping build outputs and plugin caches
pub fn scan_descriptors(root: &Path) -> Result<Vec<PathBuf>> {
    FileScanner::new(root)
        .with_file_names(DESCRIPTOR_FILE_NAMES)
        .exclude(&["**/build/**", "**/node_modules/**", "**/.pub-cache/**"])
        .scan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_scanner_new() {
        let scanner = FileScanner::new("/tmp");
        assert_eq!(scanner.root, PathBuf::from("/tmp"));
        assert!(scanner.file_names.is_empty());
    }

    #[test]
    fn test_scan_descriptors_skips_build_and_hidden() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for rel in [
            "android/app/build.gradle.kts",
            "android/build.gradle.kts",
            "android/app/build/intermediates/build.gradle.kts",
            ".dart_tool/build.gradle.kts",
            "android/app/src/main/AndroidManifest.xml",
        ] {
            let path = root.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, "").unwrap();
        }

        let found = scan_descriptors(root).unwrap();
        assert_eq!(
            found,
            vec![
                root.join("android/app/build.gradle.kts"),
                root.join("android/build.gradle.kts"),
            ]
        );
    }

    #[test]
    fn test_scan_missing_root() {
        assert!(scan_descriptors(Path::new("/nonexistent/root")).is_err());
    }
}
