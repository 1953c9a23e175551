//! Source discovery.
//!
//! Lists the Markdown files directly inside the source directory whose file
//! name matches the configured glob.

use std::path::PathBuf;

use globset::{Glob, GlobMatcher};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Source discovery errors.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The source directory does not exist.
    #[error("source directory not found: {0}")]
    MissingSourceDir(PathBuf),

    /// The file pattern is not a valid glob.
    #[error("invalid source pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// Directory traversal failed.
    #[error("failed to list sources: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result type for collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;

/// Finds source documents.
#[derive(Debug)]
pub struct SourceCollector {
    source_dir: PathBuf,
    matcher: GlobMatcher,
}

impl SourceCollector {
    /// Create a collector for `source_dir` matching file names against `pattern`.
    pub fn new(source_dir: impl Into<PathBuf>, pattern: &str) -> Result<Self> {
        let matcher = Glob::new(pattern)
            .map_err(|source| CollectorError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?
            .compile_matcher();

        Ok(Self {
            source_dir: source_dir.into(),
            matcher,
        })
    }

    /// Matching files, sorted by path.
    ///
    /// Symlinks are followed, so a link to a Markdown file is a source. A
    /// dangling link fails the walk.
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if !self.source_dir.is_dir() {
            return Err(CollectorError::MissingSourceDir(self.source_dir.clone()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.source_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if self.matcher.is_match(entry.file_name()) {
                files.push(entry.into_path());
            } else {
                debug!(path = %entry.path().display(), "skipping non-matching file");
            }
        }
        files.sort();

        info!(
            dir = %self.source_dir.display(),
            count = files.len(),
            "found source files"
        );
        Ok(files)
    }
}
