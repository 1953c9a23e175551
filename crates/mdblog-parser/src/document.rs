//! Document metadata extraction.
//!
//! Pulls the title, sort identifier and draft status out of a Markdown source
//! without rendering it.

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use mdblog_core::{Config, CoreError, Document, Identifier, IdentifierPolicy, Result};
use regex::Regex;

static RE_TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^# (.*)$").unwrap());

static RE_ID_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!-- ID: ([0-9]+) -->").unwrap());

/// Extracts [`Document`] metadata from source text.
#[derive(Debug, Clone)]
pub struct DocumentParser {
    policy: IdentifierPolicy,
    draft_prefix: String,
    output_dir: PathBuf,
}

impl DocumentParser {
    /// Create a parser writing pages below `output_dir`.
    #[must_use]
    pub fn new(
        policy: IdentifierPolicy,
        draft_prefix: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            policy,
            draft_prefix: draft_prefix.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Create a parser from the build section of the configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.build.identifier,
            config.build.draft_prefix.clone(),
            &config.build.output_dir,
        )
    }

    /// Parse the metadata of one source document.
    pub fn parse(&self, text: &str, source_path: &Path) -> Result<Document> {
        let title = extract_title(text).ok_or_else(|| CoreError::MissingTitle {
            path: source_path.to_path_buf(),
        })?;

        let identifier = match self.policy {
            IdentifierPolicy::Filename => Identifier::Name(file_stem(source_path)),
            IdentifierPolicy::Marker => {
                let raw = marker_digits(text).ok_or_else(|| CoreError::MissingIdentifier {
                    path: source_path.to_path_buf(),
                })?;
                let id = raw.parse().map_err(|_| CoreError::InvalidIdentifier {
                    path: source_path.to_path_buf(),
                    value: raw.to_string(),
                })?;
                Identifier::Numeric(id)
            }
        };

        let dest_path = Document::dest_path_for(source_path, &self.output_dir).ok_or_else(|| {
            CoreError::io(
                source_path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "source has no file name"),
            )
        })?;

        Ok(Document {
            identifier,
            title,
            source_path: source_path.to_path_buf(),
            dest_path,
            is_draft: self.is_draft(source_path),
        })
    }

    /// Whether the file name carries the draft prefix.
    pub fn is_draft(&self, source_path: &Path) -> bool {
        source_path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(&self.draft_prefix))
    }
}

/// Text after `# ` on the first level-1 heading line.
pub fn extract_title(text: &str) -> Option<String> {
    RE_TITLE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('\r').to_string())
}

/// Number inside the first `<!-- ID: n -->` marker.
///
/// `None` when there is no marker or its value does not fit in a `u64`.
pub fn extract_marker_id(text: &str) -> Option<u64> {
    marker_digits(text).and_then(|raw| raw.parse().ok())
}

/// ASCII digits of the first `<!-- ID: n -->` marker.
fn marker_digits(text: &str) -> Option<&str> {
    RE_ID_MARKER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
