//! Document and post registry types.

use std::{
    cmp::Ordering,
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// Sort key of a document.
///
/// All documents of one build share a variant, chosen by the identifier policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    /// Number read from a `<!-- ID: n -->` marker.
    Numeric(u64),
    /// Source file stem.
    Name(String),
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => a.cmp(b),
            (Self::Name(a), Self::Name(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Self::Numeric(_), Self::Name(_)) => Ordering::Less,
            (Self::Name(_), Self::Numeric(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Name(s) => f.write_str(s),
        }
    }
}

/// One parsed source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Sort key.
    pub identifier: Identifier,

    /// Text of the first level-1 heading.
    pub title: String,

    /// Markdown source file.
    pub source_path: PathBuf,

    /// HTML output file, `<output_dir>/<stem>.html`.
    pub dest_path: PathBuf,

    /// Drafts get a page but stay out of the index.
    pub is_draft: bool,
}

impl Document {
    /// Output path for a source file: `<output_dir>/<source_stem>.html`.
    ///
    /// Returns `None` when the source path has no file stem.
    pub fn dest_path_for(source_path: &Path, output_dir: &Path) -> Option<PathBuf> {
        let stem = source_path.file_stem()?;
        let mut file_name = stem.to_os_string();
        file_name.push(".html");
        Some(output_dir.join(file_name))
    }

    /// Registry entry for this document.
    pub fn to_entry(&self) -> PostEntry {
        PostEntry {
            identifier: self.identifier.clone(),
            title: self.title.clone(),
            dest_path: self.dest_path.clone(),
        }
    }
}

/// Metadata kept for a published document until the index is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostEntry {
    pub identifier: Identifier,
    pub title: String,
    pub dest_path: PathBuf,
}

/// Ordered collection of published posts, in processing order.
#[derive(Debug, Clone, Default)]
pub struct PostRegistry {
    entries: Vec<PostEntry>,
}

impl PostRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, entry: PostEntry) {
        self.entries.push(entry);
    }

    /// Entries in processing order.
    #[must_use]
    pub fn entries(&self) -> &[PostEntry] {
        &self.entries
    }

    /// Number of registered posts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no post has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by identifier, highest first.
    ///
    /// The sort is stable: equal identifiers keep processing order.
    #[must_use]
    pub fn sorted_desc(&self) -> Vec<&PostEntry> {
        let mut sorted: Vec<_> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.identifier.cmp(&a.identifier));
        sorted
    }
}

/// Table of contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,

    /// Heading text.
    pub text: String,

    /// Anchor ID for linking.
    pub id: String,
}
