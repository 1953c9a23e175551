//! Build orchestration.
//!
//! Converts every source document, then writes the index once. A document
//! that fails is reported and skipped; the rest of the site is still built.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Instant,
};

use mdblog_core::{Config, CoreError, Document, PostRegistry};
use mdblog_parser::{DocumentParser, MarkdownParser, Renderer};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    collector::{CollectorError, SourceCollector},
    index::IndexBuilder,
    page,
    template::Template,
};

/// Build errors that stop the whole run.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Core error (template, index write).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Source discovery error.
    #[error("collector error: {0}")]
    Collector(#[from] CollectorError),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// A document that could not be converted.
#[derive(Debug)]
pub struct DocumentFailure {
    /// Source file.
    pub path: PathBuf,

    /// Why it failed.
    pub error: CoreError,
}

/// Outcome of a build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Pages written, drafts included.
    pub pages: usize,

    /// Draft pages written.
    pub drafts: usize,

    /// Posts listed in the index.
    pub published: usize,

    /// Documents that failed to convert.
    pub failures: Vec<DocumentFailure>,

    /// Index page, if one was written.
    pub index_path: Option<PathBuf>,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

impl BuildReport {
    /// True when every document converted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Site builder that orchestrates the build process.
pub struct Builder {
    config: Config,
    renderer: Box<dyn Renderer>,
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Builder {
    /// Create a builder using the bundled Markdown renderer.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let renderer = MarkdownParser::from_config(&config.markdown);
        Self::with_renderer(config, renderer)
    }

    /// Create a builder with a custom renderer.
    #[must_use]
    pub fn with_renderer(config: Config, renderer: impl Renderer + 'static) -> Self {
        Self {
            config,
            renderer: Box::new(renderer),
        }
    }

    /// Execute the full build process.
    pub fn build(&self) -> Result<BuildReport> {
        let start = Instant::now();
        let mut report = BuildReport::default();

        info!(
            source = %self.config.build.source_dir,
            output = %self.config.build.output_dir,
            "starting build"
        );

        let sources =
            SourceCollector::new(&self.config.build.source_dir, &self.config.build.pattern)?
                .collect()?;

        let parser = DocumentParser::from_config(&self.config);
        let mut registry = PostRegistry::new();

        for source in &sources {
            match self.convert(source, &parser, &mut registry) {
                Ok(document) => {
                    report.pages += 1;
                    if document.is_draft {
                        report.drafts += 1;
                    }
                }
                Err(error) => {
                    warn!(path = %source.display(), error = %error, "failed to convert document");
                    report.failures.push(DocumentFailure {
                        path: source.clone(),
                        error,
                    });
                }
            }
        }

        report.published = registry.len();

        if sources.is_empty() || report.pages > 0 {
            let template = Template::load(Path::new(&self.config.build.template))?;
            let index = IndexBuilder::from_config(&self.config);
            report.index_path = Some(index.build(&registry, &template)?);
        } else {
            warn!("every document failed, index not written");
        }

        report.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            pages = report.pages,
            drafts = report.drafts,
            published = report.published,
            failures = report.failures.len(),
            duration_ms = report.duration_ms,
            "build complete"
        );

        Ok(report)
    }

    /// Convert one source file into a page.
    fn convert(
        &self,
        source: &Path,
        parser: &DocumentParser,
        registry: &mut PostRegistry,
    ) -> std::result::Result<Document, CoreError> {
        let text = fs::read_to_string(source).map_err(|e| CoreError::io(source, e))?;
        let document = parser.parse(&text, source)?;
        let body = self.renderer.render(&text);
        let template = Template::load(Path::new(&self.config.build.template))?;

        page::emit(&document, &body, &template, registry)?;
        Ok(document)
    }
}
