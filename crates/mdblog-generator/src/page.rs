//! Per-document page emission.

use std::{
    fs,
    path::{Path, PathBuf},
};

use mdblog_core::{CoreError, Document, PostRegistry, Result};
use tracing::debug;

use crate::template::{Template, TemplateContext};

/// Render one document into the template and write it to `document.dest_path`.
///
/// Published documents are appended to `registry` once their page is on disk;
/// drafts are written but never registered.
pub fn emit(
    document: &Document,
    rendered_body: &str,
    template: &Template,
    registry: &mut PostRegistry,
) -> Result<PathBuf> {
    let context = TemplateContext::new()
        .with_var("content", rendered_body)
        .with_var("title", document.title.as_str())
        .with_var("title_matter", "");

    let html = template.render(&context);
    write_page(&document.dest_path, &html)?;
    debug!(
        path = %document.dest_path.display(),
        template = %template.path().display(),
        draft = document.is_draft,
        "wrote page"
    );

    if !document.is_draft {
        registry.push(document.to_entry());
    }

    Ok(document.dest_path.clone())
}

/// Write `html` to `path`, creating missing parent directories.
pub(crate) fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
    }
    fs::write(path, html).map_err(|e| CoreError::io(path, e))
}
