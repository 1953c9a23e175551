//! mdblog Parser Library
//!
//! Document metadata extraction and Markdown rendering.

pub mod document;
pub mod markdown;
pub mod syntax;

pub use document::DocumentParser;
pub use markdown::MarkdownParser;
pub use syntax::SyntaxHighlighter;

/// Converts a Markdown source into an HTML body fragment.
///
/// The build only depends on this trait, so any Markdown engine can be plugged in.
pub trait Renderer {
    /// Render the full source text of one document.
    fn render(&self, source: &str) -> String;
}

impl Renderer for MarkdownParser {
    fn render(&self, source: &str) -> String {
        MarkdownParser::render(self, source)
    }
}
