//! mdblog Generator Library
//!
//! Turns a directory of Markdown posts into HTML pages and an index.
//!
//! # Modules
//!
//! - [`template`] - literal `{{ placeholder }}` substitution
//! - [`page`] - per-document page emission
//! - [`index`] - index page generation
//! - [`collector`] - source discovery
//! - [`build`] - build orchestration

pub mod build;
pub mod collector;
pub mod index;
pub mod page;
pub mod template;

pub use build::{BuildError, BuildReport, Builder, DocumentFailure};
pub use collector::SourceCollector;
pub use index::IndexBuilder;
pub use template::{Template, TemplateContext};
