//! mdblog Core Library
//!
//! Core types, configuration, and error handling for the mdblog static site builder.

pub mod config;
pub mod document;
pub mod error;

pub use config::{Config, IdentifierPolicy, MarkdownConfig};
pub use document::{Document, Identifier, PostEntry, PostRegistry, TocEntry};
pub use error::{CoreError, Result};
