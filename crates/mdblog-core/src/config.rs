//! Site configuration management.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Main configuration structure for mdblog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    #[serde(default)]
    pub site: SiteConfig,

    /// Build settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Markdown renderer settings.
    #[serde(default)]
    pub markdown: MarkdownConfig,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Title of the index page.
    #[serde(default = "default_site_title")]
    pub title: String,

    /// Optional HTML block placed in `title_matter` on the index page.
    #[serde(default)]
    pub banner: Option<String>,
}

/// How a document's sort identifier is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierPolicy {
    /// Use the source file stem, compared lexicographically.
    #[default]
    Filename,
    /// Use the number in a `<!-- ID: n -->` comment, compared numerically.
    Marker,
}

/// Build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Directory holding the Markdown sources.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Glob matched against source file names.
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Directory receiving one HTML page per source.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Path of the generated index page.
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Path of the shared HTML template.
    #[serde(default = "default_template")]
    pub template: String,

    /// Identifier extraction policy.
    #[serde(default)]
    pub identifier: IdentifierPolicy,

    /// File name prefix that marks a document as a draft.
    #[serde(default = "default_draft_prefix")]
    pub draft_prefix: String,
}

/// Markdown renderer configuration.
///
/// Stored as given; the parser crate decides what each extension means.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Ordered list of extension names.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Per-extension options keyed by extension name.
    #[serde(default = "default_extension_configs")]
    pub extension_configs: BTreeMap<String, toml::Table>,
}

fn default_site_title() -> String {
    "Blog".to_string()
}

fn default_source_dir() -> String {
    "md".to_string()
}

fn default_pattern() -> String {
    "*.md".to_string()
}

fn default_output_dir() -> String {
    "html".to_string()
}

fn default_index_path() -> String {
    "index.html".to_string()
}

fn default_template() -> String {
    "template.html".to_string()
}

fn default_draft_prefix() -> String {
    "_".to_string()
}

fn default_extensions() -> Vec<String> {
    vec![
        "fenced_code".to_string(),
        "codehilite".to_string(),
        "toc".to_string(),
    ]
}

fn default_extension_configs() -> BTreeMap<String, toml::Table> {
    let mut codehilite = toml::Table::new();
    codehilite.insert("linenums".to_string(), toml::Value::Boolean(true));

    let mut toc = toml::Table::new();
    toc.insert("permalink".to_string(), toml::Value::Boolean(true));

    BTreeMap::from([
        ("codehilite".to_string(), codehilite),
        ("toc".to_string(), toc),
    ])
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            banner: None,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            pattern: default_pattern(),
            output_dir: default_output_dir(),
            index_path: default_index_path(),
            template: default_template(),
            identifier: IdentifierPolicy::default(),
            draft_prefix: default_draft_prefix(),
        }
    }
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            extension_configs: default_extension_configs(),
        }
    }
}

impl MarkdownConfig {
    /// Whether the named extension is enabled.
    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|e| e == name)
    }

    /// Look up a boolean option for an extension, falling back to `default`.
    pub fn flag(&self, extension: &str, key: &str, default: bool) -> bool {
        self.extension_configs
            .get(extension)
            .and_then(|table| table.get(key))
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Look up a string option for an extension.
    pub fn option_str(&self, extension: &str, key: &str) -> Option<&str> {
        self.extension_configs
            .get(extension)
            .and_then(|table| table.get(key))
            .and_then(toml::Value::as_str)
    }
}

impl Config {
    /// Load configuration from a TOML file layered with `MDBLOG__`-prefixed
    /// environment variables, e.g. `MDBLOG__BUILD__OUTPUT_DIR`.
    ///
    /// A missing file is not an error; every field has a default.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no configuration file, using defaults");
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("MDBLOG").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if self.build.pattern.is_empty() {
            return Err(CoreError::config("build.pattern cannot be empty"));
        }

        if self.build.draft_prefix.is_empty() {
            return Err(CoreError::config("build.draft_prefix cannot be empty"));
        }

        if Path::new(&self.build.index_path).file_name().is_none() {
            return Err(CoreError::config("build.index_path must name a file"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, MutexGuard};

    use super::*;

    // Environment variables are process-wide; loads must not overlap with a test that sets them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn load_str(content: &str) -> Result<Config> {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("mdblog.toml");
        std::fs::write(&config_path, content).expect("write");
        Config::load_with_env(&config_path)
    }

    #[test]
    fn test_load_config() {
        let _guard = env_lock();
        let config = load_str(
            r#"
[site]
title = "Notes"
banner = "<h1>All Notes</h1>"

[build]
source_dir = "posts"
pattern = "*.markdown"
output_dir = "out"
index_path = "out/index.html"
identifier = "marker"
draft_prefix = "draft-"

[markdown]
extensions = ["fenced_code", "admonition"]

[markdown.extension_configs.codehilite]
linenums = false
theme = "InspiredGitHub"
"#,
        )
        .expect("load config");

        assert_eq!(config.site.title, "Notes");
        assert_eq!(config.site.banner.as_deref(), Some("<h1>All Notes</h1>"));
        assert_eq!(config.build.source_dir, "posts");
        assert_eq!(config.build.pattern, "*.markdown");
        assert_eq!(config.build.output_dir, "out");
        assert_eq!(config.build.index_path, "out/index.html");
        assert_eq!(config.build.identifier, IdentifierPolicy::Marker);
        assert_eq!(config.build.draft_prefix, "draft-");
        assert_eq!(config.markdown.extensions, vec!["fenced_code", "admonition"]);
        assert!(!config.markdown.flag("codehilite", "linenums", true));
        assert_eq!(
            config.markdown.option_str("codehilite", "theme"),
            Some("InspiredGitHub")
        );
    }

    #[test]
    fn test_config_defaults() {
        let _guard = env_lock();
        let config = load_str("").expect("load config");

        assert_eq!(config.site.title, "Blog");
        assert!(config.site.banner.is_none());
        assert_eq!(config.build.source_dir, "md");
        assert_eq!(config.build.pattern, "*.md");
        assert_eq!(config.build.output_dir, "html");
        assert_eq!(config.build.index_path, "index.html");
        assert_eq!(config.build.template, "template.html");
        assert_eq!(config.build.identifier, IdentifierPolicy::Filename);
        assert_eq!(config.build.draft_prefix, "_");
        assert_eq!(
            config.markdown.extensions,
            vec!["fenced_code", "codehilite", "toc"]
        );
        assert!(config.markdown.flag("codehilite", "linenums", false));
        assert!(config.markdown.flag("toc", "permalink", false));
    }

    #[test]
    fn test_has_extension() {
        let markdown = MarkdownConfig::default();
        assert!(markdown.has_extension("toc"));
        assert!(!markdown.has_extension("admonition"));
    }

    #[test]
    fn test_config_validation_empty_title() {
        let _guard = env_lock();
        let result = load_str("[site]\ntitle = \"\"\n");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("title cannot be empty")
        );
    }

    #[test]
    fn test_config_invalid_identifier_policy() {
        let _guard = env_lock();
        let result = load_str("[build]\nidentifier = \"random\"\n");
        assert!(matches!(result, Err(CoreError::ConfigCrate(_))));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let _guard = env_lock();
        let config = Config::load_with_env(Path::new("/nonexistent/mdblog.toml")).expect("defaults");
        assert_eq!(config.build.output_dir, "html");
        assert_eq!(config.site.title, "Blog");
    }

    #[test]
    fn test_env_overrides_file_value() {
        let _guard = env_lock();
        // SAFETY: ENV_LOCK serializes every test in this module that touches the environment.
        unsafe { std::env::set_var("MDBLOG__BUILD__OUTPUT_DIR", "dist") };

        let result = load_str("[site]\ntitle = \"Journal\"\n\n[build]\noutput_dir = \"out\"\n");

        // SAFETY: as above.
        unsafe { std::env::remove_var("MDBLOG__BUILD__OUTPUT_DIR") };

        let config = result.expect("load config");
        assert_eq!(config.site.title, "Journal");
        assert_eq!(config.build.output_dir, "dist");
        assert_eq!(config.build.source_dir, "md");
        assert!(config.markdown.flag("codehilite", "linenums", false));
    }
}
