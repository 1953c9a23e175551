//! Build command - generates the pages and the index

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr, bail};
use mdblog_core::Config;
use mdblog_generator::{BuildReport, Builder};

/// Command-line overrides for configured paths.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub index: Option<PathBuf>,
    pub template: Option<PathBuf>,
}

impl Overrides {
    fn apply(&self, config: &mut Config) {
        if let Some(ref source) = self.source {
            config.build.source_dir = source.to_string_lossy().into_owned();
        }
        if let Some(ref output) = self.output {
            config.build.output_dir = output.to_string_lossy().into_owned();
        }
        if let Some(ref index) = self.index {
            config.build.index_path = index.to_string_lossy().into_owned();
        }
        if let Some(ref template) = self.template {
            config.build.template = template.to_string_lossy().into_owned();
        }
    }
}

/// Run the build command.
///
/// Converts every source, writes the index, and fails if any document failed.
pub fn run(config_path: &Path, overrides: &Overrides) -> Result<BuildReport> {
    tracing::info!(?config_path, ?overrides, "Starting build");

    let mut config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
    overrides.apply(&mut config);
    tracing::debug!(?config, "Loaded configuration");

    let report = Builder::new(config).build().wrap_err("Build failed")?;

    println!();
    println!("  Pages:      {}", report.pages);
    println!("  Drafts:     {}", report.drafts);
    println!("  Published:  {}", report.published);
    match report.index_path {
        Some(ref index) => println!("  Index:      {}", index.display()),
        None => println!("  Index:      (not written)"),
    }
    println!("  Duration:   {}ms", report.duration_ms);
    println!();

    if !report.is_success() {
        println!("  Failed documents:");
        for failure in &report.failures {
            println!("  ✗ {}: {}", failure.path.display(), failure.error);
        }
        println!();
        bail!("{} document(s) failed to convert", report.failures.len());
    }

    tracing::info!(pages = report.pages, "Build completed successfully");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn overrides(root: &Path) -> Overrides {
        Overrides {
            source: Some(root.join("md")),
            output: Some(root.join("html")),
            index: Some(root.join("index.html")),
            template: Some(root.join("template.html")),
        }
    }

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("md")).unwrap();
        fs::write(
            dir.path().join("template.html"),
            "<title>{{ title }}</title>{{ title_matter }}{{ content }}",
        )
        .unwrap();
        fs::write(
            dir.path().join("mdblog.toml"),
            "[site]\ntitle = \"Journal\"\nbanner = \"<h1>Journal</h1>\"\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_run_builds_site() {
        let dir = setup();
        fs::write(dir.path().join("md/first.md"), "# First\n\nHi.").unwrap();

        let report = run(&dir.path().join("mdblog.toml"), &overrides(dir.path())).unwrap();

        assert_eq!(report.pages, 1);
        let index = fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(index.starts_with("<title>Journal</title><h1>Journal</h1>"));
        assert!(index.contains(">First<"));
    }

    #[test]
    fn test_run_fails_when_a_document_fails() {
        let dir = setup();
        fs::write(dir.path().join("md/good.md"), "# Good").unwrap();
        fs::write(dir.path().join("md/bad.md"), "untitled").unwrap();

        let result = run(&dir.path().join("mdblog.toml"), &overrides(dir.path()));

        assert!(result.is_err());
        assert!(dir.path().join("index.html").exists());
        assert!(dir.path().join("html/good.html").exists());
    }

    #[test]
    fn test_run_without_config_file_uses_defaults() {
        let dir = setup();
        fs::write(dir.path().join("md/post.md"), "# Post").unwrap();

        let report = run(&dir.path().join("missing.toml"), &overrides(dir.path())).unwrap();

        assert_eq!(report.published, 1);
        let index = fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(index.starts_with("<title>Blog</title>"));
    }
}
