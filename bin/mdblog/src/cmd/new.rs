//! New command - scaffold a Markdown post

use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::eyre::{Result, WrapErr, bail};
use mdblog_core::{Config, IdentifierPolicy};
use mdblog_generator::SourceCollector;
use mdblog_parser::document::extract_marker_id;

/// Run the new command.
///
/// Creates `<source_dir>/<slug>.md` with a level-1 heading. Under the marker
/// identifier policy an `<!-- ID: n -->` line is added, numbered one past the
/// highest existing id unless `id` is given.
pub fn run(config_path: &Path, title: &str, id: Option<u64>, draft: bool) -> Result<PathBuf> {
    tracing::info!(?config_path, title, ?id, draft, "Creating new post");

    let config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
    let source_dir = Path::new(&config.build.source_dir);

    let slug = slugify(title);
    if slug.is_empty() {
        bail!("Cannot derive a file name from title '{title}'");
    }
    let prefix = if draft {
        config.build.draft_prefix.as_str()
    } else {
        ""
    };
    let file_path = source_dir.join(format!("{prefix}{slug}.md"));
    if file_path.exists() {
        bail!("{} already exists", file_path.display());
    }

    let id = match (id, config.build.identifier) {
        (Some(id), _) => Some(id),
        (None, IdentifierPolicy::Marker) => Some(next_id(source_dir, &config.build.pattern)?),
        (None, IdentifierPolicy::Filename) => None,
    };

    fs::create_dir_all(source_dir).wrap_err("Failed to create source directory")?;
    fs::write(&file_path, post_template(title, id)).wrap_err("Failed to write file")?;

    tracing::info!(?file_path, "Created new post");
    println!("Created: {}", file_path.display());

    Ok(file_path)
}

/// One past the highest marker id among existing sources.
fn next_id(source_dir: &Path, pattern: &str) -> Result<u64> {
    if !source_dir.is_dir() {
        return Ok(1);
    }

    let mut highest = 0;
    for path in SourceCollector::new(source_dir, pattern)?.collect()? {
        let text = fs::read_to_string(&path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        if let Some(id) = extract_marker_id(&text) {
            highest = highest.max(id);
        }
    }
    Ok(highest + 1)
}

fn post_template(title: &str, id: Option<u64>) -> String {
    let marker = id
        .map(|id| format!("<!-- ID: {id} -->\n"))
        .unwrap_or_default();
    format!("{marker}# {title}\n\nWrite your post here.\n")
}

fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn write_config(dir: &Path, identifier: &str) -> PathBuf {
        let path = dir.join("mdblog.toml");
        let source = dir.join("md");
        fs::write(
            &path,
            format!(
                "[build]\nsource_dir = {:?}\nidentifier = \"{identifier}\"\n",
                source.to_string_lossy()
            ),
        )
        .unwrap();
        path
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust  2024 "), "rust-2024");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_post_template() {
        assert_eq!(
            post_template("Hi", Some(3)),
            "<!-- ID: 3 -->\n# Hi\n\nWrite your post here.\n"
        );
        assert_eq!(post_template("Hi", None), "# Hi\n\nWrite your post here.\n");
    }

    #[test]
    fn test_new_post_with_filename_policy() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path(), "filename");

        let path = run(&config, "My First Post", None, false).unwrap();

        assert_eq!(path, dir.path().join("md/my-first-post.md"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# My First Post\n\nWrite your post here.\n"
        );
    }

    #[test]
    fn test_new_draft_uses_prefix() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path(), "filename");

        let path = run(&config, "Idea", None, true).unwrap();
        assert_eq!(path, dir.path().join("md/_idea.md"));
    }

    #[test]
    fn test_new_post_picks_next_marker_id() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path(), "marker");
        fs::create_dir(dir.path().join("md")).unwrap();
        fs::write(dir.path().join("md/a.md"), "<!-- ID: 4 -->\n# A\n").unwrap();
        fs::write(dir.path().join("md/b.md"), "<!-- ID: 9 -->\n# B\n").unwrap();

        let path = run(&config, "C", None, false).unwrap();

        assert!(fs::read_to_string(path).unwrap().starts_with("<!-- ID: 10 -->\n# C\n"));
    }

    #[test]
    fn test_new_post_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path(), "filename");

        run(&config, "Same", None, false).unwrap();
        assert!(run(&config, "Same", None, false).is_err());
    }
}
