//! Index page generation.
//!
//! Lists every published post, newest identifier first.

use std::path::{Path, PathBuf};

use mdblog_core::{Config, PostEntry, PostRegistry, Result};
use tracing::info;

use crate::{
    page::write_page,
    template::{Template, TemplateContext},
};

/// Builds the table-of-contents page from the post registry.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    site_title: String,
    banner: Option<String>,
    index_path: PathBuf,
}

impl IndexBuilder {
    /// Create an index builder writing to `index_path`.
    #[must_use]
    pub fn new(
        site_title: impl Into<String>,
        banner: Option<String>,
        index_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            site_title: site_title.into(),
            banner,
            index_path: index_path.into(),
        }
    }

    /// Create an index builder from the site and build configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.site.title.clone(),
            config.site.banner.clone(),
            &config.build.index_path,
        )
    }

    /// The `<ul>` list of posts, sorted by identifier, highest first.
    #[must_use]
    pub fn render_list(&self, registry: &PostRegistry) -> String {
        let mut html = String::from("<ul>\n");
        for entry in registry.sorted_desc() {
            html.push_str(&self.list_item(entry));
            html.push('\n');
        }
        html.push_str("</ul>");
        html
    }

    /// The complete index page.
    #[must_use]
    pub fn render(&self, registry: &PostRegistry, template: &Template) -> String {
        let context = TemplateContext::new()
            .with_var("content", self.render_list(registry))
            .with_var("title", self.site_title.as_str())
            .with_var("title_matter", self.banner.as_deref().unwrap_or_default());
        template.render(&context)
    }

    /// Render and write the index page.
    pub fn build(&self, registry: &PostRegistry, template: &Template) -> Result<PathBuf> {
        let html = self.render(registry, template);
        write_page(&self.index_path, &html)?;

        info!(
            path = %self.index_path.display(),
            template = %template.path().display(),
            posts = registry.len(),
            "wrote index"
        );
        Ok(self.index_path.clone())
    }

    fn list_item(&self, entry: &PostEntry) -> String {
        format!(
            "<li><a href='{}'>{}</a></li>",
            self.href(&entry.dest_path),
            entry.title
        )
    }

    /// Link to a page, relative to the directory holding the index.
    fn href(&self, dest_path: &Path) -> String {
        let base = self.index_path.parent().unwrap_or(Path::new(""));
        let relative = dest_path.strip_prefix(base).unwrap_or(dest_path);
        relative.to_string_lossy().replace('\\', "/")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use mdblog_core::Identifier;
    use tempfile::TempDir;

    use super::*;

    fn entry(identifier: Identifier, title: &str, dest: &str) -> PostEntry {
        PostEntry {
            identifier,
            title: title.to_string(),
            dest_path: PathBuf::from(dest),
        }
    }

    fn builder() -> IndexBuilder {
        IndexBuilder::new("Blog", Some("<h1>Posts</h1>".to_string()), "index.html")
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(builder().render_list(&PostRegistry::new()), "<ul>\n</ul>");
    }

    #[test]
    fn test_list_numeric_order() {
        let mut registry = PostRegistry::new();
        registry.push(entry(Identifier::Numeric(3), "Three", "html/c.html"));
        registry.push(entry(Identifier::Numeric(1), "One", "html/a.html"));
        registry.push(entry(Identifier::Numeric(2), "Two", "html/b.html"));

        assert_eq!(
            builder().render_list(&registry),
            "<ul>\n\
             <li><a href='html/c.html'>Three</a></li>\n\
             <li><a href='html/b.html'>Two</a></li>\n\
             <li><a href='html/a.html'>One</a></li>\n\
             </ul>"
        );
    }

    #[test]
    fn test_list_lexicographic_order() {
        let mut registry = PostRegistry::new();
        registry.push(entry(Identifier::Name("post-10".into()), "Ten", "html/post-10.html"));
        registry.push(entry(Identifier::Name("post-9".into()), "Nine", "html/post-9.html"));

        let list = builder().render_list(&registry);
        let nine = list.find("Nine").unwrap();
        let ten = list.find("Ten").unwrap();
        assert!(nine < ten, "'post-9' sorts above 'post-10' lexicographically");
    }

    #[test]
    fn test_order_is_reproducible() {
        let mut registry = PostRegistry::new();
        registry.push(entry(Identifier::Numeric(5), "A", "html/a.html"));
        registry.push(entry(Identifier::Numeric(5), "B", "html/b.html"));
        registry.push(entry(Identifier::Numeric(7), "C", "html/c.html"));

        let first = builder().render_list(&registry);
        let second = builder().render_list(&registry);
        assert_eq!(first, second);
        assert!(first.find("'>A<").unwrap() < first.find("'>B<").unwrap());
    }

    #[test]
    fn test_href_relative_to_index_directory() {
        let builder = IndexBuilder::new("Blog", None, "site/index.html");
        assert_eq!(builder.href(Path::new("site/html/post.html")), "html/post.html");
        assert_eq!(builder.href(Path::new("other/post.html")), "other/post.html");
    }

    #[test]
    fn test_render_uses_site_title_and_banner() {
        let template = Template::new(
            "template.html",
            "<title>{{ title }}</title>{{ title_matter }}{{ content }}",
        );
        let html = builder().render(&PostRegistry::new(), &template);
        assert_eq!(html, "<title>Blog</title><h1>Posts</h1><ul>\n</ul>");
    }

    #[test]
    fn test_render_without_banner() {
        let template = Template::new("template.html", "[{{ title_matter }}]");
        let builder = IndexBuilder::new("Blog", None, "index.html");
        assert_eq!(builder.render(&PostRegistry::new(), &template), "[]");
    }

    #[test]
    fn test_build_writes_index() {
        let dir = TempDir::new().unwrap();
        let index_path = dir.path().join("out").join("index.html");
        let builder = IndexBuilder::new("Blog", None, &index_path);

        let mut registry = PostRegistry::new();
        registry.push(entry(
            Identifier::Numeric(1),
            "Only",
            &dir.path().join("out/html/only.html").to_string_lossy(),
        ));
        let template = Template::new("template.html", "{{ content }}");

        let written = builder.build(&registry, &template).unwrap();

        assert_eq!(written, index_path);
        assert_eq!(
            fs::read_to_string(&index_path).unwrap(),
            "<ul>\n<li><a href='html/only.html'>Only</a></li>\n</ul>"
        );
    }
}
