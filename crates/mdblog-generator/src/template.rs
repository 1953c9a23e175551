//! HTML template with literal placeholder substitution.
//!
//! Placeholders are written `{{ name }}`. Rendering is a single pass over the
//! template text: substituted values are never scanned again, and placeholders
//! without a value are left as they are.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use mdblog_core::{CoreError, Result};
use regex::{Captures, Regex};

static RE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

/// Ordered placeholder values for one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    variables: Vec<(String, String)>,
}

impl TemplateContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a placeholder value, replacing an earlier value for the same name.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.variables.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.variables.push((key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a variable value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A page template.
#[derive(Debug, Clone)]
pub struct Template {
    path: PathBuf,
    content: String,
}

impl Template {
    /// Create a template from text; `path` is only used for reporting.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Read a template from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| CoreError::template(path, e))?;
        Ok(Self::new(path, content))
    }

    /// Where the template came from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render the template with the given context.
    #[must_use]
    pub fn render(&self, context: &TemplateContext) -> String {
        render(&self.content, context)
    }
}

/// Substitute every known `{{ name }}` in `template` in one pass.
#[must_use]
pub fn render(template: &str, context: &TemplateContext) -> String {
    RE_PLACEHOLDER
        .replace_all(template, |caps: &Captures| match context.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_simple_render() {
        let template = Template::new("t.html", "<h1>{{ title }}</h1>");
        let context = TemplateContext::new().with_var("title", "Hello");

        assert_eq!(template.render(&context), "<h1>Hello</h1>");
    }

    #[test]
    fn test_template_multiple_variables() {
        let template = Template::new(
            "t.html",
            "<title>{{ title }}</title>{{ title_matter }}<main>{{ content }}</main>",
        );
        let context = TemplateContext::new()
            .with_var("content", "<p>Body</p>")
            .with_var("title", "Post")
            .with_var("title_matter", "");

        assert_eq!(
            template.render(&context),
            "<title>Post</title><main><p>Body</p></main>"
        );
    }

    #[test]
    fn test_render_without_placeholders_is_identity() {
        let text = "<html>{ not } {{ a placeholder }} {{}} }}{{</html>";
        assert_eq!(render(text, &TemplateContext::new()), text);
    }

    #[test]
    fn test_render_empty_context_keeps_placeholders() {
        let text = "<p>{{ content }}</p>";
        assert_eq!(render(text, &TemplateContext::new()), text);
    }

    #[test]
    fn test_substituted_value_is_not_rescanned() {
        let context = TemplateContext::new().with_var("a", "{{a}}");
        assert_eq!(render("{{a}}", &context), "{{a}}");

        let context = TemplateContext::new()
            .with_var("content", "{{ title }}")
            .with_var("title", "T");
        assert_eq!(
            render("{{ content }}|{{ title }}", &context),
            "{{ title }}|T"
        );
    }

    #[test]
    fn test_unknown_placeholder_left_verbatim() {
        let context = TemplateContext::new().with_var("title", "T");
        assert_eq!(
            render("{{ title }} {{ author }}", &context),
            "T {{ author }}"
        );
    }

    #[test]
    fn test_whitespace_inside_braces_is_optional() {
        let context = TemplateContext::new().with_var("title", "T");
        assert_eq!(render("{{title}}{{ title }}{{   title\t}}", &context), "TTT");
    }

    #[test]
    fn test_every_occurrence_is_replaced() {
        let context = TemplateContext::new().with_var("title", "T");
        assert_eq!(render("{{ title }}/{{ title }}", &context), "T/T");
    }

    #[test]
    fn test_replacement_with_dollar_sign() {
        let context = TemplateContext::new().with_var("content", "costs $1 and ${x}");
        assert_eq!(render("{{ content }}", &context), "costs $1 and ${x}");
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut context = TemplateContext::new();
        context.insert("title", "first");
        context.insert("content", "c");
        context.insert("title", "second");

        assert_eq!(context.get("title"), Some("second"));
        assert_eq!(
            render("{{ title }}|{{ content }}", &context),
            "second|c"
        );
    }

    #[test]
    fn test_load_missing_template() {
        let result = Template::load(Path::new("/nonexistent/template.html"));
        assert!(matches!(result, Err(CoreError::Template { .. })));
    }

    #[test]
    fn test_load_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.html");
        fs::write(&path, "<body>{{ content }}</body>").unwrap();

        let template = Template::load(&path).unwrap();
        assert_eq!(template.path(), path.as_path());
        assert_eq!(
            template.render(&TemplateContext::new().with_var("content", "hi")),
            "<body>hi</body>"
        );
    }
}
