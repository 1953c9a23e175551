//! Syntax highlighting for code blocks.

use syntect::{
    easy::HighlightLines,
    highlighting::{Theme, ThemeSet},
    html::{IncludeBackground, highlighted_html_for_string, styled_line_to_highlighted_html},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

use crate::markdown::html_escape;

/// Syntax highlighter using syntect.
#[derive(Debug)]
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    default_theme: String,
    line_numbers: bool,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new("base16-ocean.dark")
    }
}

impl SyntaxHighlighter {
    /// Create a new syntax highlighter with the specified theme.
    pub fn new(theme: &str) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            default_theme: theme.to_string(),
            line_numbers: false,
        }
    }

    /// Highlight code with the given language.
    ///
    /// If the language is not recognized, returns the code wrapped in a `<pre><code>` block.
    pub fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let syntax = lang
            .and_then(|l| self.syntax_set.find_syntax_by_token(l))
            .or_else(|| self.syntax_set.find_syntax_by_extension("txt"));

        let theme = self
            .theme_set
            .themes
            .get(&self.default_theme)
            .or_else(|| self.theme_set.themes.values().next());

        match (syntax, theme) {
            (Some(syntax), Some(theme)) if self.line_numbers => self
                .highlight_numbered(code, syntax, theme)
                .unwrap_or_else(|| plain_code_block(code, lang)),
            (Some(syntax), Some(theme)) => {
                match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
                    Ok(html) => html,
                    Err(_) => plain_code_block(code, lang),
                }
            }
            _ => plain_code_block(code, lang),
        }
    }

    /// Highlight line by line, prefixing each line with its number.
    fn highlight_numbered(
        &self,
        code: &str,
        syntax: &SyntaxReference,
        theme: &Theme,
    ) -> Option<String> {
        let mut highlighter = HighlightLines::new(syntax, theme);
        let background = theme
            .settings
            .background
            .map(|c| format!(" style=\"background-color:#{:02x}{:02x}{:02x};\"", c.r, c.g, c.b))
            .unwrap_or_default();

        let mut html = format!("<pre class=\"highlight linenums\"{background}><code>");
        for (index, line) in LinesWithEndings::from(code).enumerate() {
            let regions = highlighter.highlight_line(line, &self.syntax_set).ok()?;
            let line_html = styled_line_to_highlighted_html(&regions, IncludeBackground::No).ok()?;
            html.push_str(&format!("<span class=\"linenos\">{}</span>", index + 1));
            html.push_str(&line_html);
        }
        html.push_str("</code></pre>\n");
        Some(html)
    }

    /// Set the default theme.
    pub fn set_theme(&mut self, theme: &str) {
        if self.theme_set.themes.contains_key(theme) {
            self.default_theme = theme.to_string();
        } else {
            tracing::warn!(theme, "unknown syntax theme, keeping {}", self.default_theme);
        }
    }

    /// Enable or disable line numbers.
    pub fn set_line_numbers(&mut self, enabled: bool) {
        self.line_numbers = enabled;
    }
}

/// Unhighlighted code block, used when highlighting is off or fails.
pub fn plain_code_block(code: &str, lang: Option<&str>) -> String {
    let escaped = html_escape(code);
    let lang_class = lang
        .map(|l| format!(" class=\"language-{}\"", html_escape(l)))
        .unwrap_or_default();
    format!("<pre><code{lang_class}>{escaped}</code></pre>\n")
}
