//! Markdown rendering using pulldown-cmark.
//!
//! The renderer is configured by an ordered list of named extensions:
//!
//! | name | effect |
//! |---|---|
//! | `fenced_code` | fenced code blocks (always on in CommonMark) |
//! | `codehilite` | syntect highlighting; options `linenums`, `theme` |
//! | `toc` | heading anchors and `[TOC]` expansion; option `permalink` |
//! | `admonition` | `> [!NOTE]` style callout blocks |
//! | `tables`, `footnotes`, `strikethrough`, `tasklists` | the matching pulldown-cmark options |

use std::collections::HashMap;

use mdblog_core::{MarkdownConfig, TocEntry};
use pulldown_cmark::{BlockQuoteKind, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::syntax::{SyntaxHighlighter, plain_code_block};

const TOC_MARKER: &str = "[TOC]";
const TOC_PLACEHOLDER: &str = "<!-- mdblog:toc -->";

/// Markdown renderer with syntax highlighting and heading anchors.
#[derive(Debug)]
pub struct MarkdownParser {
    highlighter: Option<SyntaxHighlighter>,
    options: Options,
    toc: bool,
    permalink: bool,
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

struct HeadingState {
    level: u8,
    id: Option<String>,
    classes: Vec<String>,
    start: usize,
    text: String,
}

struct ImageState {
    src: String,
    title: String,
    alt: String,
}

impl MarkdownParser {
    /// Create a parser with the default extension set.
    pub fn new() -> Self {
        Self::from_config(&MarkdownConfig::default())
    }

    /// Create a parser from an extension configuration.
    pub fn from_config(config: &MarkdownConfig) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        let mut highlighter = None;
        let mut toc = false;
        let mut permalink = false;

        for name in &config.extensions {
            match name.as_str() {
                "fenced_code" => {}
                "codehilite" => {
                    let mut h = SyntaxHighlighter::default();
                    if let Some(theme) = config.option_str("codehilite", "theme") {
                        h.set_theme(theme);
                    }
                    h.set_line_numbers(config.flag("codehilite", "linenums", false));
                    highlighter = Some(h);
                }
                "toc" => {
                    toc = true;
                    permalink = config.flag("toc", "permalink", false);
                }
                "admonition" => options.insert(Options::ENABLE_GFM),
                "tables" => options.insert(Options::ENABLE_TABLES),
                "footnotes" => options.insert(Options::ENABLE_FOOTNOTES),
                "strikethrough" => options.insert(Options::ENABLE_STRIKETHROUGH),
                "tasklists" => options.insert(Options::ENABLE_TASKLISTS),
                other => tracing::warn!(extension = other, "unknown markdown extension, ignoring"),
            }
        }

        Self {
            highlighter,
            options,
            toc,
            permalink,
        }
    }

    /// Render a Markdown document to an HTML fragment.
    pub fn render(&self, content: &str) -> String {
        self.parse_body(content).0
    }

    /// Render a Markdown document and return its table of contents.
    pub fn parse_body(&self, content: &str) -> (String, Vec<TocEntry>) {
        if !self.toc {
            return self.render_markdown(content);
        }

        let source = mark_toc_requests(content);
        let (html, toc) = self.render_markdown(&source);
        if html.contains(TOC_PLACEHOLDER) {
            let toc_block = toc_html(&toc);
            (html.replace(TOC_PLACEHOLDER, toc_block.trim_end()), toc)
        } else {
            (html, toc)
        }
    }

    fn render_markdown(&self, content: &str) -> (String, Vec<TocEntry>) {
        let parser = Parser::new_ext(content, self.options);
        let mut toc = Vec::new();
        let mut html = String::new();
        let mut used_ids: HashMap<String, usize> = HashMap::new();
        let mut heading: Option<HeadingState> = None;
        let mut image: Option<ImageState> = None;
        let mut code_block: Option<Option<String>> = None;
        let mut code_block_content = String::new();
        let mut in_table_head = false;

        for event in parser {
            match event {
                Event::Start(Tag::Heading {
                    level, id, classes, ..
                }) => {
                    heading = Some(HeadingState {
                        level: level as u8,
                        id: id.map(|i| i.to_string()),
                        classes: classes.iter().map(|c| c.to_string()).collect(),
                        start: html.len(),
                        text: String::new(),
                    });
                }

                Event::End(TagEnd::Heading(_)) => {
                    let Some(state) = heading.take() else {
                        continue;
                    };
                    let id = match state.id {
                        Some(id) => Some(id),
                        None if self.toc => Some(unique_id(&mut used_ids, &slugify(&state.text))),
                        None => None,
                    };

                    let mut open = format!("<h{}", state.level);
                    if let Some(ref id) = id {
                        open.push_str(&format!(" id=\"{}\"", html_escape(id)));
                    }
                    if !state.classes.is_empty() {
                        open.push_str(&format!(" class=\"{}\"", state.classes.join(" ")));
                    }
                    open.push('>');
                    html.insert_str(state.start, &open);

                    if let Some(id) = id {
                        if self.toc && self.permalink {
                            html.push_str(&format!(
                                "<a class=\"headerlink\" href=\"#{}\" title=\"Permanent link\">&para;</a>",
                                html_escape(&id)
                            ));
                        }
                        toc.push(TocEntry {
                            level: state.level,
                            text: state.text,
                            id,
                        });
                    }
                    html.push_str(&format!("</h{}>\n", state.level));
                }

                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some(lang);
                    code_block_content.clear();
                }

                Event::End(TagEnd::CodeBlock) => {
                    let lang = code_block.take().flatten();
                    let block = match self.highlighter {
                        Some(ref h) => h.highlight(&code_block_content, lang.as_deref()),
                        None => plain_code_block(&code_block_content, lang.as_deref()),
                    };
                    html.push_str(&block);
                    code_block_content.clear();
                }

                Event::Text(text) if code_block.is_some() => {
                    code_block_content.push_str(&text);
                }

                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) => {
                    image = Some(ImageState {
                        src: dest_url.to_string(),
                        title: title.to_string(),
                        alt: String::new(),
                    });
                }

                Event::End(TagEnd::Image) => {
                    if let Some(img) = image.take() {
                        let title_attr = if img.title.is_empty() {
                            String::new()
                        } else {
                            format!(" title=\"{}\"", html_escape(&img.title))
                        };
                        html.push_str(&format!(
                            "<img src=\"{}\" alt=\"{}\"{title_attr} />",
                            html_escape(&img.src),
                            html_escape(&img.alt)
                        ));
                    }
                }

                Event::Text(text) | Event::Code(text) if image.is_some() => {
                    if let Some(ref mut img) = image {
                        img.alt.push_str(&text);
                    }
                }

                Event::Text(text) => {
                    if let Some(ref mut h) = heading {
                        h.text.push_str(&text);
                    }
                    html.push_str(&html_escape(&text));
                }

                Event::Code(code) => {
                    if let Some(ref mut h) = heading {
                        h.text.push_str(&code);
                    }
                    html.push_str(&format!("<code>{}</code>", html_escape(&code)));
                }

                Event::SoftBreak => {
                    html.push('\n');
                }

                Event::HardBreak => {
                    html.push_str("<br />\n");
                }

                Event::Start(Tag::TableHead) => {
                    in_table_head = true;
                    html.push_str("<thead><tr>");
                }

                Event::End(TagEnd::TableHead) => {
                    in_table_head = false;
                    html.push_str("</tr></thead>\n<tbody>\n");
                }

                Event::Start(Tag::TableCell) => {
                    html.push_str(if in_table_head { "<th>" } else { "<td>" });
                }

                Event::End(TagEnd::TableCell) => {
                    html.push_str(if in_table_head { "</th>" } else { "</td>" });
                }

                Event::Start(_) | Event::End(_) if image.is_some() => {}

                Event::Start(tag) => {
                    html.push_str(&tag_to_html_start(&tag));
                }

                Event::End(tag) => {
                    html.push_str(&tag_to_html_end(&tag));
                }

                Event::Html(raw) | Event::InlineHtml(raw) => {
                    html.push_str(&raw);
                }

                Event::FootnoteReference(name) => {
                    let name = html_escape(&name);
                    html.push_str(&format!(
                        "<sup class=\"footnote-ref\"><a href=\"#fn-{name}\">[{name}]</a></sup>"
                    ));
                }

                Event::Rule => {
                    html.push_str("<hr />\n");
                }

                Event::TaskListMarker(checked) => {
                    let checkbox = if checked {
                        "<input type=\"checkbox\" checked disabled />"
                    } else {
                        "<input type=\"checkbox\" disabled />"
                    };
                    html.push_str(checkbox);
                }

                Event::InlineMath(math) => {
                    html.push_str(&format!("<span class=\"math inline\">\\({math}\\)</span>"));
                }

                Event::DisplayMath(math) => {
                    html.push_str(&format!("<div class=\"math display\">\\[{math}\\]</div>"));
                }
            }
        }

        (html, toc)
    }
}

/// Replace standalone `[TOC]` lines outside code fences with a placeholder block.
fn mark_toc_requests(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut in_fence = false;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
        }
        if !in_fence && trimmed == TOC_MARKER {
            out.push('\n');
            out.push_str(TOC_PLACEHOLDER);
            out.push_str("\n\n");
        } else {
            out.push_str(line);
        }
    }
    out
}

/// Nested list of heading links.
fn toc_html(entries: &[TocEntry]) -> String {
    let mut html = String::from("<div class=\"toc\">\n");
    let mut levels: Vec<u8> = Vec::new();

    for entry in entries {
        while levels.last().is_some_and(|&l| l > entry.level) {
            html.push_str("</li>\n</ul>\n");
            levels.pop();
        }
        if levels.last() == Some(&entry.level) {
            html.push_str("</li>\n");
        } else {
            html.push_str("<ul>\n");
            levels.push(entry.level);
        }
        html.push_str(&format!(
            "<li><a href=\"#{}\">{}</a>",
            html_escape(&entry.id),
            html_escape(&entry.text)
        ));
    }
    while levels.pop().is_some() {
        html.push_str("</li>\n</ul>\n");
    }

    html.push_str("</div>\n");
    html
}

/// Convert a pulldown-cmark tag to HTML opening tag.
fn tag_to_html_start(tag: &Tag) -> String {
    match tag {
        Tag::Paragraph => "<p>".to_string(),
        Tag::BlockQuote(Some(kind)) => {
            let (class, label) = admonition_label(*kind);
            format!("<div class=\"admonition {class}\">\n<p class=\"admonition-title\">{label}</p>\n")
        }
        Tag::BlockQuote(None) => "<blockquote>\n".to_string(),
        Tag::List(Some(start)) if *start == 1 => "<ol>\n".to_string(),
        Tag::List(Some(start)) => format!("<ol start=\"{start}\">\n"),
        Tag::List(None) => "<ul>\n".to_string(),
        Tag::Item => "<li>".to_string(),
        Tag::FootnoteDefinition(name) => {
            format!("<div class=\"footnote\" id=\"fn-{}\">", html_escape(name))
        }
        Tag::Table(_) => "<table>\n".to_string(),
        Tag::TableRow => "<tr>".to_string(),
        Tag::Emphasis => "<em>".to_string(),
        Tag::Strong => "<strong>".to_string(),
        Tag::Strikethrough => "<del>".to_string(),
        Tag::Link {
            dest_url, title, ..
        } => {
            let title_attr = if title.is_empty() {
                String::new()
            } else {
                format!(" title=\"{}\"", html_escape(title))
            };
            format!("<a href=\"{}\"{}>", html_escape(dest_url), title_attr)
        }
        Tag::DefinitionList => "<dl>\n".to_string(),
        Tag::DefinitionListTitle => "<dt>".to_string(),
        Tag::DefinitionListDefinition => "<dd>".to_string(),
        Tag::Superscript => "<sup>".to_string(),
        Tag::Subscript => "<sub>".to_string(),
        // Handled in the event loop.
        Tag::Heading { .. }
        | Tag::CodeBlock(_)
        | Tag::Image { .. }
        | Tag::TableHead
        | Tag::TableCell
        | Tag::HtmlBlock
        | Tag::MetadataBlock(_) => String::new(),
    }
}

/// Convert a pulldown-cmark tag end to HTML closing tag.
fn tag_to_html_end(tag: &TagEnd) -> String {
    match tag {
        TagEnd::Paragraph => "</p>\n".to_string(),
        TagEnd::BlockQuote(Some(_)) => "</div>\n".to_string(),
        TagEnd::BlockQuote(None) => "</blockquote>\n".to_string(),
        TagEnd::List(true) => "</ol>\n".to_string(),
        TagEnd::List(false) => "</ul>\n".to_string(),
        TagEnd::Item => "</li>\n".to_string(),
        TagEnd::FootnoteDefinition => "</div>\n".to_string(),
        TagEnd::Table => "</tbody>\n</table>\n".to_string(),
        TagEnd::TableRow => "</tr>\n".to_string(),
        TagEnd::Emphasis => "</em>".to_string(),
        TagEnd::Strong => "</strong>".to_string(),
        TagEnd::Strikethrough => "</del>".to_string(),
        TagEnd::Link => "</a>".to_string(),
        TagEnd::DefinitionList => "</dl>\n".to_string(),
        TagEnd::DefinitionListTitle => "</dt>\n".to_string(),
        TagEnd::DefinitionListDefinition => "</dd>\n".to_string(),
        TagEnd::Superscript => "</sup>".to_string(),
        TagEnd::Subscript => "</sub>".to_string(),
        TagEnd::Heading(_)
        | TagEnd::CodeBlock
        | TagEnd::Image
        | TagEnd::TableHead
        | TagEnd::TableCell
        | TagEnd::HtmlBlock
        | TagEnd::MetadataBlock(_) => String::new(),
    }
}

fn admonition_label(kind: BlockQuoteKind) -> (&'static str, &'static str) {
    match kind {
        BlockQuoteKind::Note => ("note", "Note"),
        BlockQuoteKind::Tip => ("tip", "Tip"),
        BlockQuoteKind::Important => ("important", "Important"),
        BlockQuoteKind::Warning => ("warning", "Warning"),
        BlockQuoteKind::Caution => ("caution", "Caution"),
    }
}

/// Escape HTML special characters.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Convert text to a URL-safe slug.
fn slugify(text: &str) -> String {
    let slug = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

/// Suffix repeated anchors with `_1`, `_2`, ...
fn unique_id(used: &mut HashMap<String, usize>, base: &str) -> String {
    let count = used.entry(base.to_string()).or_insert(0);
    let id = if *count == 0 {
        base.to_string()
    } else {
        format!("{base}_{count}")
    };
    *count += 1;
    id
}
