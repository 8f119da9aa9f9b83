//! Markdown/MDX rendering with heading anchors and syntax highlighting

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::derive::{SlugTracker, TocEntry};

/// Parser shared by rendering and the table of contents, so both see the
/// same headings
fn parser(markdown: &str) -> Parser<'_> {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_GFM;
    Parser::new_ext(markdown, options)
}

/// Headings of a Markdown body in document order.
///
/// Anchors are assigned exactly as [`MarkdownRenderer::render`] assigns
/// heading ids. Headings without text get no entry.
pub fn table_of_contents(markdown: &str) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    let mut slugs = SlugTracker::new();
    let mut current: Option<(u8, Option<String>, String)> = None;

    for event in parser(markdown) {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                current = Some((level as u8, id.map(|id| id.to_string()), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, heading_text)) = current.as_mut() {
                    heading_text.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, id, text)) = current.take() {
                    let slug = slugs.anchor(id.as_deref(), &text);
                    let text = text.trim().to_string();
                    if !text.is_empty() {
                        entries.push(TocEntry { level, text, slug });
                    }
                }
            }
            _ => {}
        }
    }

    entries
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        // Front-matter is handled separately in FrontMatter::parse()
        let parser = parser(markdown);

        let mut events: Vec<Event> = Vec::new();
        let mut in_code_block = false;
        let mut code_block_lang: Option<String> = None;
        let mut code_block_content = String::new();
        let mut heading_start: Option<usize> = None;
        let mut heading_text = String::new();
        let mut heading_has_link = false;
        let mut slugs = SlugTracker::new();

        for event in parser {
            if heading_start.is_some() {
                match &event {
                    Event::Text(text) | Event::Code(text) => heading_text.push_str(text),
                    Event::Start(Tag::Link { .. }) => heading_has_link = true,
                    _ => {}
                }
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_block_lang = match kind {
                        CodeBlockKind::Fenced(lang) => {
                            // "rust,ignore" or "js title=x" keep only the language
                            let lang = lang.split([',', ' ']).next().unwrap_or("").to_string();
                            if lang.is_empty() {
                                None
                            } else {
                                Some(lang)
                            }
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let highlighted =
                        self.highlight_code(&code_block_content, code_block_lang.as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                    in_code_block = false;
                    code_block_lang = None;
                }
                Event::Text(text) if in_code_block => {
                    code_block_content.push_str(&text);
                }
                Event::Start(Tag::Heading { .. }) => {
                    heading_start = Some(events.len());
                    heading_text.clear();
                    heading_has_link = false;
                    events.push(event);
                }
                Event::End(TagEnd::Heading(level)) => {
                    if let Some(start) = heading_start.take() {
                        let mut anchor = None;
                        if let Event::Start(Tag::Heading { id, .. }) = &mut events[start] {
                            let slug = slugs.anchor(id.as_deref(), &heading_text);
                            *id = Some(CowStr::from(slug.clone()));
                            anchor = Some(slug);
                        }
                        // Links cannot nest, so headings with a link stay unwrapped
                        if let (Some(anchor), false) = (anchor, heading_has_link) {
                            let link = format!(r##"<a class="heading-link" href="#{}">"##, anchor);
                            events.insert(start + 1, Event::Html(CowStr::from(link)));
                            events.push(Event::Html(CowStr::from("</a>")));
                        }
                    }
                    events.push(Event::End(TagEnd::Heading(level)));
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let highlighted = self
            .theme()
            .and_then(|theme| highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok());

        match highlighted {
            Some(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Some(highlighted) => format!(
                r#"<div class="highlight language-{}">{}</div>"#,
                lang, highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                lang,
                html_escape(code)
            ),
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();

        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");
        let code_lines = lines.join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre>{}</pre></td></tr></table></figure>"#,
            lang, gutter, code_lines
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop top-level MDX `import` / `export` statements.
///
/// JSX elements are left alone and end up as raw HTML.
pub fn strip_mdx_esm(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut in_fence = false;
    let mut in_statement = false;

    for line in body.lines() {
        if in_statement {
            if line.contains('}') {
                in_statement = false;
            }
            continue;
        }

        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
        }

        if !in_fence && (line.starts_with("import ") || line.starts_with("export ")) {
            // Multi-line `import { a, b } from` / `export const x = {`
            in_statement = line.contains('{') && !line.contains('}');
            continue;
        }

        out.push_str(line);
        out.push('\n');
    }

    out
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
