//! Markdown to HTML formatting on top of pulldown-cmark
//!
//! Math spans and fenced code are handed to pluggable renderers so the HTML
//! can be finished by KaTeX/Prism style scripts, or by anything else that
//! implements the traits below.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

use super::escape_html;

/// Turns markdown source into an HTML fragment. Never fails.
pub trait Formatter {
    fn render(&self, markdown: &str) -> String;
}

/// Renders a LaTeX fragment. `None` keeps the original `$...$` source.
pub trait MathRenderer {
    fn render_math(&self, latex: &str, display: bool) -> Option<String>;
}

/// Turns a code fragment into highlighted HTML
pub trait Highlighter {
    fn highlight(&self, code: &str, language: &str) -> String;
}

/// Wraps math in the delimiters client-side math renderers look for
#[derive(Debug, Clone, Copy, Default)]
pub struct MathMarkup;

impl MathRenderer for MathMarkup {
    fn render_math(&self, latex: &str, display: bool) -> Option<String> {
        if latex.trim().is_empty() {
            return None;
        }

        let latex = escape_html(latex);
        Some(if display {
            format!(r#"<div class="math math-display">\[{}\]</div>"#, latex)
        } else {
            format!(r#"<span class="math math-inline">\({}\)</span>"#, latex)
        })
    }
}

/// Emits escaped code tagged with a `language-*` class
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassHighlighter;

impl Highlighter for ClassHighlighter {
    fn highlight(&self, code: &str, language: &str) -> String {
        let language: String = language
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
            .collect();

        if language.is_empty() {
            format!("<pre><code>{}</code></pre>\n", escape_html(code))
        } else {
            format!(
                "<pre><code class=\"language-{}\">{}</code></pre>\n",
                language,
                escape_html(code)
            )
        }
    }
}

/// GitHub-flavoured markdown with math, line breaks kept as typed
pub struct MarkdownFormatter {
    math: Box<dyn MathRenderer>,
    highlighter: Box<dyn Highlighter>,
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new(Box::new(MathMarkup), Box::new(ClassHighlighter))
    }
}

impl MarkdownFormatter {
    pub fn new(math: Box<dyn MathRenderer>, highlighter: Box<dyn Highlighter>) -> Self {
        Self { math, highlighter }
    }

    fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_MATH);
        options
    }

    fn math_event(&self, latex: &str, display: bool) -> Event<'static> {
        match self.math.render_math(latex, display) {
            Some(rendered) if display => Event::Html(CowStr::from(rendered)),
            Some(rendered) => Event::InlineHtml(CowStr::from(rendered)),
            None => {
                let delimiter = if display { "$$" } else { "$" };
                Event::Text(CowStr::from(format!("{delimiter}{latex}{delimiter}")))
            }
        }
    }
}

impl Formatter for MarkdownFormatter {
    fn render(&self, markdown: &str) -> String {
        // (language, collected source) while inside a code block
        let mut code: Option<(String, String)> = None;

        let events = Parser::new_ext(markdown, Self::options()).filter_map(|event| match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or_default().to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                code = Some((language, String::new()));
                None
            }
            Event::Text(text) if code.is_some() => {
                if let Some((_, source)) = code.as_mut() {
                    source.push_str(&text);
                }
                None
            }
            Event::End(TagEnd::CodeBlock) => code.take().map(|(language, source)| {
                Event::Html(CowStr::from(self.highlighter.highlight(&source, &language)))
            }),
            Event::InlineMath(latex) => Some(self.math_event(&latex, false)),
            Event::DisplayMath(latex) => Some(self.math_event(&latex, true)),
            Event::SoftBreak => Some(Event::HardBreak),
            other => Some(other),
        });

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingMath;

    impl MathRenderer for FailingMath {
        fn render_math(&self, _latex: &str, _display: bool) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_render_basic_markdown() {
        let html = MarkdownFormatter::default().render("# Title\n\nSome **bold** text");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_soft_breaks_become_hard() {
        let html = MarkdownFormatter::default().render("line one\nline two");
        assert!(html.contains("line one<br />"));
    }

    #[test]
    fn test_code_blocks_are_highlighted() {
        let html = MarkdownFormatter::default().render("```rust\nlet x = 1 < 2;\n```\n");
        assert!(html.contains(r#"<code class="language-rust">let x = 1 &lt; 2;"#));
    }

    #[test]
    fn test_math_rendering() {
        let html = MarkdownFormatter::default().render("Energy: $E = mc^2$");
        assert!(html.contains(r#"<span class="math math-inline">\(E = mc^2\)</span>"#));

        let html = MarkdownFormatter::default().render("$$x^2$$");
        assert!(html.contains("math-display"));
    }

    #[test]
    fn test_math_failure_keeps_source() {
        let formatter = MarkdownFormatter::new(Box::new(FailingMath), Box::new(ClassHighlighter));
        let html = formatter.render("Energy: $E = mc^2$");
        assert!(html.contains("$E = mc^2$"));
    }

    #[test]
    fn test_malformed_input_does_not_fail() {
        let html = MarkdownFormatter::default().render("**unclosed [link]( ```\n$$ | a |\n|-");
        assert!(!html.is_empty());
    }
}
