// Markdown rendering for the preview surface
// GitHub-flavoured Markdown via pulldown-cmark, with media substitution passes
// and GitHub-style class decoration.

pub mod media;
pub mod worker;

use std::sync::OnceLock;

use peek_core::{MarkdownEngine, RenderError};
use pulldown_cmark::{Event, Options, Parser};
use regex::Regex;

pub use worker::{RenderOutcome, RenderWorker};

/// Largest input accepted by the default renderer.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 512 * 1024;

// ──────────────────────────────────────────────
// MarkdownRenderer
// ──────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
    max_input_bytes: usize,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }

    /// Create a renderer that rejects inputs larger than `max_input_bytes`.
    pub fn with_max_input(max_input_bytes: usize) -> Self {
        Self {
            max_input_bytes,
            ..Self::new()
        }
    }

    fn to_html(&self, text: &str) -> String {
        // Single newlines inside a paragraph are kept as line breaks.
        let parser = Parser::new_ext(text, self.options).map(|event| match event {
            Event::SoftBreak => Event::HardBreak,
            other => other,
        });
        let mut html = String::with_capacity(text.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut html, parser);
        html
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownEngine for MarkdownRenderer {
    fn render(&self, text: &str) -> Result<String, RenderError> {
        if text.len() > self.max_input_bytes {
            return Err(RenderError::Engine(format!(
                "input of {} bytes exceeds the {} byte limit",
                text.len(),
                self.max_input_bytes
            )));
        }
        let prepared = media::extract_videos(text);
        let html = self.to_html(&prepared);
        let html = media::expand_videos(&html);
        let html = media::wrap_images(&html);
        Ok(decorate(&html))
    }
}

// ──────────────────────────────────────────────
// Class decoration
// ──────────────────────────────────────────────

fn decorations() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            // Table
            (r"<table>", r#"<table class="markdown-table">"#),
            (r"<thead>", r#"<thead class="markdown-thead">"#),
            (r"<tbody>", r#"<tbody class="markdown-tbody">"#),
            // Block elements
            (r"<blockquote>", r#"<blockquote class="markdown-blockquote">"#),
            (r"<pre><code", r#"<pre class="markdown-code"><code"#),
            (r"<p>", r#"<p class="markdown-paragraph">"#),
            (r"<hr\s*/?>", r#"<hr class="markdown-hr" />"#),
            // Headings
            (r"<h([1-6])>", r#"<h${1} class="markdown-h${1}">"#),
            // Lists
            (r"<ul>", r#"<ul class="markdown-list markdown-ul">"#),
            (r#"<ol( start="\d+")?>"#, r#"<ol class="markdown-list markdown-ol"${1}>"#),
            (r"<li>", r#"<li class="markdown-list-item">"#),
            (r#"type="checkbox""#, r#"type="checkbox" class="markdown-checkbox""#),
            // Links
            (r"<a href", r#"<a class="markdown-link" href"#),
        ]
        .into_iter()
        .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
        .collect()
    })
}

/// Add the GitHub-style classes the surface stylesheet targets.
pub fn decorate(html: &str) -> String {
    decorations()
        .iter()
        .fold(html.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, *replacement).into_owned()
        })
}

/// Markup shown in the mount point when rendering fails.
pub fn inline_error(err: &RenderError) -> String {
    format!(
        "<div class=\"error\">Failed to render markdown: {}</div>",
        media::escape(&err.to_string())
    )
}

/// Render `text`, turning a failure into inline error markup.
pub fn render_or_inline_error(engine: &dyn MarkdownEngine, text: &str) -> String {
    match engine.render(text) {
        Ok(html) => html,
        Err(e) => {
            log::error!("Failed to render markdown: {}", e);
            inline_error(&e)
        }
    }
}
