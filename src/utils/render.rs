//! Terminal rendering of a [`ContentResult`].
//!
//! Metadata first, then sections and their paragraph groups in order, then
//! figures as image or view links. Unavailable results show the message,
//! any summary metadata, and a link back to the source.

use owo_colors::{OwoColorize, Style};
use unicode_width::UnicodeWidthStr;

use crate::models::{ArticleContent, ArticleSummary, ContentResult, UnavailableContent};

/// Width used when the terminal size cannot be determined.
pub const DEFAULT_WIDTH: usize = 100;

const INDENT: &str = "  ";

/// Current terminal width in columns.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Options for [`render_content`].
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Wrap paragraphs to this many columns
    pub width: usize,
    /// Emit ANSI colors
    pub color: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            color: false,
        }
    }
}

/// Render a pipeline result as human-readable text.
pub fn render_content(result: &ContentResult, options: RenderOptions) -> String {
    let mut out = Renderer {
        buf: String::new(),
        options,
    };
    match result {
        ContentResult::Available(available) => {
            out.article(&available.content);
            out.blank();
            out.field("Source", &available.original_url);
        }
        ContentResult::Unavailable(unavailable) => out.unavailable(unavailable),
    }
    out.buf
}

/// Render parsed article content without a pipeline result around it.
pub fn render_article(content: &ArticleContent, options: RenderOptions) -> String {
    let mut out = Renderer {
        buf: String::new(),
        options,
    };
    out.article(content);
    out.buf
}

/// Greedy word wrap by display width.
///
/// Words wider than `width` get a line of their own.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();
        if !line.is_empty() && line_width + 1 + word_width > width {
            lines.push(std::mem::take(&mut line));
            line_width = 0;
        }
        if !line.is_empty() {
            line.push(' ');
            line_width += 1;
        }
        line.push_str(word);
        line_width += word_width;
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

struct Renderer {
    buf: String,
    options: RenderOptions,
}

impl Renderer {
    fn paint(&self, text: &str, style: Style) -> String {
        if self.options.color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    fn line(&mut self, text: &str) {
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    fn blank(&mut self) {
        self.buf.push('\n');
    }

    fn field(&mut self, name: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        let name = self.paint(&format!("{}:", name), Style::new().dimmed());
        self.line(&format!("{} {}", name, value));
    }

    fn header(&mut self, title: &str) {
        let header = self.paint(&format!("━━━ {} ━━━", title), Style::new().bold().cyan());
        self.blank();
        self.line(&header);
    }

    fn paragraph(&mut self, text: &str) {
        let width = self.options.width.saturating_sub(INDENT.len());
        for line in wrap(text, width) {
            self.line(&format!("{}{}", INDENT, line));
        }
    }

    fn article(&mut self, content: &ArticleContent) {
        let meta = &content.metadata;
        let title = self.paint(&meta.title, Style::new().bold());
        self.line(&title);
        self.field("Authors", &meta.authors.join(", "));
        self.field("Journal", &meta.journal);
        self.field("Published", &meta.pub_date);
        self.field("DOI", &meta.doi);

        for section in &content.sections {
            self.header(&section.title);
            for group in &section.subsections {
                if !group.subtitle.trim().is_empty() {
                    let subtitle = self.paint(group.subtitle.trim(), Style::new().bold());
                    self.blank();
                    self.line(&format!("{}{}", INDENT, subtitle));
                }
                for paragraph in &group.paragraphs {
                    self.blank();
                    self.paragraph(paragraph);
                }
            }
        }

        if content.figures.is_empty() {
            return;
        }
        self.header("Figures");
        for figure in &content.figures {
            let label = if figure.label.is_empty() { &figure.id } else { &figure.label };
            let label = self.paint(label, Style::new().bold().yellow());
            self.blank();
            self.line(&format!("{}{}", INDENT, label));
            if !figure.caption.is_empty() {
                self.paragraph(&figure.caption);
            }
            let kind = if figure.resolution.is_resolved() { "Image" } else { "View" };
            let url = self.paint(figure.resolution.url(), Style::new().underline());
            self.line(&format!("{}{}: {}", INDENT, kind, url));
        }
    }

    fn summary(&mut self, summary: &ArticleSummary) {
        let title = self.paint(&summary.title, Style::new().bold());
        self.line(&title);
        self.field("Authors", &summary.authors.join(", "));
        self.field("Journal", &summary.journal);
        self.field("Published", &summary.pub_date);
        self.field("DOI", summary.doi.as_deref().unwrap_or_default());
    }

    fn unavailable(&mut self, content: &UnavailableContent) {
        let message = self.paint(&content.message, Style::new().yellow().bold());
        self.line(&message);

        if let Some(summary) = &content.metadata {
            self.blank();
            self.summary(summary);
        }
        if let Some(error) = &content.error {
            let error = self.paint(error, Style::new().red());
            self.field("Error", &error);
        }

        self.blank();
        match &content.pmc_id {
            Some(id) => self.field(&format!("View {} at", id.prefixed()), &content.original_url),
            None => self.field("Source", &content.original_url),
        }
    }
}
