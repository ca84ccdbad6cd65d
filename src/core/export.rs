//! Exporting the active document to files

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::document::Document;
use crate::render::escape_html;
use crate::render::markdown::{Formatter, MarkdownFormatter};
use crate::render::pdf::{self, PageLayout, WordWrap};

/// Output formats offered by the export menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Text,
    Html,
    /// Markup stripped, wrapped and split into form-feed separated pages
    PagedText,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Markdown,
        ExportFormat::Text,
        ExportFormat::Html,
        ExportFormat::PagedText,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Text | ExportFormat::PagedText => "txt",
            ExportFormat::Html => "html",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "Markdown",
            ExportFormat::Text => "Text file",
            ExportFormat::Html => "HTML",
            ExportFormat::PagedText => "Printable text",
        }
    }
}

/// Suggested file name for exporting `title`
pub fn file_name(title: &str, format: ExportFormat) -> String {
    let stem: String = title
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect();
    let stem = stem.trim();
    let stem = if stem.is_empty() { "document" } else { stem };
    format!("{}.{}", stem, format.extension())
}

/// Produce the exported file contents
pub fn render(doc: &Document, format: ExportFormat) -> String {
    match format {
        ExportFormat::Markdown | ExportFormat::Text => doc.content.clone(),
        ExportFormat::Html => {
            let body = MarkdownFormatter::default().render(&doc.content);
            format!(
                "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
                escape_html(&doc.title),
                body
            )
        }
        ExportFormat::PagedText => {
            let plain = pdf::strip_markup(&doc.content);
            let lines = WordWrap.layout(&plain, pdf::DEFAULT_PAGE_WIDTH);
            pdf::paginate(lines, pdf::LINES_PER_PAGE)
                .iter()
                .map(|page| page.join("\n"))
                .collect::<Vec<_>>()
                .join("\n\x0c\n")
        }
    }
}

/// Write `doc` to `path` in the given format
pub fn write(doc: &Document, format: ExportFormat, path: &Path) -> Result<()> {
    fs::write(path, render(doc, format))
        .with_context(|| format!("Failed to export file: {}", path.display()))?;
    tracing::info!("Exported document {} to: {}", doc.id, path.display());
    Ok(())
}
