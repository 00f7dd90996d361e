//! Plain-text document writer.
//!
//! Pages are separated by a form feed. Headings, labels, the decision line
//! and the footer are preceded by a blank line unless they open a page.

use super::{Document, DocumentWriter, LineKind};
use crate::config::ExportFormat;
use crate::error::{Error, Result};

/// Writes documents as UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextWriter;

impl DocumentWriter for TextWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Text
    }

    fn encode(&self, document: &Document) -> Result<Vec<u8>> {
        if document.pages.is_empty() {
            return Err(Error::render("document has no pages"));
        }

        let mut out = String::new();
        for (index, page) in document.pages.iter().enumerate() {
            if index > 0 {
                out.push('\u{c}');
            }
            for (position, line) in page.lines.iter().enumerate() {
                let spaced = matches!(
                    line.kind,
                    LineKind::Heading | LineKind::Label | LineKind::Decision | LineKind::Footer
                );
                if spaced && position > 0 {
                    out.push('\n');
                }
                out.push_str(&line.text);
                out.push('\n');
            }
        }

        Ok(out.into_bytes())
    }
}
