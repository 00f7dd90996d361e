//! PDF document writer.
//!
//! Documents are set in the standard Helvetica faces with `WinAnsiEncoding`,
//! so no fonts are embedded. Text is encoded as Windows-1252; glyphs the
//! fonts lack are substituted first (`☑` prints as `[x]`) and anything
//! still unmappable prints as `?`.

use chrono::{Datelike, NaiveDateTime, Timelike};
use encoding_rs::WINDOWS_1252;
use pdf_writer::{Content, Date, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use super::{metrics, Document, DocumentWriter, FontWeight, Line};
use crate::config::ExportFormat;
use crate::error::{Error, Result};

/// Points per millimetre.
const PT_PER_MM: f32 = 72.0 / 25.4;

const CATALOG_ID: i32 = 1;
const PAGES_ID: i32 = 2;
const INFO_ID: i32 = 3;
const FIRST_FONT_ID: i32 = 4;
const FIRST_PAGE_ID: i32 = 7;

const FONTS: [(FontWeight, &[u8], &[u8]); 3] = [
    (FontWeight::Regular, b"F1", b"Helvetica"),
    (FontWeight::Bold, b"F2", b"Helvetica-Bold"),
    (FontWeight::Italic, b"F3", b"Helvetica-Oblique"),
];

/// Writes documents as PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriter;

impl DocumentWriter for PdfWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn encode(&self, document: &Document) -> Result<Vec<u8>> {
        if document.pages.is_empty() {
            return Err(Error::render("document has no pages"));
        }
        if document.width <= 0.0 || document.height <= 0.0 {
            return Err(Error::render(format!(
                "invalid page size {}x{} mm",
                document.width, document.height
            )));
        }

        let page_count = i32::try_from(document.pages.len())
            .map_err(|_| Error::render(format!("too many pages: {}", document.pages.len())))?;
        let page_ids: Vec<Ref> = (0..page_count)
            .map(|index| Ref::new(FIRST_PAGE_ID + index * 2))
            .collect();

        let pages_id = Ref::new(PAGES_ID);
        let mut pdf = Pdf::new();
        pdf.catalog(Ref::new(CATALOG_ID)).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(page_count);

        for (index, (_, _, base_font)) in (0..).zip(FONTS) {
            pdf.type1_font(Ref::new(FIRST_FONT_ID + index))
                .base_font(Name(base_font))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }

        let producer = format!("exptoolkit {}", env!("CARGO_PKG_VERSION"));
        let mut info = pdf.document_info(Ref::new(INFO_ID));
        info.title(TextStr(&document.title))
            .producer(TextStr(&producer));
        if let Some(date) = pdf_date(&document.generated_at) {
            info.creation_date(date);
        }
        info.finish();

        let media_box = Rect::new(
            0.0,
            0.0,
            document.width * PT_PER_MM,
            document.height * PT_PER_MM,
        );
        for (page, &page_id) in document.pages.iter().zip(&page_ids) {
            let content_id = Ref::new(page_id.get() + 1);

            let mut pdf_page = pdf.page(page_id);
            pdf_page
                .media_box(media_box)
                .parent(pages_id)
                .contents(content_id);
            {
                let mut resources = pdf_page.resources();
                let mut fonts = resources.fonts();
                for (index, (_, resource, _)) in (0..).zip(FONTS) {
                    fonts.pair(Name(resource), Ref::new(FIRST_FONT_ID + index));
                }
            }
            pdf_page.finish();

            let mut content = Content::new();
            for line in &page.lines {
                draw_line(&mut content, line, document.height);
            }
            pdf.stream(content_id, &content.finish());
        }

        Ok(pdf.finish())
    }
}

fn font_resource(weight: FontWeight) -> Name<'static> {
    let (_, resource, _) = FONTS
        .iter()
        .find(|(font, _, _)| *font == weight)
        .copied()
        .unwrap_or(FONTS[0]);
    Name(resource)
}

/// Baseline of `line` in PDF user space, which runs up from the bottom edge.
fn baseline(line: &Line, page_height: f32) -> (f32, f32) {
    (line.x * PT_PER_MM, (page_height - line.y) * PT_PER_MM)
}

fn draw_line(content: &mut Content, line: &Line, page_height: f32) {
    let (x, y) = baseline(line, page_height);
    let text = encode_text(&line.text);
    content
        .begin_text()
        .set_font(font_resource(line.kind.weight()), line.kind.font_size())
        .next_line(x, y)
        .show(Str(&text))
        .end_text();
}

/// Encode text as Windows-1252 bytes for the standard fonts.
fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut buf = [0; 4];
    for ch in text.chars() {
        if let Some(replacement) = metrics::substitute(ch) {
            out.extend_from_slice(replacement.as_bytes());
            continue;
        }
        let (bytes, _, unmappable) = WINDOWS_1252.encode(ch.encode_utf8(&mut buf));
        if unmappable {
            out.push(b'?');
        } else {
            out.extend_from_slice(&bytes);
        }
    }
    out
}

fn pdf_date(at: &NaiveDateTime) -> Option<Date> {
    Some(
        Date::new(u16::try_from(at.year()).ok()?)
            .month(u8::try_from(at.month()).ok()?)
            .day(u8::try_from(at.day()).ok()?)
            .hour(u8::try_from(at.hour()).ok()?)
            .minute(u8::try_from(at.minute()).ok()?)
            .second(u8::try_from(at.second()).ok()?),
    )
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate, TimeZone};

    use super::*;
    use crate::form::{FormId, FormRecord};
    use crate::render::{LineKind, Renderer};

    fn encode(form: FormId, record: &FormRecord) -> String {
        let time = Local.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        let doc = Renderer::default().render_at(form, form.schema().title, record, time);
        let bytes = PdfWriter.encode(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_document_structure() {
        let text = encode(FormId::Brief, &FormRecord::new(FormId::Brief));
        assert!(text.contains("/Type /Catalog"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(text.contains("/BaseFont /Helvetica-Oblique"));
        assert!(text.contains("/WinAnsiEncoding"));
        assert!(text.contains("(D:20261018093000"));
        assert!(text.contains("(Blank Experiment Brief) Tj"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn test_page_count_matches_document() {
        let text = encode(FormId::Checklist, &FormRecord::new(FormId::Checklist));
        assert!(text.contains("/Count 2"));
        assert!(text.matches(" Tj").count() > 30);
    }

    #[test]
    fn test_checklist_glyphs_transliterated() {
        let mut record = FormRecord::new(FormId::Gono);
        record.set_checked("gono_1", true).unwrap();

        let text = encode(FormId::Gono, &record);
        assert!(text.contains("([x] Prototype fidelity matches intended test goal) Tj"));
        assert!(text.contains("([ ] Brand guidelines met) Tj"));
        assert!(!text.contains('☐'));
    }

    #[test]
    fn test_baseline_flips_y_axis() {
        let line = Line {
            kind: LineKind::Title,
            text: String::new(),
            x: 20.0,
            y: 20.0,
        };
        let (x, y) = baseline(&line, 297.0);
        assert!((x - 56.693).abs() < 0.01);
        assert!((y - 785.197).abs() < 0.01);
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(encode_text("a (b) c"), b"a (b) c");
        assert_eq!(encode_text("café"), b"caf\xE9");
        assert_eq!(encode_text("Hybrid Lab–Field"), b"Hybrid Lab\x96Field");
        assert_eq!(encode_text("≤1-page\t☑"), b"<=1-page [x]");
        assert_eq!(encode_text("日本"), b"??");
    }

    #[test]
    fn test_pdf_date() {
        let at = NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(9, 30, 5)
            .unwrap();
        assert!(pdf_date(&at).is_some());

        let ancient = NaiveDate::from_ymd_opt(-44, 3, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(pdf_date(&ancient).is_none());
    }

    #[test]
    fn test_empty_document_is_an_error() {
        let mut doc =
            Renderer::default().render(FormId::Brief, "Empty", &FormRecord::new(FormId::Brief));
        doc.pages.clear();
        assert!(PdfWriter.encode(&doc).unwrap_err().is_render_failure());
    }
}
