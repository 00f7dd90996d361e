//! Document rendering.
//!
//! [`Renderer`] lays a [`FormRecord`] out as a [`Document`]: pages of text
//! lines positioned in millimetres from the top-left corner. Layout is
//! independent of the output format; a [`DocumentWriter`] turns the laid-out
//! document into bytes.
//!
//! A vertical cursor tracks the next line position. Before any line is
//! written, a cursor past the page's bottom limit starts a new page and
//! resets to the top margin. The timestamp footer goes on whichever page the
//! content ends on.

pub mod metrics;
pub mod pdf;
pub mod text;
pub mod wrap;

use chrono::{DateTime, Local, NaiveDateTime};
use tracing::{debug, trace};

use crate::config::{ExportFormat, PageConfig};
use crate::error::Result;
use crate::form::{FormId, FormRecord, FormStyle};

pub use pdf::PdfWriter;
pub use text::TextWriter;
pub use wrap::wrap_text;

/// Checkbox glyph for a checked item.
pub const CHECKED_GLYPH: char = '☑';

/// Checkbox glyph for an unchecked item.
pub const UNCHECKED_GLYPH: char = '☐';

/// Extra space after a section heading.
const HEADING_GAP: f32 = 5.0;
/// Extra space after each checklist item.
const ITEM_GAP: f32 = 2.0;
/// Extra space after a section or a free-text field.
const BLOCK_GAP: f32 = 5.0;

const GO_VERDICT: &str = "GO - Launch the experiment results";
const NO_GO_VERDICT: &str = "NO-GO - Do not launch";

/// Font variant of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    /// Upright regular.
    Regular,
    /// Bold.
    Bold,
    /// Italic.
    Italic,
}

/// What a line represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Document title.
    Title,
    /// Checklist section heading.
    Heading,
    /// Checklist item (or a wrapped continuation of one).
    Item {
        /// Whether the item is checked.
        checked: bool,
    },
    /// Free-text field label.
    Label,
    /// Free-text field value.
    Body,
    /// Go/no-go decision.
    Decision,
    /// Generation timestamp.
    Footer,
}

impl LineKind {
    /// Font size in points.
    #[must_use]
    pub fn font_size(&self) -> f32 {
        match self {
            Self::Title => 20.0,
            Self::Heading => 14.0,
            Self::Decision => 12.0,
            Self::Label => 11.0,
            Self::Item { .. } | Self::Body => 10.0,
            Self::Footer => 8.0,
        }
    }

    /// Font variant.
    #[must_use]
    pub fn weight(&self) -> FontWeight {
        match self {
            Self::Heading | Self::Label | Self::Decision => FontWeight::Bold,
            Self::Footer => FontWeight::Italic,
            Self::Title | Self::Item { .. } | Self::Body => FontWeight::Regular,
        }
    }
}

/// A positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// What the line represents.
    pub kind: LineKind,
    /// Text content.
    pub text: String,
    /// Distance from the left edge, in millimetres.
    pub x: f32,
    /// Baseline distance from the top edge, in millimetres.
    pub y: f32,
}

/// One page of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Lines in emission order.
    pub lines: Vec<Line>,
}

/// A rendered, paginated document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document title.
    pub title: String,
    /// Local time the document was generated.
    pub generated_at: NaiveDateTime,
    /// Page width in millimetres.
    pub width: f32,
    /// Page height in millimetres.
    pub height: f32,
    /// Pages in order; never empty.
    pub pages: Vec<Page>,
}

impl Document {
    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Iterate over every line with its zero-based page index.
    pub fn lines(&self) -> impl Iterator<Item = (usize, &Line)> + '_ {
        self.pages
            .iter()
            .enumerate()
            .flat_map(|(index, page)| page.lines.iter().map(move |line| (index, line)))
    }

    /// Iterate over the lines of one kind.
    pub fn lines_of(&self, kind: LineKind) -> impl Iterator<Item = &Line> + '_ {
        self.lines()
            .map(|(_, line)| line)
            .filter(move |line| line.kind == kind)
    }

    /// Whether any line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().any(|(_, line)| line.text.contains(needle))
    }
}

/// Encodes a [`Document`] into a file format.
pub trait DocumentWriter {
    /// The format this writer produces.
    fn format(&self) -> ExportFormat;

    /// Encode the document.
    ///
    /// # Errors
    ///
    /// Returns a render error if the document cannot be encoded.
    fn encode(&self, document: &Document) -> Result<Vec<u8>>;
}

/// Get the writer for a format.
#[must_use]
pub fn writer_for(format: ExportFormat) -> Box<dyn DocumentWriter> {
    match format {
        ExportFormat::Pdf => Box::new(PdfWriter),
        ExportFormat::Text => Box::new(TextWriter),
    }
}

/// Lays out form records as paginated documents.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    page: PageConfig,
}

impl Renderer {
    /// Create a renderer for the given page geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if the geometry is invalid.
    pub fn new(page: PageConfig) -> Result<Self> {
        page.validate()?;
        Ok(Self { page })
    }

    /// The page geometry.
    #[must_use]
    pub fn page(&self) -> &PageConfig {
        &self.page
    }

    /// Render `record` as a document titled `title`, stamped with the
    /// current local time.
    #[must_use]
    pub fn render(&self, form: FormId, title: &str, record: &FormRecord) -> Document {
        self.render_at(form, title, record, Local::now())
    }

    /// Render with an explicit generation time.
    #[must_use]
    pub fn render_at(
        &self,
        form: FormId,
        title: &str,
        record: &FormRecord,
        generated_at: DateTime<Local>,
    ) -> Document {
        if record.form() != form {
            debug!(
                "Rendering {} record with the {} layout; unknown keys render as defaults",
                record.form(),
                form
            );
        }

        let mut layout = Layout::new(&self.page);
        layout.title(title);

        match form.schema().style {
            FormStyle::Checklist => layout.checklist(form, record),
            FormStyle::FreeText => layout.free_text(form, record),
        }

        layout.footer(&format!(
            "Generated on {}",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        ));

        let document = Document {
            title: title.to_string(),
            generated_at: generated_at.naive_local(),
            width: self.page.width,
            height: self.page.height,
            pages: layout.pages,
        };
        debug!(
            "Rendered {} as {} page(s)",
            form,
            document.page_count()
        );
        document
    }
}

/// Wrap `text` to the page's text width in the font of `kind`.
fn wrap_for(kind: LineKind, text: &str, width: f32) -> Vec<String> {
    let (size, weight) = (kind.font_size(), kind.weight());
    wrap_text(text, width, |line| metrics::text_width(line, size, weight))
}

struct Layout<'a> {
    page: &'a PageConfig,
    pages: Vec<Page>,
    cursor: f32,
}

impl<'a> Layout<'a> {
    fn new(page: &'a PageConfig) -> Self {
        Self {
            page,
            pages: vec![Page::default()],
            cursor: page.content_top,
        }
    }

    fn current(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn title(&mut self, title: &str) {
        let kind = LineKind::Title;
        let x = self.page.margin_left;
        let gap = self.page.content_top - self.page.title_y;

        let mut y = self.page.title_y;
        for (index, text) in wrap_for(kind, title, self.page.text_width)
            .into_iter()
            .enumerate()
        {
            if index > 0 {
                y += self.page.line_height;
                if y > self.page.bottom_limit {
                    self.pages.push(Page::default());
                    y = self.page.top_margin;
                    trace!("Page break inside title");
                }
            }
            self.current().lines.push(Line { kind, text, x, y });
        }
        // Content keeps its distance from the last title line
        self.cursor = y + gap;
    }

    fn emit(&mut self, kind: LineKind, text: String) {
        if self.cursor > self.page.bottom_limit {
            self.pages.push(Page::default());
            self.cursor = self.page.top_margin;
            trace!("Page break before {:?} line", kind);
        }
        let (x, y) = (self.page.margin_left, self.cursor);
        self.current().lines.push(Line { kind, text, x, y });
        self.cursor += self.page.line_height;
    }

    fn emit_wrapped(&mut self, kind: LineKind, text: &str) {
        for line in wrap_for(kind, text, self.page.text_width) {
            self.emit(kind, line);
        }
    }

    fn advance(&mut self, gap: f32) {
        self.cursor += gap;
    }

    fn checklist(&mut self, form: FormId, record: &FormRecord) {
        let schema = form.schema();

        for section in schema.sections {
            self.emit(LineKind::Heading, section.title.to_string());
            self.advance(HEADING_GAP);

            for item in section.fields {
                let checked = record.is_checked(item.key);
                let glyph = if checked { CHECKED_GLYPH } else { UNCHECKED_GLYPH };
                self.emit_wrapped(LineKind::Item { checked }, &format!("{glyph} {}", item.label));
                self.advance(ITEM_GAP);
            }
            self.advance(BLOCK_GAP);
        }

        if let Some(decision) = &schema.decision {
            let value = record.text(decision.key).trim();
            if !value.is_empty() {
                let verdict = if value.eq_ignore_ascii_case("go") {
                    GO_VERDICT
                } else {
                    NO_GO_VERDICT
                };
                self.emit_wrapped(LineKind::Decision, &format!("{}: {verdict}", decision.label));
            }
        }
    }

    fn free_text(&mut self, form: FormId, record: &FormRecord) {
        for field in form.schema().fields() {
            let value = record.display_text(field);
            if value.trim().is_empty() {
                continue;
            }
            self.emit_wrapped(LineKind::Label, &format!("{}:", field.label));
            self.emit_wrapped(LineKind::Body, &value);
            self.advance(BLOCK_GAP);
        }
    }

    fn footer(&mut self, text: &str) {
        let (x, y) = (self.page.margin_left, self.page.height - self.page.footer_offset);
        self.current().lines.push(Line {
            kind: LineKind::Footer,
            text: text.to_string(),
            x,
            y,
        });
    }
}
