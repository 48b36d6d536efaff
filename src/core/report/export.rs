//! FIR PDF Exporter
//!
//! Renders a submitted report into a deterministic, paginated PDF.
//! The same report always produces the same bytes: no timestamps or
//! random IDs are embedded beyond what the report itself carries.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::core::{CoreError, CoreResult};

use super::{ReportDraft, StoredReport};

// =============================================================================
// Layout Constants
// =============================================================================

const PAGE_WIDTH: f32 = 595.28; // A4 portrait, points
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 50.0;

const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 14.0;

/// Character budget for full-width body text at `BODY_SIZE`
const BODY_CHARS: usize = 95;

/// Table column x offsets (from left margin) and character budgets
const COL_SECTION_X: f32 = 0.0;
const COL_TITLE_X: f32 = 75.0;
const COL_DESC_X: f32 = 230.0;
const COL_SECTION_CHARS: usize = 13;
const COL_TITLE_CHARS: usize = 28;
const COL_DESC_CHARS: usize = 50;

/// Document title
pub const DOCUMENT_TITLE: &str = "First Information Report (F.I.R)";

// =============================================================================
// PDF Exporter
// =============================================================================

/// Renders stored reports to PDF
pub struct PdfExporter;

impl PdfExporter {
    /// Renders the report into PDF bytes
    pub fn render(report: &StoredReport) -> CoreResult<Vec<u8>> {
        let mut composer = PageComposer::new();

        // Title, centered
        composer.centered_line(Font::Bold, TITLE_SIZE, DOCUMENT_TITLE);
        composer.blank(0.5);

        composer.line(
            Font::Regular,
            BODY_SIZE,
            &format!("Report ID: {}", report.id),
        );
        composer.line(
            Font::Regular,
            BODY_SIZE,
            &format!("Submitted At: {}", report.submitted_at),
        );
        composer.blank(1.0);

        // Complainant block
        composer.line(Font::Bold, HEADING_SIZE, "Complainant Details");
        composer.blank(0.25);
        composer.labeled(
            "Complainant",
            non_empty_or(&report.report.complainant_name, "Not provided"),
        );
        composer.labeled(
            "Address",
            non_empty_or(&report.report.address, "Not provided"),
        );
        composer.labeled(
            "Place of Occurrence",
            non_empty_or(&report.report.place_of_occurrence, "Not provided"),
        );
        composer.labeled(
            "Incident Date & Time",
            non_empty_or(&report.report.date_time, "Not provided"),
        );
        composer.blank(1.0);

        // Narrative
        composer.line(Font::Bold, HEADING_SIZE, "Details of Incident");
        composer.blank(0.25);
        for paragraph in report.report.incident_details.split('\n') {
            if paragraph.trim().is_empty() {
                composer.blank(0.5);
                continue;
            }
            for wrapped in wrap_text(paragraph.trim(), BODY_CHARS) {
                composer.line(Font::Regular, BODY_SIZE, &wrapped);
            }
        }
        composer.blank(1.0);

        // IPC section table
        composer.line(Font::Bold, HEADING_SIZE, "Applicable IPC Sections");
        composer.blank(0.25);

        let rows = ipc_rows(&report.report);
        if rows.is_empty() {
            composer.line(Font::Regular, BODY_SIZE, "None listed.");
        } else {
            composer.table_header();
            for (section, title, description) in &rows {
                composer.table_row(section, title, description);
            }
        }

        composer.finish()
    }

    /// Suggested file name: `FIR_{name}_{YYYY-MM-DD}.pdf`, whitespace in the
    /// complainant name collapsed to underscores
    pub fn suggested_filename(report: &StoredReport) -> String {
        let name = report.report.complainant_name.trim();
        let name = if name.is_empty() {
            "Unknown".to_string()
        } else {
            name.split_whitespace().collect::<Vec<_>>().join("_")
        };

        let date: String = report.submitted_at.chars().take(10).collect();
        format!("FIR_{}_{}.pdf", name, date)
    }
}

/// Returns the (section, title, description) triples that render into the
/// IPC table, in draft order
pub fn ipc_rows(draft: &ReportDraft) -> Vec<(String, String, String)> {
    draft
        .ipc_sections
        .iter()
        .map(|s| (s.section.clone(), s.title.clone(), s.description.clone()))
        .collect()
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

// =============================================================================
// Word Wrap
// =============================================================================

/// Greedy word wrap against a character budget.
///
/// A single word longer than the budget is hard-split so no line ever
/// exceeds it.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;

        // Hard-split oversized words
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split_at = word
                .char_indices()
                .nth(max_chars)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            lines.push(word[..split_at].to_string());
            word = &word[split_at..];
        }

        if word.is_empty() {
            continue;
        }

        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

// =============================================================================
// Page Composer
// =============================================================================

#[derive(Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static [u8] {
        match self {
            Font::Regular => b"F1",
            Font::Bold => b"F2",
        }
    }

    /// Rough average glyph width as a fraction of the font size (Helvetica)
    fn avg_width_factor(self) -> f32 {
        match self {
            Font::Regular => 0.5,
            Font::Bold => 0.54,
        }
    }
}

/// Accumulates text operations across pages, breaking at the bottom margin
struct PageComposer {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: f32,
}

impl PageComposer {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn break_page(&mut self) {
        let ops = std::mem::take(&mut self.current);
        self.pages.push(ops);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Starts a new page if fewer than `lines` body lines fit
    fn ensure_space(&mut self, lines: usize) {
        let needed = lines as f32 * LINE_HEIGHT;
        if self.y - needed < MARGIN {
            self.break_page();
        }
    }

    fn text_at(&mut self, x: f32, font: Font, size: f32, text: &str) {
        self.current.push(Operation::new("BT", vec![]));
        self.current.push(Operation::new(
            "Tf",
            vec![
                Object::Name(font.resource_name().to_vec()),
                Object::Real(size),
            ],
        ));
        self.current.push(Operation::new(
            "Td",
            vec![Object::Real(x), Object::Real(self.y)],
        ));
        self.current
            .push(Operation::new("Tj", vec![Object::string_literal(text)]));
        self.current.push(Operation::new("ET", vec![]));
    }

    /// Writes one line at the left margin and advances the cursor
    fn line(&mut self, font: Font, size: f32, text: &str) {
        self.ensure_space(1);
        self.text_at(MARGIN, font, size, text);
        self.y -= LINE_HEIGHT;
    }

    /// Writes one horizontally centered line
    fn centered_line(&mut self, font: Font, size: f32, text: &str) {
        self.ensure_space(1);
        let width = text.chars().count() as f32 * size * font.avg_width_factor();
        let x = ((PAGE_WIDTH - width) / 2.0).max(MARGIN);
        self.text_at(x, font, size, text);
        self.y -= LINE_HEIGHT;
    }

    /// Writes a `Label: value` line, wrapping the value if needed
    fn labeled(&mut self, label: &str, value: &str) {
        let text = format!("{}: {}", label, value);
        for wrapped in wrap_text(&text, BODY_CHARS) {
            self.line(Font::Regular, BODY_SIZE, &wrapped);
        }
    }

    /// Advances the cursor by a fraction of a line
    fn blank(&mut self, lines: f32) {
        self.y -= LINE_HEIGHT * lines;
        if self.y < MARGIN {
            self.break_page();
        }
    }

    fn table_header(&mut self) {
        self.ensure_space(2);
        self.text_at(MARGIN + COL_SECTION_X, Font::Bold, BODY_SIZE, "Section");
        self.text_at(MARGIN + COL_TITLE_X, Font::Bold, BODY_SIZE, "Title");
        self.text_at(MARGIN + COL_DESC_X, Font::Bold, BODY_SIZE, "Description");
        self.y -= LINE_HEIGHT;
    }

    /// Writes one table row. Rows never split across pages: if the row does
    /// not fit, it starts on a fresh page under a repeated header.
    fn table_row(&mut self, section: &str, title: &str, description: &str) {
        let section_lines = wrap_text(section, COL_SECTION_CHARS);
        let title_lines = wrap_text(title, COL_TITLE_CHARS);
        let desc_lines = wrap_text(description, COL_DESC_CHARS);

        let height = section_lines
            .len()
            .max(title_lines.len())
            .max(desc_lines.len())
            .max(1);

        if self.y - (height as f32 * LINE_HEIGHT) < MARGIN {
            self.break_page();
            self.table_header();
        }

        for i in 0..height {
            if let Some(text) = section_lines.get(i) {
                self.text_at(MARGIN + COL_SECTION_X, Font::Regular, BODY_SIZE, text);
            }
            if let Some(text) = title_lines.get(i) {
                self.text_at(MARGIN + COL_TITLE_X, Font::Regular, BODY_SIZE, text);
            }
            if let Some(text) = desc_lines.get(i) {
                self.text_at(MARGIN + COL_DESC_X, Font::Regular, BODY_SIZE, text);
            }
            self.y -= LINE_HEIGHT;
        }

        // Half-line gap between rows
        self.blank(0.5);
    }

    /// Assembles the accumulated pages into a PDF document
    fn finish(mut self) -> CoreResult<Vec<u8>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            let ops = std::mem::take(&mut self.current);
            self.pages.push(ops);
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        let page_count = self.pages.len();

        for operations in self.pages {
            let content = Content { operations };
            let encoded = content
                .encode()
                .map_err(|e| CoreError::ExportFailed(format!("Failed to encode page: {}", e)))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![
                    Object::Real(0.0),
                    Object::Real(0.0),
                    Object::Real(PAGE_WIDTH),
                    Object::Real(PAGE_HEIGHT),
                ],
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| CoreError::ExportFailed(format!("Failed to write PDF: {}", e)))?;

        Ok(buffer)
    }
}

// =============================================================================
// Tests
// =============================================================================
