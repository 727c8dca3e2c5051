//! Page layout for the diagnosis report, independent of the PDF backend.
//!
//! Coordinates are millimetres with the origin at the bottom-left corner of
//! an A4 portrait page. The cursor moves down the page and a new page is
//! started whenever the next line would cross the bottom margin.

use chrono::{DateTime, Utc};
use shared::{AnalysisReport, Severity};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 20.0;
const FOOTER_Y_MM: f32 = 10.0;

const TITLE_PT: f32 = 18.0;
const HEADING_PT: f32 = 13.0;
const BODY_PT: f32 = 10.5;
const SMALL_PT: f32 = 8.5;

const PT_TO_MM: f32 = 0.3528;
const LINE_SPACING: f32 = 1.45;
// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;

pub const REPORT_TITLE: &str = "XpeditionR Maize Health Report";
const EMPTY_LIST: &str = "None identified";
const DISCLAIMER: &str = "This report was generated automatically from a single leaf photograph. \
It is guidance only and does not replace an inspection by a qualified agronomist. \
Follow the label instructions of any product you apply.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const GREY: Rgb = Rgb(0.4, 0.4, 0.4);
    pub const ACCENT: Rgb = Rgb(0.11, 0.37, 0.13);

    pub fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Critical => Rgb(0.78, 0.11, 0.11),
            Severity::Moderate => Rgb(0.85, 0.53, 0.0),
            Severity::Normal => Rgb(0.18, 0.55, 0.2),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub x_mm: f32,
    pub y_mm: f32,
    pub size_pt: f32,
    pub weight: FontWeight,
    pub color: Rgb,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPage {
    pub lines: Vec<TextLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub title: String,
    pub pages: Vec<LayoutPage>,
}

impl ReportLayout {
    pub fn build(report: &AnalysisReport) -> Self {
        let record = report.record();
        let mut cursor = Cursor::new();

        cursor.write(REPORT_TITLE, TITLE_PT, FontWeight::Bold, Rgb::ACCENT);
        cursor.write(
            &format!("Generated: {}", format_timestamp(report.generated_at_ms)),
            SMALL_PT,
            FontWeight::Regular,
            Rgb::GREY,
        );
        cursor.write(
            &format!("Report ID: {}", report.id),
            SMALL_PT,
            FontWeight::Regular,
            Rgb::GREY,
        );

        cursor.heading("Farmer Details");
        let contact = &report.contact;
        cursor.field("Name", &contact.name);
        cursor.field("Location", &contact.location);
        cursor.field("Phone", &contact.phone);
        cursor.field("Email", contact.email.as_deref().unwrap_or("Not provided"));

        cursor.heading("Diagnosis");
        cursor.field("Condition", record.name);
        cursor.field("Category", &record.category.to_string());
        cursor.write(
            &format!("Status: {}", status_label(record.severity)),
            BODY_PT,
            FontWeight::Bold,
            Rgb::for_severity(record.severity),
        );
        cursor.field("Confidence", &report.confidence.to_string());
        cursor.field(
            "Affected area",
            &format!("{}%", record.affected_area_percent),
        );
        cursor.field("Model label", &report.top_label);
        cursor.field("Image SHA-256", &report.image_digest);

        cursor.heading("Possible Causes");
        cursor.bullets(record.causes);

        cursor.heading("Prevention");
        cursor.bullets(record.prevention);

        cursor.heading("Recommended Treatment");
        let treatment = &record.treatment;
        cursor.field("Medicine", treatment.medicine);
        cursor.field("Dosage", treatment.dosage);
        cursor.field("Frequency", treatment.frequency);
        cursor.field("Instructions", treatment.instructions);

        cursor.gap(4.0);
        cursor.write(DISCLAIMER, SMALL_PT, FontWeight::Regular, Rgb::GREY);

        Self {
            title: format!("{} {}", REPORT_TITLE, report.id),
            pages: cursor.finish(),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.pages.iter().flat_map(|page| page.lines.iter())
    }
}

pub fn status_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Critical",
        Severity::Moderate => "Moderate",
        Severity::Normal => "Normal",
    }
}

fn format_timestamp(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn line_height_mm(size_pt: f32) -> f32 {
    size_pt * PT_TO_MM * LINE_SPACING
}

// Built-in fonts only cover WinAnsi; keep to printable ASCII.
pub fn printable_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '°' => out.push_str(" deg"),
            '–' | '—' | '•' => out.push('-'),
            '‘' | '’' => out.push('\''),
            '“' | '”' => out.push('"'),
            c if c.is_ascii_graphic() || c == ' ' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Greedy word wrap against an estimated glyph width. Words longer than a
/// line are split.
pub fn wrap_text(text: &str, size_pt: f32, width_mm: f32) -> Vec<String> {
    let max_chars = ((width_mm / (size_pt * PT_TO_MM * AVG_GLYPH_EM)) as usize).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

struct Cursor {
    pages: Vec<LayoutPage>,
    y_mm: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![LayoutPage::default()],
            y_mm: PAGE_HEIGHT_MM - MARGIN_MM,
        }
    }

    fn write(&mut self, text: &str, size_pt: f32, weight: FontWeight, color: Rgb) {
        self.write_indented(text, 0.0, size_pt, weight, color);
    }

    fn write_indented(
        &mut self,
        text: &str,
        indent_mm: f32,
        size_pt: f32,
        weight: FontWeight,
        color: Rgb,
    ) {
        let width = PAGE_WIDTH_MM - 2.0 * MARGIN_MM - indent_mm;
        let height = line_height_mm(size_pt);
        for line in wrap_text(&printable_text(text), size_pt, width) {
            if self.y_mm - height < MARGIN_MM {
                self.new_page();
            }
            self.y_mm -= height;
            let page = self.pages.len() - 1;
            self.pages[page].lines.push(TextLine {
                text: line,
                x_mm: MARGIN_MM + indent_mm,
                y_mm: self.y_mm,
                size_pt,
                weight,
                color,
            });
        }
    }

    /// A heading never ends a page: it moves down with its first body line.
    fn heading(&mut self, text: &str) {
        self.gap(3.0);
        if self.y_mm - line_height_mm(HEADING_PT) - line_height_mm(BODY_PT) < MARGIN_MM {
            self.new_page();
        }
        self.write(text, HEADING_PT, FontWeight::Bold, Rgb::ACCENT);
    }

    fn field(&mut self, label: &str, value: &str) {
        self.write(
            &format!("{}: {}", label, value),
            BODY_PT,
            FontWeight::Regular,
            Rgb::BLACK,
        );
    }

    fn bullets(&mut self, items: &[&str]) {
        if items.is_empty() {
            self.write_indented(EMPTY_LIST, 4.0, BODY_PT, FontWeight::Regular, Rgb::GREY);
            return;
        }
        for item in items {
            self.write_indented(
                &format!("- {}", item),
                4.0,
                BODY_PT,
                FontWeight::Regular,
                Rgb::BLACK,
            );
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y_mm -= mm;
        if self.y_mm < MARGIN_MM {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        self.pages.push(LayoutPage::default());
        self.y_mm = PAGE_HEIGHT_MM - MARGIN_MM;
    }

    /// Appends "Page i of n" to every page.
    fn finish(mut self) -> Vec<LayoutPage> {
        let total = self.pages.len();
        for (index, page) in self.pages.iter_mut().enumerate() {
            page.lines.push(TextLine {
                text: format!("Page {} of {}", index + 1, total),
                x_mm: PAGE_WIDTH_MM - MARGIN_MM - 20.0,
                y_mm: FOOTER_Y_MM,
                size_pt: SMALL_PT,
                weight: FontWeight::Regular,
                color: Rgb::GREY,
            });
        }
        self.pages
    }
}
