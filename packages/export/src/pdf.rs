//! A4 summary report.
//!
//! Layout is computed first as a list of pages of positioned text lines,
//! then drawn with the PDF builtin Helvetica faces. Keeping the two apart
//! lets page breaking be checked without parsing PDF output.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};
use solaris_analysis_models::SummaryStats;
use solaris_variable_models::{Dataset, Variable};

use crate::ExportError;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const TABLE_VALUE_X_MM: f32 = 90.0;

/// Report title.
pub const TITLE: &str = "SOLARIS - Climate Analysis Report";

/// Closing line of every report.
pub const FOOTER: &str = "Generated by the SOLARIS platform - making invisible heat visible";

const INFO: [&str; 3] = [
    "Urban Heat Island Analysis",
    "Data processed via Google Earth Engine",
    concat!("SOLARIS platform v", env!("CARGO_PKG_VERSION")),
];

/// Font face of a text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    /// Helvetica.
    Regular,
    /// Helvetica Bold.
    Bold,
    /// Helvetica Oblique.
    Italic,
}

/// One positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Text to draw. Builtin fonts only cover Latin-1, so keep it ASCII.
    pub text: String,
    /// Font size in points.
    pub size: f32,
    /// Font face.
    pub face: Face,
    /// Distance from the left edge.
    pub x_mm: f32,
    /// Baseline distance from the bottom edge.
    pub y_mm: f32,
}

/// Positions lines top to bottom, starting a new page when the next
/// block would run into the bottom margin.
#[derive(Debug)]
struct Layout {
    pages: Vec<Vec<TextLine>>,
    y_mm: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y_mm: PAGE_HEIGHT_MM - MARGIN_MM,
        }
    }

    /// Starts a new page unless `height_mm` still fits on this one.
    fn reserve(&mut self, height_mm: f32) {
        if self.y_mm - height_mm < MARGIN_MM {
            self.pages.push(Vec::new());
            self.y_mm = PAGE_HEIGHT_MM - MARGIN_MM;
        }
    }

    fn skip(&mut self, height_mm: f32) {
        self.y_mm -= height_mm;
    }

    /// Places a line at the current position without advancing.
    fn place(&mut self, text: impl Into<String>, size: f32, face: Face, x_mm: f32) {
        if let Some(page) = self.pages.last_mut() {
            page.push(TextLine {
                text: text.into(),
                size,
                face,
                x_mm,
                y_mm: self.y_mm,
            });
        }
    }

    fn line(&mut self, text: impl Into<String>, size: f32, face: Face, advance_mm: f32) {
        self.reserve(advance_mm);
        self.place(text, size, face, MARGIN_MM);
        self.skip(advance_mm);
    }
}

/// Lays out the report for `dataset`: title, info block, one statistics
/// table per non-empty variable, then the footer.
#[must_use]
pub fn layout(dataset: &Dataset) -> Vec<Vec<TextLine>> {
    let mut layout = Layout::new();

    layout.line(TITLE, 20.0, Face::Bold, 14.0);
    for (i, text) in INFO.iter().enumerate() {
        let face = if i == 0 { Face::Bold } else { Face::Regular };
        layout.line(*text, 11.0, face, 6.0);
    }
    layout.skip(8.0);

    for (variable, stats) in solaris_analysis::summarize_dataset(dataset) {
        table(&mut layout, variable, &stats);
    }

    layout.skip(6.0);
    layout.line(FOOTER, 10.0, Face::Italic, 6.0);

    layout.pages
}

fn table(layout: &mut Layout, variable: Variable, stats: &SummaryStats) {
    const ROW_MM: f32 = 7.0;

    let rows = [
        ("Minimum", stats.min),
        ("Maximum", stats.max),
        ("Mean", stats.mean),
        ("Median", stats.median),
        ("Std. deviation", stats.std_dev),
    ];

    // Heading, column titles and rows stay together.
    #[allow(clippy::cast_precision_loss)]
    let height = 10.0 + ROW_MM * (rows.len() as f32 + 1.0) + 8.0;
    layout.reserve(height);

    let name = &solaris_variable::definition(variable).name;
    layout.line(format!("{variable} - {name}"), 14.0, Face::Bold, 10.0);

    layout.place("Metric", 11.0, Face::Bold, MARGIN_MM + 5.0);
    layout.place("Value", 11.0, Face::Bold, TABLE_VALUE_X_MM);
    layout.skip(ROW_MM);

    for (metric, value) in rows {
        layout.place(metric, 11.0, Face::Regular, MARGIN_MM + 5.0);
        layout.place(format!("{value:.2}"), 11.0, Face::Regular, TABLE_VALUE_X_MM);
        layout.skip(ROW_MM);
    }
    layout.place(
        format!("{} readings", stats.count),
        9.0,
        Face::Italic,
        MARGIN_MM + 5.0,
    );
    layout.skip(8.0);
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self, ExportError> {
        let font = |face| {
            doc.add_builtin_font(face).map_err(|e| ExportError::Pdf {
                message: e.to_string(),
            })
        };

        Ok(Self {
            regular: font(BuiltinFont::Helvetica)?,
            bold: font(BuiltinFont::HelveticaBold)?,
            italic: font(BuiltinFont::HelveticaOblique)?,
        })
    }

    const fn get(&self, face: Face) -> &IndirectFontRef {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
            Face::Italic => &self.italic,
        }
    }
}

/// Renders the report as PDF bytes.
///
/// # Errors
///
/// Returns [`ExportError::Pdf`] if a font cannot be registered or the
/// document cannot be serialized.
pub fn to_pdf(dataset: &Dataset) -> Result<Vec<u8>, ExportError> {
    let pages = layout(dataset);

    let (doc, first_page, first_layer) = PdfDocument::new(
        TITLE,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let fonts = Fonts::load(&doc)?;

    for (i, lines) in pages.iter().enumerate() {
        let (page, layer) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1")
        };
        let layer = doc.get_page(page).get_layer(layer);

        for line in lines {
            layer.use_text(
                line.text.as_str(),
                line.size,
                Mm(line.x_mm),
                Mm(line.y_mm),
                fonts.get(line.face),
            );
        }
    }

    log::debug!("PDF report laid out on {} pages", pages.len());

    doc.save_to_bytes().map_err(|e| ExportError::Pdf {
        message: e.to_string(),
    })
}
