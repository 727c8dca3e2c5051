use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument};

use super::ReportError;
use super::layout::{FontWeight, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, ReportLayout};

const LAYER: &str = "Layer 1";

/// Draws every laid-out line with the built-in Helvetica faces. Text is
/// expected to be printable ASCII already.
pub fn render_pdf(layout: &ReportLayout) -> Result<Vec<u8>, ReportError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(&layout.title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER);

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::generation(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::generation(e.to_string()))?;

    for (index, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER)
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for line in &page.lines {
            let font: &IndirectFontRef = match line.weight {
                FontWeight::Regular => &regular,
                FontWeight::Bold => &bold,
            };
            layer.set_fill_color(Color::Rgb(printpdf::Rgb::new(
                line.color.0,
                line.color.1,
                line.color.2,
                None,
            )));
            layer.use_text(
                &line.text,
                line.size_pt,
                Mm(line.x_mm),
                Mm(line.y_mm),
                font,
            );
        }
    }

    doc.save_to_bytes()
        .map_err(|e| ReportError::generation(e.to_string()))
}
