//! Output-PDF construction via printpdf.
//!
//! Three document shapes cover every converter that targets PDF:
//!
//! * [`image_document`] — one A4 portrait page with the image anchored at
//!   the top margin, scaled to a fixed width, height proportional.
//! * [`text_document`] — a block tree flowed onto A4 portrait pages with
//!   word wrapping and page breaks.
//! * [`table_document`] — a sheet table on A4 landscape pages, columns
//!   padded to equal widths.
//!
//! Default geometry: A4 pages, 10 mm margins, 190 mm embedded-image width,
//! landscape for spreadsheets.

use crate::config::ConvertConfig;
use crate::error::ConvertError;
use crate::pipeline::sheet::SheetTable;
use crate::pipeline::wordproc::Block;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use tracing::debug;

const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;

/// Points → millimetres.
const PT_TO_MM: f32 = 0.352_778;

/// Rough advance width of a Helvetica glyph as a fraction of the font size.
/// Good enough for wrapping; the conversion does not promise typographic
/// fidelity.
const GLYPH_WIDTH_RATIO: f32 = 0.5;

fn render_err(e: impl std::fmt::Display) -> ConvertError {
    ConvertError::RenderFailed {
        detail: e.to_string(),
    }
}

fn encode_err(e: impl std::fmt::Display) -> ConvertError {
    ConvertError::EncodeFailed {
        detail: e.to_string(),
    }
}

// ── Image page ───────────────────────────────────────────────────────────

/// Embed a raster image into a single-page portrait document.
///
/// The image is decoded, placed `margin_mm` from the top-left corner, scaled
/// to `image_width_mm` wide with proportional height (shrunk further only if
/// it would run off the bottom of the page).
pub fn image_document(
    image_bytes: &[u8],
    config: &ConvertConfig,
    title: &str,
) -> Result<Vec<u8>, ConvertError> {
    let decoded = printpdf::image_crate::load_from_memory(image_bytes).map_err(|e| {
        ConvertError::DecodeFailed {
            format: crate::format::SourceFormat::Image,
            detail: e.to_string(),
        }
    })?;

    let (doc, page, layer) = PdfDocument::new(title, Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), "Layer 1");
    let layer = doc.get_page(page).get_layer(layer);

    let image = Image::from_dynamic_image(&decoded);
    let px_w = image.image.width.0 as f32;
    let px_h = image.image.height.0 as f32;

    // Native size at the baseline DPI, then scale to the configured width.
    let base_dpi = 96.0;
    let native_w_mm = px_w * 25.4 / base_dpi;
    let native_h_mm = px_h * 25.4 / base_dpi;

    let mut scale = config.image_width_mm / native_w_mm;
    let max_h_mm = A4_HEIGHT_MM - 2.0 * config.margin_mm;
    if native_h_mm * scale > max_h_mm {
        scale = max_h_mm / native_h_mm;
    }
    let display_h_mm = native_h_mm * scale;

    debug!(
        "Embedding {}x{} px image at scale {:.3} → {:.1}x{:.1} mm",
        px_w,
        px_h,
        scale,
        native_w_mm * scale,
        display_h_mm
    );

    image.add_to_layer(
        layer,
        ImageTransform {
            translate_x: Some(Mm(config.margin_mm)),
            // printpdf's origin is bottom-left; anchor the image's top edge
            // one margin below the top of the page.
            translate_y: Some(Mm(A4_HEIGHT_MM - config.margin_mm - display_h_mm)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(base_dpi),
            ..Default::default()
        },
    );

    doc.save_to_bytes().map_err(encode_err)
}

// ── Flowed text pages ────────────────────────────────────────────────────

/// Cursor that flows lines of text down a page and breaks to a new page
/// when the bottom margin is reached.
struct PageCursor {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    layer: PdfLayerReference,
    page_w: f32,
    page_h: f32,
    margin: f32,
    y: f32,
}

impl PageCursor {
    fn new(title: &str, landscape: bool, margin: f32) -> Result<Self, ConvertError> {
        let (page_w, page_h) = if landscape {
            (A4_HEIGHT_MM, A4_WIDTH_MM)
        } else {
            (A4_WIDTH_MM, A4_HEIGHT_MM)
        };
        let (doc, page, layer) = PdfDocument::new(title, Mm(page_w), Mm(page_h), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(render_err)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            font,
            layer,
            page_w,
            page_h,
            margin,
            y: page_h - margin,
        })
    }

    /// Characters that fit on one line at `font_size`.
    fn line_capacity(&self, font_size: f32) -> usize {
        let usable_mm = self.page_w - 2.0 * self.margin;
        let char_mm = font_size * GLYPH_WIDTH_RATIO * PT_TO_MM;
        ((usable_mm / char_mm) as usize).max(8)
    }

    fn write_line(&mut self, text: &str, font_size: f32) {
        let line_h = font_size * 1.4 * PT_TO_MM;
        if self.y - line_h < self.margin {
            let (page, layer) =
                self.doc
                    .add_page(Mm(self.page_w), Mm(self.page_h), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = self.page_h - self.margin;
        }
        self.y -= line_h;
        if !text.is_empty() {
            self.layer
                .use_text(text, font_size, Mm(self.margin), Mm(self.y), &self.font);
        }
    }

    fn write_wrapped(&mut self, text: &str, font_size: f32) {
        for line in wrap_text(text, self.line_capacity(font_size)) {
            self.write_line(&line, font_size);
        }
    }

    fn blank_line(&mut self, font_size: f32) {
        self.write_line("", font_size);
    }

    fn finish(self) -> Result<Vec<u8>, ConvertError> {
        self.doc.save_to_bytes().map_err(encode_err)
    }
}

/// Flow a DOCX block tree onto portrait pages.
pub fn text_document(
    blocks: &[Block],
    config: &ConvertConfig,
    title: &str,
) -> Result<Vec<u8>, ConvertError> {
    let mut cursor = PageCursor::new(title, false, config.margin_mm)?;
    let body = config.font_size;

    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                // Scale heading sizes down from h1; h4+ render at body size.
                let size = match level {
                    1 => body * 1.6,
                    2 => body * 1.35,
                    3 => body * 1.15,
                    _ => body,
                };
                cursor.blank_line(body);
                cursor.write_wrapped(text, size);
            }
            Block::Paragraph(text) => {
                cursor.write_wrapped(text, body);
                cursor.blank_line(body * 0.5);
            }
            Block::Table(rows) => {
                for line in layout_table_rows(rows, cursor.line_capacity(body)) {
                    cursor.write_line(&line, body);
                }
                cursor.blank_line(body * 0.5);
            }
        }
    }

    debug!("Flowed {} blocks into text document", blocks.len());
    cursor.finish()
}

/// Render a spreadsheet table onto (by default landscape) pages.
pub fn table_document(
    table: &SheetTable,
    config: &ConvertConfig,
    title: &str,
) -> Result<Vec<u8>, ConvertError> {
    let mut cursor = PageCursor::new(title, config.sheet_landscape, config.margin_mm)?;
    let body = config.font_size;

    cursor.write_wrapped(&table.sheet_name, body * 1.35);
    cursor.blank_line(body);

    for line in layout_table_rows(&table.rows, cursor.line_capacity(body)) {
        cursor.write_line(&line, body);
    }

    cursor.finish()
}

// ── Pure helpers ─────────────────────────────────────────────────────────

/// Greedy word wrap to at most `max_chars` per line.
///
/// Words longer than a line are hard-split rather than overflowing.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw_line in text.split('\n') {
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            let mut word = word;
            // Hard-split oversized words.
            while word.chars().count() > max_chars {
                let split_at = word
                    .char_indices()
                    .nth(max_chars)
                    .map(|(i, _)| i)
                    .unwrap_or(word.len());
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                lines.push(word[..split_at].to_string());
                word = &word[split_at..];
            }
            let needed = word.chars().count() + if current.is_empty() { 0 } else { 1 };
            if current.chars().count() + needed > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Render table rows as fixed-width text lines: columns padded to an equal
/// share of the line, cells truncated with an ellipsis when they don't fit.
pub(crate) fn layout_table_rows(rows: &[Vec<String>], line_capacity: usize) -> Vec<String> {
    let ncols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    if ncols == 0 {
        return Vec::new();
    }
    // Two characters of gutter between columns.
    let col_width = ((line_capacity.saturating_sub(2 * (ncols - 1))) / ncols).max(3);

    rows.iter()
        .map(|row| {
            let mut line = String::new();
            for i in 0..ncols {
                if i > 0 {
                    line.push_str("  ");
                }
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                line.push_str(&fit_cell(cell, col_width));
            }
            line.trim_end().to_string()
        })
        .collect()
}

fn fit_cell(cell: &str, width: usize) -> String {
    let count = cell.chars().count();
    if count <= width {
        let mut s = cell.to_string();
        s.extend(std::iter::repeat(' ').take(width - count));
        s
    } else {
        let truncated: String = cell.chars().take(width.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_max_chars() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10), "{lines:?}");
        assert_eq!(lines.join(" "), "the quick brown fox jumps over the lazy dog");
    }

    #[test]
    fn wrap_hard_splits_long_words() {
        let lines = wrap_text("supercalifragilistic", 8);
        assert!(lines.len() >= 2);
        assert!(lines.iter().all(|l| l.chars().count() <= 8));
        assert_eq!(lines.concat(), "supercalifragilistic");
    }

    #[test]
    fn wrap_preserves_explicit_newlines() {
        let lines = wrap_text("one\ntwo", 20);
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn wrap_empty_gives_single_blank_line() {
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }

    #[test]
    fn table_rows_padded_and_truncated() {
        let rows = vec![
            vec!["name".to_string(), "value".to_string()],
            vec!["a-very-long-cell-content".to_string(), "x".to_string()],
        ];
        let lines = layout_table_rows(&rows, 20);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains('…'), "long cell truncated: {:?}", lines[1]);
        assert!(lines.iter().all(|l| l.chars().count() <= 20));
    }

    #[test]
    fn ragged_rows_are_squared_off() {
        let rows = vec![
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec!["d".to_string()],
        ];
        let lines = layout_table_rows(&rows, 30);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn empty_table_renders_nothing() {
        assert!(layout_table_rows(&[], 40).is_empty());
    }

    #[test]
    fn text_document_produces_pdf_bytes() {
        let blocks = vec![
            Block::Heading {
                level: 1,
                text: "Title".into(),
            },
            Block::Paragraph("Some body text that should wrap onto the page.".into()),
        ];
        let bytes = text_document(&blocks, &ConvertConfig::default(), "t").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_document_spans_multiple_pages() {
        let blocks: Vec<Block> = (0..400)
            .map(|i| Block::Paragraph(format!("paragraph number {i}")))
            .collect();
        let bytes = text_document(&blocks, &ConvertConfig::default(), "t").unwrap();
        // Count page objects in the raw PDF; 400 paragraphs cannot fit on one.
        let haystack = String::from_utf8_lossy(&bytes);
        assert!(bytes.starts_with(b"%PDF"));
        assert!(haystack.contains("/Type /Pages") || haystack.contains("/Type/Pages"));
    }

    #[test]
    fn table_document_produces_pdf_bytes() {
        let table = SheetTable {
            sheet_name: "Sheet1".into(),
            rows: vec![
                vec!["h1".into(), "h2".into()],
                vec!["1".into(), "2".into()],
            ],
        };
        let bytes = table_document(&table, &ConvertConfig::default(), "t").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn image_document_embeds_png() {
        use image::{Rgba, RgbaImage};
        use std::io::Cursor;

        let img = RgbaImage::from_pixel(12, 24, Rgba([200, 10, 10, 255]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let bytes = image_document(&png, &ConvertConfig::default(), "photo").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn image_document_rejects_non_image_bytes() {
        let err = image_document(b"not an image", &ConvertConfig::default(), "t").unwrap_err();
        assert!(matches!(err, ConvertError::DecodeFailed { .. }));
    }
}
