//! Paints a [`ReportLayout`] onto A4 pages with printpdf's built-in Helvetica.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rect, Rgb,
};

use super::layout::{Align, Block, FontStyle, ReportLayout, Table, TableStyle, BLACK};
use super::ReportError;

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 20.0;
/// One typographic point in mm.
const PT: f32 = 25.4 / 72.0;
/// Cell padding [pt]
const PAD_X: f32 = 6.0;
const PAD_Y: f32 = 3.0;
const LEADING: f32 = 1.2;

/// PDF bytes plus the number of pages they span.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub pages: usize,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Header,
    Body,
    Total,
}

struct Painter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: Fonts,
    /// Current baseline cursor, measured from the page bottom [mm]
    y: f32,
    pages: usize,
}

/// Renders the layout to PDF bytes.
pub fn render_pdf(layout: &ReportLayout) -> Result<RenderedReport, ReportError> {
    let mut painter = Painter::new(&pdf_text(&layout.title))?;
    for block in &layout.blocks {
        painter.block(block);
    }
    painter.finish()
}

impl Painter {
    fn new(title: &str) -> Result<Self, ReportError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let fonts = Fonts {
            regular: add_font(&doc, BuiltinFont::Helvetica)?,
            bold: add_font(&doc, BuiltinFont::HelveticaBold)?,
            italic: add_font(&doc, BuiltinFont::HelveticaOblique)?,
        };
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            fonts,
            y: PAGE_H - MARGIN,
            pages: 1,
        })
    }

    fn finish(self) -> Result<RenderedReport, ReportError> {
        let pages = self.pages;
        let bytes = self
            .doc
            .save_to_bytes()
            .map_err(|e| ReportError::Pdf(e.to_string()))?;
        tracing::debug!(pages, bytes = bytes.len(), "pdf rendered");
        Ok(RenderedReport { bytes, pages })
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_H - MARGIN;
        self.pages += 1;
    }

    /// Starts a new page when `height` [mm] does not fit above the bottom margin.
    fn ensure(&mut self, height: f32) -> bool {
        if self.y - height < MARGIN {
            self.new_page();
            true
        } else {
            false
        }
    }

    fn font(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.fonts.regular,
            FontStyle::Bold => &self.fonts.bold,
            FontStyle::Italic => &self.fonts.italic,
        }
    }

    fn text(&self, text: &str, size: f32, style: FontStyle, color: [u8; 3], x: f32, baseline: f32) {
        self.layer.set_fill_color(rgb(color));
        self.layer
            .use_text(pdf_text(text), size, Mm(x), Mm(baseline), self.font(style));
    }

    /// Writes wrapped lines of text starting at the cursor.
    fn lines(&mut self, text: &str, size: f32, style: FontStyle, color: [u8; 3], align: Align) {
        let line_h = size * LEADING * PT;
        for line in wrap(text, size, PAGE_W - 2.0 * MARGIN) {
            self.ensure(line_h);
            self.y -= line_h;
            let x = match align {
                Align::Left => MARGIN,
                Align::Center => (PAGE_W - text_width(&line, size)) / 2.0,
                Align::Right => PAGE_W - MARGIN - text_width(&line, size),
            };
            self.text(&line, size, style, color, x, self.y + 0.2 * size * PT);
        }
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Title {
                text,
                size,
                color,
                space_after,
            } => {
                self.lines(text, *size, FontStyle::Bold, *color, Align::Center);
                self.y -= space_after * PT;
            }
            Block::Heading {
                text,
                size,
                color,
                space_after,
            } => {
                // keep a heading together with at least its table header
                self.ensure(size * LEADING * PT + 20.0);
                self.lines(text, *size, FontStyle::Bold, *color, Align::Left);
                self.y -= space_after * PT;
            }
            Block::Paragraph { text, size, style } => {
                self.lines(text, *size, *style, BLACK, Align::Left);
            }
            Block::Spacer(cm) => {
                if !self.ensure(cm * 10.0) {
                    self.y -= cm * 10.0;
                }
            }
            Block::Table(table) => self.table(table),
        }
    }

    fn table(&mut self, table: &Table) {
        let widths: Vec<f32> = table.column_widths_cm.iter().map(|w| w * 10.0).collect();
        let x0 = (PAGE_W - widths.iter().sum::<f32>()) / 2.0;
        let header_h = header_height(&table.style);
        let body_h = body_height(&table.style);

        self.ensure(header_h + body_h);
        self.row(x0, &widths, &table.header, &table.style, RowKind::Header);
        let last = table.rows.len().saturating_sub(1);
        for (i, cells) in table.rows.iter().enumerate() {
            if self.ensure(body_h) {
                self.row(x0, &widths, &table.header, &table.style, RowKind::Header);
            }
            let kind = if i == last && table.style.total_row.is_some() {
                RowKind::Total
            } else {
                RowKind::Body
            };
            self.row(x0, &widths, cells, &table.style, kind);
        }
    }

    fn row(&mut self, x0: f32, widths: &[f32], cells: &[String], style: &TableStyle, kind: RowKind) {
        let (height, size, fill, color, font) = match kind {
            RowKind::Header => (
                header_height(style),
                style.header_font_size,
                style.header_fill,
                style.header_text,
                FontStyle::Bold,
            ),
            RowKind::Body => (
                body_height(style),
                style.body_font_size,
                style.body_fill,
                BLACK,
                FontStyle::Regular,
            ),
            RowKind::Total => {
                let total = style.total_row.unwrap_or(super::layout::TotalRowStyle {
                    fill: style.body_fill,
                    text: BLACK,
                });
                (
                    body_height(style),
                    style.body_font_size,
                    total.fill,
                    total.text,
                    FontStyle::Bold,
                )
            }
        };
        let bottom = self.y - height;
        let bottom_pad = if kind == RowKind::Header {
            style.header_bottom_padding
        } else {
            PAD_Y
        };
        let baseline = bottom + (bottom_pad + 0.2 * size) * PT;

        let mut x = x0;
        for (col, width) in widths.iter().enumerate() {
            self.layer.set_fill_color(rgb(fill));
            self.layer
                .add_rect(Rect::new(Mm(x), Mm(bottom), Mm(x + width), Mm(self.y)));

            if let Some(cell) = cells.get(col) {
                let tx = match style.align(col) {
                    Align::Right => x + width - PAD_X * PT - text_width(cell, size),
                    Align::Center => x + (width - text_width(cell, size)) / 2.0,
                    Align::Left => x + PAD_X * PT,
                };
                self.text(cell, size, font, color, tx, baseline);
            }

            self.layer.set_outline_color(rgb(style.grid_color));
            self.layer.set_outline_thickness(style.grid_width);
            self.layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(x), Mm(bottom)), false),
                    (Point::new(Mm(x + width), Mm(bottom)), false),
                    (Point::new(Mm(x + width), Mm(self.y)), false),
                    (Point::new(Mm(x), Mm(self.y)), false),
                ],
                is_closed: true,
            });
            x += width;
        }
        self.y = bottom;
    }
}

fn add_font(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef, ReportError> {
    doc.add_builtin_font(font)
        .map_err(|e| ReportError::Pdf(e.to_string()))
}

fn rgb(c: [u8; 3]) -> Color {
    Color::Rgb(Rgb::new(
        c[0] as f32 / 255.0,
        c[1] as f32 / 255.0,
        c[2] as f32 / 255.0,
        None,
    ))
}

fn header_height(style: &TableStyle) -> f32 {
    (style.header_font_size * LEADING + PAD_Y + style.header_bottom_padding) * PT
}

fn body_height(style: &TableStyle) -> f32 {
    (style.body_font_size * LEADING + 2.0 * PAD_Y) * PT
}

/// Maps text onto what the built-in (WinAnsi) fonts can show.
pub fn pdf_text(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '₂' => Some('2'),
            '–' | '—' => Some('-'),
            c if (c as u32) < 0x100 => Some(c),
            _ => None,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Approximate advance width of Helvetica glyphs, in 1/1000 em.
fn glyph_width(c: char) -> u32 {
    match c {
        '0'..='9' => 556,
        ' ' | '.' | ',' | ':' | ';' | '!' | 'I' | 'i' | 'j' | 'l' => 278,
        'f' | 't' | '(' | ')' | '-' | 'r' => 333,
        '%' => 889,
        'm' | 'M' => 833,
        'w' => 722,
        'W' => 944,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' | 'J' => 500,
        'a'..='z' => 556,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' => 722,
        'G' | 'O' | 'Q' => 778,
        'F' | 'T' | 'Z' => 611,
        'A'..='Z' => 667,
        _ => 556,
    }
}

/// Width of `text` at `size` points, in mm.
pub fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = pdf_text(text).chars().map(glyph_width).sum();
    units as f32 / 1000.0 * size * PT
}

/// Greedy word wrap to `max_width` mm.
fn wrap(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if !current.is_empty() && text_width(&candidate, size) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
