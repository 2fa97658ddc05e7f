//! Invoice rendering: computed layout in, PDF bytes out.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::document::PdfDocument;
use crate::graphics::Color;
use crate::images::{self, ImageData};
use crate::invoice::Invoice;
use crate::layout::{self, RuleLine, TextLine, PAGE_HEIGHT, PAGE_WIDTH};

/// Renders invoices to single-page PDF documents.
///
/// Rendering is deterministic: the same invoice yields the same bytes on
/// every call. The optional logo is probed at render time and is strictly
/// best-effort; a missing or unparseable file downgrades the render to the
/// no-logo layout with a warning, never an error.
pub struct InvoiceRenderer {
    logo_path: Option<PathBuf>,
    compress: bool,
}

impl Default for InvoiceRenderer {
    fn default() -> Self {
        InvoiceRenderer { logo_path: None, compress: true }
    }
}

impl InvoiceRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to draw the image at `path` in the header of every render.
    pub fn with_logo(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo_path = Some(path.into());
        self
    }

    /// Toggle FlateDecode content compression (on by default).
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    fn load_logo(&self) -> Option<ImageData> {
        let path = self.logo_path.as_deref()?;
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("logo {} unreadable, rendering without it: {}", path.display(), err);
                return None;
            }
        };
        match images::load_image(bytes) {
            Ok(data) => Some(data),
            Err(err) => {
                log::warn!("logo {} unusable, rendering without it: {}", path.display(), err);
                None
            }
        }
    }

    /// Render `invoice` into `sink` and return the vertical extent the
    /// content consumed, measured down from the top of the page.
    ///
    /// The sink is flushed before returning, so an `Ok` means the complete
    /// document reached the underlying writer.
    pub fn render<W: Write>(&self, invoice: &Invoice, sink: W) -> io::Result<f64> {
        let logo = self.load_logo();
        let layout = layout::layout_invoice(invoice, logo.is_some());

        let mut doc = PdfDocument::new(sink)?;
        doc.set_compression(self.compress);
        doc.set_info("Title", &format!("Invoice {}", invoice.invoice_number));
        doc.set_info("Producer", "invoice-core");
        doc.begin_page(PAGE_WIDTH, PAGE_HEIGHT)?;

        if let (Some(data), Some(region)) = (logo, layout.logo.as_ref()) {
            let id = doc.add_image(data);
            doc.place_image(id, region);
        }
        for rule in &layout.rules {
            draw_rule(&mut doc, rule);
        }
        for text in &layout.texts {
            draw_text(&mut doc, text);
        }

        let mut sink = doc.end_document()?;
        sink.flush()?;
        Ok(layout.metrics.extent)
    }

    /// Render to a file, creating or truncating it.
    pub fn render_to_file<P: AsRef<Path>>(&self, invoice: &Invoice, path: P) -> io::Result<f64> {
        let file = File::create(path)?;
        self.render(invoice, BufWriter::new(file))
    }
}

/// Convert a top-down layout baseline to PDF's bottom-up coordinates.
fn draw_text<W: Write>(doc: &mut PdfDocument<W>, line: &TextLine) {
    doc.place_text_styled(&line.text, line.x, PAGE_HEIGHT - line.y, &line.style);
}

fn draw_rule<W: Write>(doc: &mut PdfDocument<W>, rule: &RuleLine) {
    let y = PAGE_HEIGHT - rule.y;
    doc.save_state()
        .set_stroke_color(Color::gray(0.6))
        .set_line_width(1.0)
        .move_to(rule.x1, y)
        .line_to(rule.x2, y)
        .stroke()
        .restore_state();
}
