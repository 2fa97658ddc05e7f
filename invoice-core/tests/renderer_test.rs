use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use chrono::{TimeZone, Utc};
use invoice_core::{ClientInfo, CompanyInfo, DraftItem, Invoice, InvoiceDraft, InvoiceRenderer};
use sha2::{Digest, Sha256};

fn sample_invoice() -> Invoice {
    let draft = InvoiceDraft {
        client: ClientInfo {
            name: "Acme Corp".to_string(),
            email: "billing@acme.example".to_string(),
            address: Some("42 Galaxy Way, Austin, TX".to_string()),
            phone: None,
        },
        company: CompanyInfo::default(),
        items: vec![DraftItem::new("Design work", 2.0, 50.0)],
        tax: 0.0,
        due_date: None,
    };
    let now = Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap();
    Invoice::from_draft(draft, now).unwrap()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn small_png() -> Vec<u8> {
    let mut encoded = Vec::new();
    {
        let mut enc = png::Encoder::new(&mut encoded, 4, 2);
        enc.set_color(png::ColorType::Rgb);
        enc.set_depth(png::BitDepth::Eight);
        let mut writer = enc.write_header().unwrap();
        writer.write_image_data(&[128u8; 24]).unwrap();
    }
    encoded
}

#[test]
fn renders_complete_pdf_and_reports_extent() {
    let mut bytes = Vec::new();
    let extent = InvoiceRenderer::new()
        .render(&sample_invoice(), &mut bytes)
        .unwrap();

    assert!(bytes.starts_with(b"%PDF-1.7"));
    assert!(bytes.ends_with(b"%%EOF\n"));
    // Footer baseline of the reference invoice.
    assert_eq!(extent, 330.0);
}

#[test]
fn repeated_renders_are_byte_identical() {
    let invoice = sample_invoice();

    let mut first = Vec::new();
    InvoiceRenderer::new().render(&invoice, &mut first).unwrap();
    let mut second = Vec::new();
    InvoiceRenderer::new().render(&invoice, &mut second).unwrap();

    assert_eq!(Sha256::digest(&first), Sha256::digest(&second));
    assert_eq!(first, second);
}

#[test]
fn uncompressed_content_carries_every_block() {
    let mut bytes = Vec::new();
    InvoiceRenderer::new()
        .with_compression(false)
        .render(&sample_invoice(), &mut bytes)
        .unwrap();
    let out = String::from_utf8_lossy(&bytes);

    // Header, title, client, table, totals, footer.
    assert!(out.contains("(Your Company Name) Tj"));
    assert!(out.contains("/F2 20 Tf"));
    assert!(out.contains("(INVOICE) Tj"));
    assert!(out.contains("(Invoice #:) Tj"));
    assert!(out.contains("(8/25/2026) Tj"));
    assert!(out.contains("(Bill To:) Tj"));
    assert!(out.contains("(Acme Corp) Tj"));
    assert!(out.contains("(Description) Tj"));
    assert!(out.contains("(Design work) Tj"));
    assert!(out.contains("(2) Tj"));
    assert!(out.contains("(100.00) Tj"));
    assert!(out.contains("(Subtotal:) Tj"));
    assert!(out.contains("(Total:) Tj"));
    assert!(out.contains("(Thank you for your business!) Tj"));

    // Rules stroke in gray: table rule at layout 240 -> PDF y 552.
    assert!(out.contains("0.6 0.6 0.6 RG"));
    assert!(out.contains("50 552 m"));
    assert!(out.contains("562 552 l"));

    // Deterministic document info only.
    assert!(out.contains("(invoice-core)"));
    assert!(out.contains("/Title (Invoice INV-"));
    assert!(!out.contains("/CreationDate"));
}

#[test]
fn tax_line_rendered_only_when_taxed() {
    let untaxed = sample_invoice();
    let mut taxed = sample_invoice();
    taxed.tax = 8.25;
    taxed.total = taxed.subtotal + taxed.tax;

    let render = |invoice: &Invoice| {
        let mut bytes = Vec::new();
        InvoiceRenderer::new()
            .with_compression(false)
            .render(invoice, &mut bytes)
            .unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    };

    let plain = render(&untaxed);
    assert!(!plain.contains("(Tax:)"));

    let with_tax = render(&taxed);
    assert!(with_tax.contains("(Tax:) Tj"));
    assert!(with_tax.contains("(8.25) Tj"));
    assert!(with_tax.contains("(108.25) Tj"));
}

#[test]
fn accented_text_encodes_as_winansi_bytes() {
    let mut invoice = sample_invoice();
    invoice.client.name = "Café Müller".to_string();

    let mut bytes = Vec::new();
    InvoiceRenderer::new()
        .with_compression(false)
        .render(&invoice, &mut bytes)
        .unwrap();

    assert!(contains(&bytes, b"(Caf\xe9 M\xfcller) Tj"));
}

#[test]
fn logo_embeds_image_and_shifts_content_down() {
    let dir = tempfile::tempdir().unwrap();
    let logo = dir.path().join("logo.png");
    std::fs::write(&logo, small_png()).unwrap();

    let mut bytes = Vec::new();
    let extent = InvoiceRenderer::new()
        .with_logo(&logo)
        .with_compression(false)
        .render(&sample_invoice(), &mut bytes)
        .unwrap();
    let out = String::from_utf8_lossy(&bytes);

    assert!(out.contains("/Subtype /Image"));
    assert!(out.contains("/Im0 Do"));
    assert!(out.contains("/XObject"));
    // Reference extent 330 plus the 70-unit logo reservation.
    assert_eq!(extent, 400.0);
}

#[test]
fn jpeg_logo_embeds_as_dctdecode() {
    // SOI, SOF0 (8-bit, 42 high, 84 wide, 3 components), EOI.
    let mut jpeg = vec![0xFF, 0xD8];
    jpeg.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x2A, 0x00, 0x54, 0x03]);
    jpeg.extend_from_slice(&[0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);

    let dir = tempfile::tempdir().unwrap();
    let logo = dir.path().join("logo.jpg");
    std::fs::write(&logo, jpeg).unwrap();

    let mut bytes = Vec::new();
    let extent = InvoiceRenderer::new()
        .with_logo(&logo)
        .render(&sample_invoice(), &mut bytes)
        .unwrap();

    assert!(contains(&bytes, b"/DCTDecode"));
    assert_eq!(extent, 400.0);
}

/// A configured logo that cannot be read degrades to the no-logo document,
/// byte for byte, rather than failing the render.
#[test]
fn missing_logo_renders_identical_to_no_logo() {
    let invoice = sample_invoice();

    let mut plain = Vec::new();
    InvoiceRenderer::new().render(&invoice, &mut plain).unwrap();

    let mut degraded = Vec::new();
    InvoiceRenderer::new()
        .with_logo("/nonexistent/logo.png")
        .render(&invoice, &mut degraded)
        .unwrap();

    assert_eq!(plain, degraded);
}

#[test]
fn corrupt_logo_renders_identical_to_no_logo() {
    let dir = tempfile::tempdir().unwrap();
    let logo = dir.path().join("logo.png");
    std::fs::write(&logo, b"not an image at all").unwrap();

    let invoice = sample_invoice();

    let mut plain = Vec::new();
    InvoiceRenderer::new().render(&invoice, &mut plain).unwrap();

    let mut degraded = Vec::new();
    InvoiceRenderer::new()
        .with_logo(&logo)
        .render(&invoice, &mut degraded)
        .unwrap();

    assert_eq!(plain, degraded);
}

/// `Ok` from render means the bytes reached the sink: the writer must see
/// a flush before render returns.
#[test]
fn render_flushes_the_sink() {
    struct CountingSink {
        flushes: Rc<RefCell<usize>>,
        inner: Vec<u8>,
    }

    impl Write for CountingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.inner.write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            *self.flushes.borrow_mut() += 1;
            Ok(())
        }
    }

    let flushes = Rc::new(RefCell::new(0usize));
    let sink = CountingSink { flushes: flushes.clone(), inner: Vec::new() };

    InvoiceRenderer::new().render(&sample_invoice(), sink).unwrap();
    assert!(*flushes.borrow() >= 1);
}

#[test]
fn render_to_file_writes_complete_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("invoice.pdf");

    let extent = InvoiceRenderer::new()
        .render_to_file(&sample_invoice(), &path)
        .unwrap();
    let bytes = std::fs::read(&path).unwrap();

    assert!(bytes.starts_with(b"%PDF-1.7"));
    assert!(bytes.ends_with(b"%%EOF\n"));
    assert_eq!(extent, 330.0);
}
