/// Renders one invoice straight to a PDF file, no store involved.
///
/// Run with:
///   cargo run --example render_invoice -p invoice-demos
///
/// Pass a PNG or JPEG path as the first argument to draw a logo in the
/// header; without one the layout simply starts at the top margin.
///
/// Output at: demos/output/sample-invoice.pdf
use chrono::{Duration, Utc};
use invoice_core::{ClientInfo, CompanyInfo, DraftItem, Invoice, InvoiceDraft, InvoiceRenderer};

fn main() {
    env_logger::init();

    let draft = InvoiceDraft {
        client: ClientInfo {
            name: "Orbit Labs LLC".to_string(),
            email: "accounts@orbitlabs.example".to_string(),
            address: Some("900 Harbor Blvd, Suite 210, San Diego, CA".to_string()),
            phone: Some("(619) 555-0142".to_string()),
        },
        company: CompanyInfo {
            name: "NovaPeak Solutions".to_string(),
            address: "1 Summit Ave, Denver, CO 80202".to_string(),
            email: "billing@novapeak.example".to_string(),
            phone: "(303) 555-0177".to_string(),
        },
        items: vec![
            DraftItem::new("Discovery workshop", 1.0, 850.0),
            DraftItem::new("UI design", 24.0, 95.0),
            DraftItem::new("Frontend implementation", 38.5, 110.0),
            DraftItem::new("Managed hosting (monthly)", 3.0, 40.0),
        ],
        tax: 617.51,
        due_date: Some((Utc::now() + Duration::days(30)).date_naive()),
    };
    let invoice = Invoice::from_draft(draft, Utc::now()).expect("valid draft");

    let mut renderer = InvoiceRenderer::new();
    if let Some(logo) = std::env::args().nth(1) {
        renderer = renderer.with_logo(logo);
    }

    std::fs::create_dir_all("demos/output").unwrap();
    let path = "demos/output/sample-invoice.pdf";
    let extent = renderer.render_to_file(&invoice, path).expect("render");

    println!(
        "{} -> {} ({} layout units tall)",
        invoice.invoice_number, path, extent
    );
}
