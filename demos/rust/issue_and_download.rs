/// Walks the full issuing flow against the in-memory store: create two
/// invoices, list them, download one artifact, delete the other.
///
/// Run with:
///   cargo run --example issue_and_download -p invoice-demos
///
/// Pass a PNG or JPEG path as the first argument to brand the artifacts.
///
/// Artifacts land under: demos/output/invoices/
use invoice_core::{
    ClientInfo, DraftItem, InMemoryInvoiceStore, InvoiceDraft, InvoiceService, InvoiceStatus,
    Pagination, ServiceConfig,
};

fn main() {
    env_logger::init();

    let config = ServiceConfig {
        artifact_dir: "demos/output/invoices".into(),
        logo_path: std::env::args().nth(1).map(Into::into),
    };
    let service = InvoiceService::new(InMemoryInvoiceStore::new(), config);

    let first = service
        .create(InvoiceDraft {
            client: ClientInfo {
                name: "Orbit Labs LLC".to_string(),
                email: "accounts@orbitlabs.example".to_string(),
                address: Some("900 Harbor Blvd, Suite 210, San Diego, CA".to_string()),
                phone: None,
            },
            company: Default::default(),
            items: vec![
                DraftItem::new("UI design", 24.0, 95.0),
                DraftItem::new("Frontend implementation", 38.5, 110.0),
            ],
            tax: 537.49,
            due_date: None,
        })
        .expect("create first invoice");
    println!(
        "issued {} for {} ({:.2} total)",
        first.invoice_number, first.client.name, first.total
    );

    // Invoice numbers derive from the millisecond clock.
    std::thread::sleep(std::time::Duration::from_millis(5));

    let second = service
        .create(InvoiceDraft {
            client: ClientInfo::new("Bluebird Cafe", "owner@bluebird.example"),
            company: Default::default(),
            items: vec![DraftItem::new("Monthly retainer", 1.0, 500.0)],
            tax: 0.0,
            due_date: None,
        })
        .expect("create second invoice");
    println!(
        "issued {} for {} ({:.2} total)",
        second.invoice_number, second.client.name, second.total
    );

    service
        .update_status(&first.invoice_number, InvoiceStatus::Sent)
        .expect("mark sent");

    let page = service.list(None, Pagination::default()).expect("list");
    println!("{} invoice(s) on file:", page.total);
    for invoice in &page.invoices {
        println!(
            "  {}  {:<5}  {:>10.2}",
            invoice.invoice_number, invoice.status, invoice.total
        );
    }

    let download = service.download(&first.invoice_number).expect("download");
    println!("downloaded {} ({} bytes)", download.filename, download.bytes.len());

    service.delete(&second.invoice_number).expect("delete");
    println!("deleted {} and its artifact", second.invoice_number);
}
