pub mod objects;
pub mod writer;
pub mod fonts;
pub mod graphics;
pub mod images;
pub mod document;
pub mod layout;
pub mod invoice;
pub mod error;
pub mod renderer;
pub mod store;
pub mod service;

pub use document::PdfDocument;
pub use error::{InvoiceError, Result};
pub use fonts::{BuiltinFont, TextStyle};
pub use graphics::{Color, Rect};
pub use invoice::{
    ClientInfo, CompanyInfo, DraftItem, Invoice, InvoiceDraft, InvoiceStatus, LineItem,
};
pub use layout::{layout_invoice, InvoiceLayout, LayoutMetrics};
pub use renderer::InvoiceRenderer;
pub use service::{InvoiceDownload, InvoiceService, ServiceConfig};
pub use store::{InMemoryInvoiceStore, InvoicePage, InvoiceStore, Pagination};
