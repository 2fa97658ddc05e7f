//! Invoice issuing: validation, persistence, and artifact rendering glued
//! together over an [`InvoiceStore`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::invoice::{Invoice, InvoiceDraft, InvoiceStatus};
use crate::renderer::InvoiceRenderer;
use crate::store::{InvoicePage, InvoiceStore, Pagination};

/// Where rendered artifacts land and where the logo is looked for. Partial
/// configurations deserialize against the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub artifact_dir: PathBuf,
    /// Probed at render time; a missing or broken file just means no logo.
    pub logo_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            artifact_dir: PathBuf::from("invoices"),
            logo_path: Some(PathBuf::from("assets/logo.png")),
        }
    }
}

/// Artifact bytes plus the filename a download should suggest.
#[derive(Debug, Clone)]
pub struct InvoiceDownload {
    pub bytes: Vec<u8>,
    pub filename: String,
}

pub struct InvoiceService<S: InvoiceStore> {
    store: S,
    renderer: InvoiceRenderer,
    config: ServiceConfig,
}

impl<S: InvoiceStore> InvoiceService<S> {
    pub fn new(store: S, config: ServiceConfig) -> Self {
        let mut renderer = InvoiceRenderer::new();
        if let Some(path) = &config.logo_path {
            renderer = renderer.with_logo(path);
        }
        InvoiceService { store, renderer, config }
    }

    fn artifact_path(&self, invoice: &Invoice) -> PathBuf {
        self.config.artifact_dir.join(invoice.artifact_filename())
    }

    fn render_artifact(&self, invoice: &Invoice, path: &Path) -> Result<()> {
        fs::create_dir_all(&self.config.artifact_dir)?;
        self.renderer.render_to_file(invoice, path)?;
        log::info!("rendered {}", path.display());
        Ok(())
    }

    /// Validate the draft, persist the priced invoice, render its artifact,
    /// and record the artifact path.
    ///
    /// Validation failures surface before anything is persisted. The record
    /// is persisted before rendering, so a render failure leaves it behind
    /// with `pdf_path` unset; `download` regenerates the artifact later.
    pub fn create(&self, draft: InvoiceDraft) -> Result<Invoice> {
        let mut invoice = Invoice::from_draft(draft, Utc::now())?;
        self.store.create(&invoice)?;
        log::debug!("created invoice {}", invoice.invoice_number);

        let path = self.artifact_path(&invoice);
        self.render_artifact(&invoice, &path)?;
        self.store.update_pdf_path(&invoice.invoice_number, Some(path.clone()))?;
        invoice.pdf_path = Some(path);
        Ok(invoice)
    }

    /// Fetch the artifact for download, re-rendering it first when no
    /// artifact was ever recorded or the recorded file has gone missing.
    pub fn download(&self, id: &str) -> Result<InvoiceDownload> {
        let invoice = self.store.find_by_id(id)?;
        let filename = invoice.artifact_filename();

        if let Some(path) = &invoice.pdf_path {
            match fs::read(path) {
                Ok(bytes) => return Ok(InvoiceDownload { bytes, filename }),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    log::warn!("artifact {} missing, re-rendering", path.display());
                }
                Err(err) => return Err(err.into()),
            }
        }

        let path = self.artifact_path(&invoice);
        self.render_artifact(&invoice, &path)?;
        self.store.update_pdf_path(&invoice.invoice_number, Some(path.clone()))?;
        let bytes = fs::read(&path)?;
        Ok(InvoiceDownload { bytes, filename })
    }

    pub fn list(&self, status: Option<InvoiceStatus>, page: Pagination) -> Result<InvoicePage> {
        self.store.find(status, page)
    }

    pub fn update_status(&self, id: &str, status: InvoiceStatus) -> Result<Invoice> {
        self.store.update_status(id, status)
    }

    /// Remove the record and its artifact file. An artifact that is already
    /// gone is not an error.
    pub fn delete(&self, id: &str) -> Result<Invoice> {
        let invoice = self.store.delete(id)?;
        if let Some(path) = &invoice.pdf_path {
            if let Err(err) = fs::remove_file(path) {
                if err.kind() != io::ErrorKind::NotFound {
                    log::warn!("could not remove artifact {}: {}", path.display(), err);
                }
            }
        }
        log::debug!("deleted invoice {}", invoice.invoice_number);
        Ok(invoice)
    }
}
