//! Invoice persistence behind a trait, with an in-memory reference
//! implementation. Invoices are keyed by their invoice number.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{InvoiceError, Result};
use crate::invoice::{Invoice, InvoiceStatus};

/// Page selector for listings. `page` is 1-based; a page of 0 reads as 1.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination { page: 1, per_page: 20 }
    }
}

/// One page of matches plus the total match count across all pages.
#[derive(Debug, Clone)]
pub struct InvoicePage {
    pub invoices: Vec<Invoice>,
    pub total: usize,
}

pub trait InvoiceStore: Send + Sync {
    /// Insert a new invoice. Fails with `AlreadyExists` when the number is
    /// already taken.
    fn create(&self, invoice: &Invoice) -> Result<()>;

    fn find_by_id(&self, id: &str) -> Result<Invoice>;

    /// List invoices, optionally restricted to one status, newest first.
    /// Ties on `created_at` break by invoice number (descending) so page
    /// boundaries are stable.
    fn find(&self, status: Option<InvoiceStatus>, page: Pagination) -> Result<InvoicePage>;

    /// Replace the status and return the updated invoice.
    fn update_status(&self, id: &str, status: InvoiceStatus) -> Result<Invoice>;

    /// Record (or clear) the rendered artifact path.
    fn update_pdf_path(&self, id: &str, path: Option<PathBuf>) -> Result<()>;

    /// Remove and return the invoice.
    fn delete(&self, id: &str) -> Result<Invoice>;
}

/// `RwLock<HashMap>`-backed store, the reference implementation used by the
/// tests and demos.
#[derive(Default)]
pub struct InMemoryInvoiceStore {
    inner: RwLock<HashMap<String, Invoice>>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock only means a panic elsewhere mid-write; the map is
    // still usable, so recover the guard instead of propagating.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Invoice>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Invoice>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl InvoiceStore for InMemoryInvoiceStore {
    fn create(&self, invoice: &Invoice) -> Result<()> {
        let mut map = self.write();
        if map.contains_key(&invoice.invoice_number) {
            return Err(InvoiceError::AlreadyExists(invoice.invoice_number.clone()));
        }
        map.insert(invoice.invoice_number.clone(), invoice.clone());
        Ok(())
    }

    fn find_by_id(&self, id: &str) -> Result<Invoice> {
        self.read()
            .get(id)
            .cloned()
            .ok_or_else(|| InvoiceError::NotFound(id.to_string()))
    }

    fn find(&self, status: Option<InvoiceStatus>, page: Pagination) -> Result<InvoicePage> {
        let map = self.read();
        let mut matches: Vec<&Invoice> = map
            .values()
            .filter(|inv| status.map_or(true, |s| inv.status == s))
            .collect();
        matches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.invoice_number.cmp(&a.invoice_number))
        });

        let total = matches.len();
        let start = page.page.max(1).saturating_sub(1) * page.per_page;
        let invoices = matches
            .into_iter()
            .skip(start)
            .take(page.per_page)
            .cloned()
            .collect();
        Ok(InvoicePage { invoices, total })
    }

    fn update_status(&self, id: &str, status: InvoiceStatus) -> Result<Invoice> {
        let mut map = self.write();
        let invoice = map
            .get_mut(id)
            .ok_or_else(|| InvoiceError::NotFound(id.to_string()))?;
        invoice.status = status;
        Ok(invoice.clone())
    }

    fn update_pdf_path(&self, id: &str, path: Option<PathBuf>) -> Result<()> {
        let mut map = self.write();
        let invoice = map
            .get_mut(id)
            .ok_or_else(|| InvoiceError::NotFound(id.to_string()))?;
        invoice.pdf_path = path;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<Invoice> {
        self.write()
            .remove(id)
            .ok_or_else(|| InvoiceError::NotFound(id.to_string()))
    }
}
