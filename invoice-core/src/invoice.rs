use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{InvoiceError, Result};

/// Lifecycle state. Transitions are free-form: any status may move to any
/// other, there is no enforced ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
        };
        f.write_str(s)
    }
}

/// Billing recipient. Name and email are required; address and phone are
/// genuinely optional and reserve no layout space when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ClientInfo {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        ClientInfo {
            name: name.into(),
            email: email.into(),
            address: None,
            phone: None,
        }
    }
}

/// Issuer identity printed in the header. Each field falls back to a fixed
/// placeholder so an unconfigured deployment still renders a full header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    #[serde(default = "placeholder_company_name")]
    pub name: String,
    #[serde(default = "placeholder_company_address")]
    pub address: String,
    #[serde(default = "placeholder_company_email")]
    pub email: String,
    #[serde(default = "placeholder_company_phone")]
    pub phone: String,
}

impl Default for CompanyInfo {
    fn default() -> Self {
        CompanyInfo {
            name: placeholder_company_name(),
            address: placeholder_company_address(),
            email: placeholder_company_email(),
            phone: placeholder_company_phone(),
        }
    }
}

fn placeholder_company_name() -> String {
    "Your Company Name".to_string()
}

fn placeholder_company_address() -> String {
    "123 Business St, City, State 12345".to_string()
}

fn placeholder_company_email() -> String {
    "billing@yourcompany.com".to_string()
}

fn placeholder_company_phone() -> String {
    "(555) 123-4567".to_string()
}

/// One billed line. `amount` is fixed at creation from quantity × rate and
/// never re-derived from stored data afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub rate: f64,
    pub amount: f64,
}

impl LineItem {
    pub fn priced(description: impl Into<String>, quantity: f64, rate: f64) -> Self {
        LineItem {
            description: description.into(),
            quantity,
            rate,
            amount: quantity * rate,
        }
    }
}

/// Unpriced line as submitted by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftItem {
    pub description: String,
    pub quantity: f64,
    pub rate: f64,
}

impl DraftItem {
    pub fn new(description: impl Into<String>, quantity: f64, rate: f64) -> Self {
        DraftItem {
            description: description.into(),
            quantity,
            rate,
        }
    }
}

/// Creation input, before validation and pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub client: ClientInfo,
    #[serde(default)]
    pub company: CompanyInfo,
    pub items: Vec<DraftItem>,
    #[serde(default)]
    pub tax: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

/// A fully-resolved invoice, the canonical record the store owns and the
/// immutable input the renderer reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_number: String,
    pub client: ClientInfo,
    pub company: CompanyInfo,
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub status: InvoiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    /// Most recently rendered artifact; `None` until first render,
    /// re-rendered on demand if the file has gone missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_path: Option<PathBuf>,
}

impl Invoice {
    /// Validate a draft and resolve it into an invoice. Item amounts and
    /// the totals are computed here, exactly once.
    pub fn from_draft(draft: InvoiceDraft, now: DateTime<Utc>) -> Result<Invoice> {
        if draft.client.name.trim().is_empty() {
            return Err(InvoiceError::validation("client name is required"));
        }
        if draft.client.email.trim().is_empty() {
            return Err(InvoiceError::validation("client email is required"));
        }
        if draft.items.is_empty() {
            return Err(InvoiceError::validation("invoice must contain at least one item"));
        }
        if !(draft.tax >= 0.0 && draft.tax.is_finite()) {
            return Err(InvoiceError::validation("tax must be zero or positive"));
        }

        let items: Vec<LineItem> = draft
            .items
            .into_iter()
            .map(|item| LineItem::priced(item.description, item.quantity, item.rate))
            .collect();
        let subtotal: f64 = items.iter().map(|item| item.amount).sum();
        let total = subtotal + draft.tax;

        Ok(Invoice {
            invoice_number: generate_invoice_number(now),
            client: draft.client,
            company: draft.company,
            items,
            subtotal,
            tax: draft.tax,
            total,
            status: InvoiceStatus::default(),
            due_date: draft.due_date,
            created_at: now,
            pdf_path: None,
        })
    }

    /// File name of the downloadable artifact.
    pub fn artifact_filename(&self) -> String {
        format!("{}.pdf", self.invoice_number)
    }
}

/// Build an `INV-YYYYMM-XXXXXX` number from the creation instant. The
/// suffix folds the millisecond clock into six digits; two invoices created
/// in the same millisecond collide, an accepted trade-off.
pub fn generate_invoice_number(now: DateTime<Utc>) -> String {
    let suffix = now.timestamp_millis().rem_euclid(1_000_000);
    format!("INV-{:04}{:02}-{:06}", now.year(), now.month(), suffix)
}
