//! Invoice document types and the file loader

use super::error::{InvoiceError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LineItem {
    pub description: String,
    pub currency: String,
    pub amount: f64,
}

/// A line converted into the invoice's base currency.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LineTotal {
    pub description: String,
    pub amount: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InvoiceDocument {
    /// Base currency every line is converted into.
    pub currency: String,
    /// Rate date, `YYYY/MM/DD`, passed to the rate service as-is.
    pub date: String,
    pub lines: Vec<LineItem>,
}

#[derive(Debug, Deserialize)]
struct InvoiceFile {
    invoice: InvoiceDocument,
}

impl InvoiceDocument {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading invoice from {}", path.display());
        let raw = fs::read_to_string(path)?;
        let document = Self::from_json(&raw)?;
        debug!(
            currency = %document.currency,
            date = %document.date,
            lines = document.lines.len(),
            "Loaded invoice"
        );
        Ok(document)
    }

    /// Syntax errors keep the parser's message; well-formed JSON of the
    /// wrong shape is reported as a malformed invoice.
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        serde_json::from_value::<InvoiceFile>(value)
            .map(|file| file.invoice)
            .map_err(|e| {
                debug!(error = %e, "Invoice document has an unexpected shape");
                InvoiceError::MalformedInvoice
            })
    }
}
