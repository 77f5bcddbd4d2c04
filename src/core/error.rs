//! Error taxonomy for the invoice pipeline

use thiserror::Error;

/// Errors raised while loading an invoice or computing its total.
///
/// Every variant aborts the current invoice; there is no partial result.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// The invoice file could not be read.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The invoice file is not valid JSON.
    #[error("{0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The document parsed but lacks `invoice.currency`, `invoice.date` or `invoice.lines`.
    #[error("Invalid input file")]
    MalformedInvoice,

    /// Rates were requested before any query was built or supplied.
    #[error("missing query string")]
    EmptyQuery,

    /// The rate service failed; carries its reported message or the transport error.
    #[error("{0}")]
    RateService(String),

    #[error("no lineItems found")]
    NoLineItems,

    #[error("empty exchangeRates object")]
    EmptyRateMap,

    #[error("no lineTotal found")]
    NoLineTotals,

    /// A line item references a currency the rate map has no entry for.
    #[error("no exchange rate for currency: {0}")]
    MissingRate(String),

    #[error("failed to write invoice total: {0}")]
    Output(#[source] std::io::Error),
}

pub type Result<T, E = InvoiceError> = std::result::Result<T, E>;
