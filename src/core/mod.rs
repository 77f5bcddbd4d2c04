//! Core invoice types, rate abstractions and application plumbing

pub mod config;
pub mod error;
pub mod invoice;
pub mod log;
pub mod rates;
pub mod rounding;

// Re-export main types for cleaner imports
pub use error::InvoiceError;
pub use invoice::{InvoiceDocument, LineItem, LineTotal};
pub use rates::{ExchangeRateProvider, RateMap, RateQuery};
