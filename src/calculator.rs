//! The invoice pipeline: query, rates, line totals, invoice total.
//!
//! Each stage caches its output on the calculator. Every stage also accepts
//! an explicit input which overrides, and replaces, the cached value, so a
//! pipeline can be resumed from any point without touching the network.

use crate::core::error::{InvoiceError, Result};
use crate::core::invoice::{InvoiceDocument, LineItem, LineTotal};
use crate::core::rates::{ExchangeRateProvider, RateMap, RateQuery};
use crate::core::rounding::round;
use std::io::Write;
use std::path::Path;
use tracing::{debug, instrument};

const RATE_PRECISION: u32 = 4;
const AMOUNT_PRECISION: u32 = 2;

pub struct InvoiceCalculator<P: ExchangeRateProvider> {
    provider: P,
    document: InvoiceDocument,
    query: Option<RateQuery>,
    rates: RateMap,
    line_totals: Vec<LineTotal>,
    total: Option<f64>,
}

impl<P: ExchangeRateProvider> InvoiceCalculator<P> {
    pub fn load<Q: AsRef<Path>>(path: Q, provider: P) -> Result<Self> {
        let document = InvoiceDocument::load_from_path(path)?;
        Ok(Self::from_document(document, provider))
    }

    pub fn from_document(document: InvoiceDocument, provider: P) -> Self {
        InvoiceCalculator {
            provider,
            document,
            query: None,
            rates: RateMap::new(),
            line_totals: Vec::new(),
            total: None,
        }
    }

    /// Replaces the document and drops everything derived from the old one.
    pub fn reload<Q: AsRef<Path>>(&mut self, path: Q) -> Result<()> {
        self.document = InvoiceDocument::load_from_path(path)?;
        self.query = None;
        self.rates.clear();
        self.line_totals.clear();
        self.total = None;
        Ok(())
    }

    pub fn document(&self) -> &InvoiceDocument {
        &self.document
    }

    pub fn query(&self) -> Option<&RateQuery> {
        self.query.as_ref()
    }

    pub fn rates(&self) -> &RateMap {
        &self.rates
    }

    pub fn line_totals(&self) -> &[LineTotal] {
        &self.line_totals
    }

    pub fn total(&self) -> Option<f64> {
        self.total
    }

    pub fn generate_query(&mut self) -> &RateQuery {
        let query = RateQuery::new(
            &self.document.currency,
            &self.document.date,
            &self.document.lines,
        );
        debug!(symbols = %query.symbols(), "Generated rate query");
        self.query.insert(query)
    }

    /// Fetches rates for `query`, or the cached query, and stores the
    /// reciprocal of each reported rate rounded to four places.
    #[instrument(skip(self, query))]
    pub async fn fetch_exchange_rates(&mut self, query: Option<RateQuery>) -> Result<&RateMap> {
        if let Some(query) = query {
            self.query = Some(query);
        }
        let query = self.query.as_ref().ok_or(InvoiceError::EmptyQuery)?;

        let reported = self.provider.fetch_rates(query).await?;
        self.rates = reported
            .into_iter()
            .map(|(currency, rate)| {
                if !rate.is_finite() || rate <= 0.0 {
                    return Err(InvoiceError::RateService(format!(
                        "invalid exchange rate {rate} for currency: {currency}"
                    )));
                }
                Ok((currency, round(1.0 / rate, RATE_PRECISION)))
            })
            .collect::<Result<RateMap>>()?;
        debug!(rates = ?self.rates, "Resolved conversion rates");
        Ok(&self.rates)
    }

    pub fn calculate_line_totals(
        &mut self,
        line_items: Option<Vec<LineItem>>,
        rates: Option<RateMap>,
    ) -> Result<&[LineTotal]> {
        if let Some(line_items) = line_items {
            self.document.lines = line_items;
        }
        if let Some(rates) = rates {
            self.rates = rates;
        }
        // Totals derived from earlier inputs must not survive a failed conversion.
        self.line_totals.clear();
        self.total = None;

        if self.document.lines.is_empty() {
            return Err(InvoiceError::NoLineItems);
        }
        if self.rates.is_empty() {
            return Err(InvoiceError::EmptyRateMap);
        }

        self.line_totals = self
            .document
            .lines
            .iter()
            .map(|line| -> Result<LineTotal> {
                let rate = self
                    .rates
                    .get(&line.currency)
                    .ok_or_else(|| InvoiceError::MissingRate(line.currency.clone()))?;
                Ok(LineTotal {
                    description: line.description.clone(),
                    amount: round(line.amount * rate, AMOUNT_PRECISION),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(lines = self.line_totals.len(), "Converted line items");
        Ok(&self.line_totals)
    }

    /// Sums the already rounded line totals and rounds the sum again.
    pub fn calculate_invoice_total(&mut self, line_totals: Option<Vec<LineTotal>>) -> Result<f64> {
        if let Some(line_totals) = line_totals {
            self.line_totals = line_totals;
        }
        if self.line_totals.is_empty() {
            return Err(InvoiceError::NoLineTotals);
        }

        let sum: f64 = self.line_totals.iter().map(|line| line.amount).sum();
        let total = round(sum, AMOUNT_PRECISION);
        debug!(total, "Calculated invoice total");
        self.total = Some(total);
        Ok(total)
    }

    /// Returns the supplied or cached total, running the whole pipeline when
    /// neither exists.
    pub async fn compute_invoice_total(&mut self, total: Option<f64>) -> Result<f64> {
        if let Some(total) = total {
            self.total = Some(total);
        }
        if let Some(total) = self.total {
            debug!(total, "Using cached invoice total");
            return Ok(total);
        }

        self.generate_query();
        self.fetch_exchange_rates(None).await?;
        self.calculate_line_totals(None, None)?;
        self.calculate_invoice_total(None)
    }

    pub async fn write_invoice_total<W: Write>(
        &mut self,
        out: &mut W,
        total: Option<f64>,
    ) -> Result<f64> {
        let total = self.compute_invoice_total(total).await?;
        writeln!(out, "{total}").map_err(InvoiceError::Output)?;
        Ok(total)
    }

    pub async fn print_invoice_total(&mut self, total: Option<f64>) -> Result<f64> {
        self.write_invoice_total(&mut std::io::stdout(), total).await
    }
}
