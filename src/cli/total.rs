use super::ui;
use crate::calculator::InvoiceCalculator;
use crate::core::{ExchangeRateProvider, InvoiceDocument, LineTotal, RateMap};
use anyhow::{Context, Result};
use comfy_table::Cell;
use std::path::Path;
use tracing::debug;

/// Renders the converted lines of an invoice followed by its total.
pub fn display_breakdown(
    document: &InvoiceDocument,
    rates: &RateMap,
    line_totals: &[LineTotal],
    total: f64,
) -> String {
    let base = &document.currency;
    let mut table = ui::new_styled_table();

    table.set_header(vec![
        ui::header_cell("Description"),
        ui::header_cell("Amount"),
        ui::header_cell("Rate"),
        ui::header_cell(&format!("Amount ({base})")),
    ]);

    for (line, converted) in document.lines.iter().zip(line_totals) {
        let rate = rates
            .get(&line.currency)
            .map_or("N/A".to_string(), |r| format!("{r:.4}"));
        table.add_row(vec![
            Cell::new(&line.description),
            ui::number_cell(format!("{:.2} {}", line.amount, line.currency)),
            ui::number_cell(rate),
            ui::number_cell(format!("{:.2}", converted.amount)),
        ]);
    }

    let mut output = format!(
        "Invoice: {} {}\n\n",
        ui::style_text(base, ui::StyleType::Title),
        ui::style_text(&document.date, ui::StyleType::Subtle)
    );
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\nTotal ({}): {}\n",
        ui::style_text(base, ui::StyleType::TotalLabel),
        ui::style_text(&format!("{total:.2}"), ui::StyleType::TotalValue)
    ));
    output
}

/// Loads the invoice at `invoice_path`, totals it and prints the total.
pub async fn run<P: ExchangeRateProvider>(
    invoice_path: &Path,
    provider: P,
    breakdown: bool,
) -> Result<()> {
    let mut calculator = InvoiceCalculator::load(invoice_path, provider)
        .with_context(|| format!("Failed to load invoice: {}", invoice_path.display()))?;

    let pb = ui::new_spinner("Fetching exchange rates...");
    let result = calculator.compute_invoice_total(None).await;
    pb.finish_and_clear();
    let total = result?;
    debug!(total, "Invoice total computed");

    if breakdown {
        println!(
            "{}",
            display_breakdown(
                calculator.document(),
                calculator.rates(),
                calculator.line_totals(),
                total
            )
        );
    }

    calculator.print_invoice_total(None).await?;
    Ok(())
}
