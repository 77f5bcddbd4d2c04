use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxinvoice::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Print the invoice total in the invoice's base currency
    Total {
        /// Path to the invoice JSON document
        invoice: PathBuf,

        /// Print converted line items before the total
        #[arg(short, long)]
        breakdown: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxinvoice::cli::setup::setup(),
        Some(Commands::Total { invoice, breakdown }) => {
            fxinvoice::run_command(
                fxinvoice::AppCommand::Total {
                    invoice_path: invoice,
                    breakdown,
                },
                cli.config_path.as_deref(),
            )
            .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
