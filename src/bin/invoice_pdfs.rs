//! Download the PDF rendition of every invoice in the date range, one
//! file per invoice named by date, reference, and id.

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use freeagent_rs::utils::date::format_iso_date;
use freeagent_rs::{Client, Credentials, DateRange};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Download invoice PDFs into the current directory."
)]
struct Cli {
    /// FreeAgent subdomain (https://<domain>.freeagentcentral.com).
    domain: String,
    /// Account email address.
    email: String,
    /// Account password.
    password: String,
    /// Range start, YYYY-MM-DD. Defaults to January 1st of this year.
    begin: Option<String>,
    /// Range end, YYYY-MM-DD. Defaults to today.
    end: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let range = DateRange::from_strings(cli.begin.as_deref(), cli.end.as_deref())?;
    let client = Client::new(&cli.domain, Credentials::basic(cli.email, cli.password))?;

    let mut bills: Vec<_> = client.invoices().list(range).await?.into_values().collect();
    bills.sort_by_key(|invoice| invoice.id);

    for invoice in bills {
        let date = invoice.dated_on.map(format_iso_date).unwrap_or_default();
        let reference = invoice.reference.clone().unwrap_or_default();
        let name = format!("invoice_{date}_{reference}_{}.pdf", invoice.id);
        tracing::info!(id = invoice.id, "downloading {name}");
        let bytes = client.invoices().pdf(invoice.id).await?;
        std::fs::write(&name, bytes).into_diagnostic()?;
        println!("{name}");
    }
    Ok(())
}
