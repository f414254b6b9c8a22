//! Export invoices as CSV on stdout, one row per invoice item, then log
//! per-project income (excluding re-invoiced expenses) and gross value.

use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use freeagent_rs::report::invoices;
use freeagent_rs::{Client, Credentials, DateRange};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Export invoices as CSV, one row per item, with per-project totals."
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

    let projects = client.projects().list().await?;
    let contacts = client.contacts().list().await?;
    let bills = client.invoices().list(range).await?;

    let report = invoices::build(&bills, &projects, &contacts);
    invoices::write_csv(&report.rows, std::io::stdout().lock())?;
    if report.skipped > 0 {
        tracing::warn!(
            skipped = report.skipped,
            "invoices skipped due to unresolved references"
        );
    }

    for (project, totals) in &report.totals {
        tracing::info!(
            "{project:<24} {:>10} ({:>10} with expenses)",
            totals.income.round_dp(2).to_string(),
            totals.net_value.round_dp(2).to_string()
        );
    }
    Ok(())
}
