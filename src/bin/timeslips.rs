//! Export timeslips as CSV on stdout, with hours summed by project and
//! user logged afterwards.

use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use freeagent_rs::report::timeslips;
use freeagent_rs::{Client, Credentials, DateRange};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Export timeslips as CSV, with hours summed by project and user."
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
    let tasks = client.tasks().list().await?;
    let users = client.users().list().await?;
    let slips = client.timeslips().list(range).await?;

    let report = timeslips::build(&slips, &projects, &tasks, &users);
    timeslips::write_csv(&report.rows, std::io::stdout().lock())?;
    if report.skipped > 0 {
        tracing::warn!(
            skipped = report.skipped,
            "timeslips skipped due to unresolved references"
        );
    }

    for (project, by_user) in timeslips::hours_by_project_and_user(&report.rows) {
        for (user, hours) in by_user {
            tracing::info!("{project:<24} {user:<28} {:>8}", hours.to_string());
        }
    }
    Ok(())
}
