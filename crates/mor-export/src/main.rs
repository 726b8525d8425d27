use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mor_export_core::config::{self, ConnectionProfile};
use mor_export_core::dates::DateWindow;
use mor_export_core::reports::{
    self, DurationByLineType, IncomingCallsDuration, MaxCallsPerDayByDestination,
    PricesByDestination, ProviderActivity, Report,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "mor-export",
    author,
    version,
    about = "Generates call statistics from a Kolmisoft MOR database",
    long_about = None
)]
struct Cli {
    /// dotenv file to load instead of ./.env
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory the CSV export is written to
    #[arg(long, global = true, default_value = ".")]
    output_dir: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export incoming call duration per DID for a date range
    #[command(name = "morIncomingCallsDuration", alias = "incoming-calls-duration")]
    IncomingCallsDuration(DateArgs),
    /// Export incoming and outgoing activity of active DIDs for a provider
    #[command(
        name = "morCallsIncomingOutgoingNumbersDurationLastByProvider",
        alias = "provider-activity"
    )]
    ProviderActivity(ProviderArgs),
    /// Export answered outgoing call duration per mobile or landline destination
    #[command(
        name = "morCallsDurationPerMobileOrLandlinePhones",
        alias = "duration-by-line-type"
    )]
    DurationByLineType(DateArgs),
    /// Export call prices by destination, grouped by device group
    #[command(
        name = "morCallsPricesByDestinationsByDeviceGroupsByProviders",
        alias = "prices-by-destination"
    )]
    PricesByDestination(DateArgs),
    /// Export the number of calls per day and destination country
    #[command(
        name = "morMaxCallsNumberPerDaysByDestinations",
        alias = "calls-per-day"
    )]
    CallsPerDay(DateArgs),
}

#[derive(Args, Debug)]
struct DateArgs {
    /// The start date of the export ('YYYY-MM-DD HH:mm:SS')
    #[arg(short = 's', long = "dateStart")]
    date_start: String,
    /// The end date of the export ('YYYY-MM-DD HH:mm:SS')
    #[arg(short = 'e', long = "dateEnd")]
    date_end: String,
}

#[derive(Args, Debug)]
struct ProviderArgs {
    #[command(flatten)]
    dates: DateArgs,
    /// A part of the provider name, matched case-insensitively (e.g. 'sfr')
    #[arg(short = 'p', long)]
    provider: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let settings = RunSettings {
        config: cli.config.as_deref(),
        output_dir: &cli.output_dir,
    };

    match &cli.command {
        Command::IncomingCallsDuration(args) => {
            export(&settings, &IncomingCallsDuration, args, None).await
        }
        Command::ProviderActivity(args) => {
            let report = ProviderActivity::new(args.provider.as_str());
            export(&settings, &report, &args.dates, Some(report.provider())).await
        }
        Command::DurationByLineType(args) => {
            export(&settings, &DurationByLineType, args, None).await
        }
        Command::PricesByDestination(args) => {
            export(&settings, &PricesByDestination::default(), args, None).await
        }
        Command::CallsPerDay(args) => {
            export(&settings, &MaxCallsPerDayByDestination, args, None).await
        }
    }
}

struct RunSettings<'a> {
    config: Option<&'a Path>,
    output_dir: &'a Path,
}

async fn export<R: Report>(
    settings: &RunSettings<'_>,
    report: &R,
    dates: &DateArgs,
    provider: Option<&str>,
) -> Result<()> {
    let window = DateWindow::parse(&dates.date_start, &dates.date_end)?;
    match provider {
        Some(provider) => println!(
            "{} called with {window} and provider: {provider}",
            report.name()
        ),
        None => println!("{} called with {window}", report.name()),
    }

    config::load_dotenv(settings.config)?;
    let profile = ConnectionProfile::from_env().context("invalid MOR connection settings")?;

    let path = reports::run_window(report, &window, &profile, settings.output_dir)
        .await
        .with_context(|| format!("{} failed", report.name()))?;

    info!(file = %path.display(), "export complete");
    println!("{} exported", path.display());
    Ok(())
}
