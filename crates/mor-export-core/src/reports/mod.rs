use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use sqlx::mysql::MySqlRow;
use sqlx::FromRow;
use tracing::{debug, info};

use crate::config::ConnectionProfile;
use crate::dates::DateWindow;
use crate::error::Result;
use crate::executor::{QuerySpec, TunneledExecutor};
use crate::output::{output_file_name, write_csv};

pub mod daily_destinations;
pub mod destination_prices;
pub mod incoming_duration;
pub mod mobile_landline;
pub mod provider_activity;

pub use daily_destinations::{DailyDestinationRow, MaxCallsPerDayByDestination};
pub use destination_prices::{DestinationPriceRow, DeviceGroup, PricesByDestination};
pub use incoming_duration::{IncomingCallsDuration, IncomingDurationRow};
pub use mobile_landline::{DurationByLineType, LineDurationRow};
pub use provider_activity::{ProviderActivity, ProviderActivityRow};

/// One exportable report: its query, row shape and CSV rendering.
pub trait Report {
    type Row: for<'r> FromRow<'r, MySqlRow> + Send + Unpin;

    /// Subcommand name, also used in log lines.
    fn name(&self) -> &'static str;

    fn header(&self) -> &'static [&'static str];

    fn query(&self, window: &DateWindow) -> QuerySpec;

    /// Turns decoded rows into CSV records, in output order.
    fn render(&self, rows: Vec<Self::Row>) -> Result<Vec<Vec<String>>>;
}

/// Validates the raw date bounds, then runs the report.
///
/// Nothing touches the network unless both dates parse and are ordered.
pub async fn run<R: Report>(
    report: &R,
    date_start: &str,
    date_end: &str,
    profile: &ConnectionProfile,
    out_dir: &Path,
) -> Result<PathBuf> {
    let window = DateWindow::parse(date_start, date_end)?;
    run_window(report, &window, profile, out_dir).await
}

/// Queries through the tunnel and writes the export file.
pub async fn run_window<R: Report>(
    report: &R,
    window: &DateWindow,
    profile: &ConnectionProfile,
    out_dir: &Path,
) -> Result<PathBuf> {
    let spec = report.query(window);
    debug!(report = report.name(), sql = %spec.sql, params = ?spec.params, "built query");

    let rows = TunneledExecutor::new(profile)
        .execute::<R::Row>(&spec)
        .await?;

    write_report(report, rows, out_dir, Local::now().naive_local())
}

/// Renders every row, then writes header and lines to a timestamped file in `out_dir`.
///
/// The file is only created once rendering has succeeded.
pub fn write_report<R: Report>(
    report: &R,
    rows: Vec<R::Row>,
    out_dir: &Path,
    at: NaiveDateTime,
) -> Result<PathBuf> {
    let lines = report.render(rows)?;
    let path = out_dir.join(output_file_name(at));
    write_csv(&path, report.header(), &lines)?;

    info!(report = report.name(), lines = lines.len(), "{} exported", path.display());
    Ok(path)
}

pub(crate) fn window_params(spec: QuerySpec, window: &DateWindow) -> QuerySpec {
    spec.bind(window.start).bind(window.end)
}
