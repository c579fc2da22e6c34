use std::path::PathBuf;

use anyhow::{Context, bail};
use chrono::FixedOffset;
use clap::{Parser, Subcommand};
use reporter::{
    AttendanceWorkbook, CsvFileSource, RosterSource, SpreadsheetSource, default_file_name,
};
use storage::{Database, PgAttendanceStore, models::Period, services::report_match};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "latecomers-report")]
#[command(about = "Monthly late comers report exporter", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Match a month's records against the roster and write an .xlsx file
    Export {
        #[arg(long)]
        year: i32,

        #[arg(long)]
        month: u32,

        #[command(flatten)]
        roster: RosterArgs,

        /// Defaults to Attendance_<month>-<year>.xlsx in the current directory
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long, env = "DATABASE_URL")]
        database_url: String,

        #[arg(long, env = "UTC_OFFSET_MINUTES", default_value_t = 330)]
        utc_offset_minutes: i32,
    },
    /// Load the roster and report how many rows are usable
    Roster {
        #[command(flatten)]
        roster: RosterArgs,
    },
}

#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct RosterArgs {
    /// Roster CSV file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Share link of the roster spreadsheet
    #[arg(short, long)]
    url: Option<String>,
}

impl RosterArgs {
    fn source(&self) -> anyhow::Result<Box<dyn RosterSource>> {
        match (&self.file, &self.url) {
            (Some(file), _) => Ok(Box::new(CsvFileSource::new(file))),
            (None, Some(url)) => Ok(Box::new(
                SpreadsheetSource::new(url).context("Failed to set up spreadsheet source")?,
            )),
            (None, None) => bail!("Either --file or --url is required"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "latecomers_report={},reporter={},storage={}",
                    log_level, log_level, log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Export {
            year,
            month,
            roster,
            output,
            database_url,
            utc_offset_minutes,
        } => {
            handle_export(
                year,
                month,
                &roster,
                output,
                &database_url,
                utc_offset_minutes,
            )
            .await?;
        }
        Commands::Roster { roster } => {
            handle_roster(&roster).await?;
        }
    }

    Ok(())
}

async fn handle_export(
    year: i32,
    month: u32,
    roster: &RosterArgs,
    output: Option<PathBuf>,
    database_url: &str,
    utc_offset_minutes: i32,
) -> anyhow::Result<()> {
    let period = Period::new(year, month).context("Invalid report period")?;
    let Some(offset) = FixedOffset::east_opt(utc_offset_minutes * 60) else {
        bail!("UTC_OFFSET_MINUTES out of range: {}", utc_offset_minutes);
    };

    let source = roster.source()?;
    tracing::info!("Loading roster from: {}", source.describe());
    let entries = source.load().await.context("Failed to load roster")?;
    tracing::info!("✓ Loaded {} roster rows", entries.len());

    tracing::info!("Connecting to database...");
    let db = Database::new(database_url)
        .await
        .context("Failed to connect to database")?;
    let store = PgAttendanceStore::new(db.pool().clone());

    let records = report_match::monthly_records(&store, period)
        .await
        .with_context(|| format!("Failed to load records for {}", period.label()))?;
    if records.is_empty() {
        tracing::warn!("No records found for {}", period.label());
        return Ok(());
    }

    let rows = report_match::match_roster(records, &entries);
    let matched = rows.iter().filter(|row| row.matched).count();
    tracing::info!(
        "Matched {} of {} records against the roster",
        matched,
        rows.len()
    );

    let path = output.unwrap_or_else(|| PathBuf::from(default_file_name(period)));
    AttendanceWorkbook::new(&rows, offset)
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("✓ Export completed: {}", path.display());
    Ok(())
}

async fn handle_roster(roster: &RosterArgs) -> anyhow::Result<()> {
    let source = roster.source()?;
    tracing::info!("Loading roster from: {}", source.describe());

    let entries = source.load().await.context("Failed to load roster")?;

    for entry in entries.iter().take(5) {
        tracing::debug!(
            "{} | {} | {} | {}",
            entry.roll_no,
            entry.name,
            entry.department,
            entry.semester
        );
    }
    tracing::info!("✓ Roster is valid: {} rows", entries.len());

    Ok(())
}
