use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use seeing_forecast_service::config::{Locations, DEFAULT_LOCATION_ID, DEFAULT_USER_AGENT};
use seeing_forecast_service::db::{DbPool, SeeingRepository};
use seeing_forecast_service::fetcher::SeeingFetcher;
use seeing_forecast_service::seeing::parse_seeing_table;
use seeing_forecast_service::seeing::quality::Quality;
use seeing_forecast_service::seeing::time::resolve_timezone;
use seeing_forecast_service::services::RefreshService;

#[derive(Parser)]
#[command(name = "refresh-location")]
#[command(about = "Refresh stored seeing forecasts, or parse a saved forecast page", long_about = None)]
struct Cli {
    /// Location id to refresh (unknown ids use the default location)
    #[arg(long, conflicts_with = "all")]
    location: Option<String>,

    /// Refresh every configured location
    #[arg(long)]
    all: bool,

    /// Parse a saved HTML page instead of fetching; nothing is stored
    #[arg(long, conflicts_with_all = ["location", "all"])]
    file: Option<PathBuf>,

    /// Timezone for --file parsing
    #[arg(long, default_value = "Europe/Athens")]
    timezone: String,

    /// Database connection string
    #[arg(long, env)]
    database_url: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 20)]
    timeout_secs: u64,

    /// User-Agent sent to the forecast source
    #[arg(long, env = "USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Location used when --location is missing or unknown
    #[arg(long, env = "DEFAULT_LOCATION", default_value = DEFAULT_LOCATION_ID)]
    default_location: String,
}

impl Cli {
    fn locations(&self) -> Locations {
        Locations::builtin().with_default(&self.default_location)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Some(path) = &cli.file {
        let html = std::fs::read_to_string(path)?;
        let parsed = parse_seeing_table(&html, resolve_timezone(&cli.timezone))?;

        println!(
            "Parsed {} readings across {} days ({} rows skipped)\n",
            parsed.readings.len(),
            parsed.days.len(),
            parsed.skipped_rows
        );
        for (index, day) in &parsed.days {
            println!(
                "Day {}: {} {}",
                index,
                day.date,
                day.weekday.as_deref().unwrap_or("")
            );
        }
        println!();
        for r in &parsed.readings {
            println!(
                "  {} day={} hour={:02} seeing={:?}\" {}",
                r.timestamp,
                r.day_index,
                r.hour,
                r.arc_seconds,
                Quality::classify(r.arc_seconds).label()
            );
        }
        return Ok(());
    }

    let database_url = cli
        .database_url
        .clone()
        .ok_or("DATABASE_URL is required unless --file is given")?;
    let pool = DbPool::connect(&database_url, 5).await?;

    let locations = Arc::new(cli.locations());
    let fetcher = SeeingFetcher::new(&cli.user_agent, Duration::from_secs(cli.timeout_secs))?;
    let service = RefreshService::new(SeeingRepository::new(pool.pool().clone()), fetcher, locations);

    let outcomes = if cli.all {
        service.refresh_all().await
    } else {
        vec![service.refresh(cli.location.as_deref()).await]
    };

    let mut failed = false;
    for outcome in &outcomes {
        let status = if outcome.success { "ok" } else { "FAILED" };
        println!("{}: {} - {}", outcome.location, status, outcome.message);
        failed |= !outcome.success;
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
