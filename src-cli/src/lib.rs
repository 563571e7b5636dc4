//! Command-line client for the Oasis campus safety state core.
//!
//! ```text
//! oasis incidents
//! oasis alerts [--severity high] [--status active] [--limit 10]
//! oasis activity [--limit 10]
//! oasis report --type theft --description "Bike stolen" --reporter Jane \
//!     --lat 29.72 --lng -95.34 --location Library [--photo a.jpg]
//! oasis set-status <id> investigating
//! oasis add-alert --title ... --description ... --severity medium --type weather
//! oasis resolve <id>
//! oasis reset
//! ```
//!
//! Every command prints JSON on stdout. Notifications are logged at `info`, the default filter when
//! `RUST_LOG` is unset.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use oasis_core::activity::AlertFilter;
use oasis_core::config::StoreConfig;
use oasis_core::domain::{
    AlertDraft, AlertKind, AlertStatus, IncidentDraft, IncidentKind, IncidentStatus, Location,
    Severity,
};
use oasis_core::error::AppError;
use oasis_core::state::{IncidentState, Outcome};
use oasis_core::store::{KeyValueStore, MemoryStore, SqliteStore};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "oasis", about = "Report and track campus safety incidents and alerts")]
pub struct Cli {
    /// SQLite file holding the device state (overrides OASIS_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Use a throwaway in-memory store seeded with the defaults
    #[arg(long, global = true, conflicts_with = "db")]
    pub memory: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List all incidents, newest first
    Incidents,
    /// List alerts, newest first
    Alerts {
        #[arg(long)]
        severity: Option<Severity>,
        #[arg(long)]
        status: Option<AlertStatus>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show the merged incident and alert feed
    Activity {
        /// Defaults to OASIS_FEED_LIMIT, or 10
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Report a new incident
    Report {
        #[arg(long = "type")]
        kind: IncidentKind,
        #[arg(long)]
        description: String,
        #[arg(long)]
        reporter: String,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Display name of the place
        #[arg(long)]
        location: String,
        #[arg(long = "photo")]
        photos: Vec<String>,
    },
    /// Change the status of an incident
    SetStatus { id: String, status: IncidentStatus },
    /// Broadcast a new alert
    AddAlert {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        severity: Severity,
        #[arg(long = "type")]
        kind: AlertKind,
        #[arg(long, allow_negative_numbers = true, requires_all = ["lng", "location"])]
        lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires_all = ["lat", "location"])]
        lng: Option<f64>,
        #[arg(long, requires_all = ["lat", "lng"])]
        location: Option<String>,
    },
    /// Mark an alert resolved
    Resolve { id: String },
    /// Drop all local data and restore the day-one content
    Reset,
}

#[derive(Debug, Serialize)]
struct UpdateResponse<'a> {
    id: &'a str,
    outcome: Outcome,
}

fn open_store(cli: &Cli, config: &StoreConfig) -> Result<Box<dyn KeyValueStore>, AppError> {
    if cli.memory {
        return Ok(Box::new(MemoryStore::new()));
    }
    let path = cli.db.clone().unwrap_or_else(|| config.db_path.clone());
    log::debug!("opening store at {}", path.display());
    Ok(Box::new(SqliteStore::open(&path)?))
}

fn print_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        AppError::new("CLI_OUTPUT_FAILED", "Failed to encode output").with_details(e.to_string())
    })?;
    writeln!(out, "{text}").map_err(|e| {
        AppError::new("CLI_OUTPUT_FAILED", "Failed to write output").with_details(e.to_string())
    })
}

pub fn execute(cli: Cli, config: &StoreConfig, out: &mut impl Write) -> Result<(), AppError> {
    let store = open_store(&cli, config)?;
    let mut state = IncidentState::load(store, config);
    state.subscribe(|event| log::info!("{}", event.message()));

    match cli.command {
        Commands::Incidents => print_json(out, state.incidents()),
        Commands::Alerts {
            severity,
            status,
            limit,
        } => print_json(out, &state.get_alerts(&AlertFilter { severity, status }, limit)),
        Commands::Activity { limit } => {
            let feed = match limit {
                Some(limit) => state.recent_activities_with_limit(limit),
                None => state.recent_activities(),
            };
            print_json(out, &feed)
        }
        Commands::Report {
            kind,
            description,
            reporter,
            lat,
            lng,
            location,
            photos,
        } => {
            let incident = state.add_incident(IncidentDraft {
                kind,
                description,
                reporter,
                location: Location::new(lat, lng, location),
                photos,
            });
            print_json(out, &incident)
        }
        Commands::SetStatus { id, status } => {
            let outcome = state.update_incident_status(&id, status);
            print_json(out, &UpdateResponse { id: &id, outcome })
        }
        Commands::AddAlert {
            title,
            description,
            severity,
            kind,
            lat,
            lng,
            location,
        } => {
            let location = match (lat, lng, location) {
                (Some(lat), Some(lng), Some(name)) => Some(Location::new(lat, lng, name)),
                _ => None,
            };
            let alert = state.add_alert(AlertDraft {
                title,
                description,
                severity,
                kind,
                location,
            });
            print_json(out, &alert)
        }
        Commands::Resolve { id } => {
            let outcome = state.resolve_alert(&id);
            print_json(out, &UpdateResponse { id: &id, outcome })
        }
        Commands::Reset => {
            state.clear_all_data();
            print_json(out, &serde_json::json!({ "ok": true }))
        }
    }
}

const DEFAULT_LOG_FILTER: &str = "info";

fn log_filter(env_value: Option<String>) -> String {
    env_value
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

pub fn run() -> Result<(), AppError> {
    pretty_env_logger::formatted_builder()
        .parse_filters(&log_filter(std::env::var("RUST_LOG").ok()))
        .init();
    let config = StoreConfig::from_env()?;
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    execute(cli, &config, &mut stdout.lock())
}
