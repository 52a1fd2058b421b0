#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command line entry point for the crime browser.
//!
//! ```text
//! crime_browser serve [--bind 127.0.0.1] [--port 8000] [--db FILE] [--interactive]
//! crime_browser seed [--db FILE]
//! crime_browser import <incidents.csv> [--db FILE]
//! crime_browser query [--server URL] [--bbox w,s,e,n] [--types T1,T2] ...
//! crime_browser locate <case_number> [--server URL] [--bbox w,s,e,n]
//! crime_browser geocode <text> | --reverse lat,lng
//! ```
//!
//! Running with no subcommand enters interactive mode. Logging goes
//! through [`crime_browser_cli_utils::init_logger`] so log lines and
//! progress bars never fight for the terminal.

mod explore;
mod store;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use crime_browser_geography_models::{BoundingBox, LatLng};
use crime_browser_server::ServerConfig;
use dialoguer::{Input, Select};

/// Default server URL for client commands.
const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

#[derive(Parser)]
#[command(name = "crime_browser", about = "Browse, filter, and edit crime incidents")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST server
    Serve {
        /// Interface to bind (overrides `BIND_ADDR`)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
        /// `DuckDB` file (overrides `CRIME_BROWSER_DB`)
        #[arg(long)]
        db: Option<PathBuf>,
        /// Frontend build directory (overrides `STATIC_DIR`)
        #[arg(long)]
        static_dir: Option<PathBuf>,
        /// Prompt for each setting before starting
        #[arg(long)]
        interactive: bool,
    },
    /// Create the database and seed the reference catalog
    Seed {
        /// `DuckDB` file (overrides `CRIME_BROWSER_DB`)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Bulk import incidents from a CSV file
    Import {
        /// CSV with header case_number,date,time,code,incident,police_grid,neighborhood_number,block
        file: PathBuf,
        /// `DuckDB` file (overrides `CRIME_BROWSER_DB`)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Run a filtered query against a server and print enriched results
    Query {
        #[command(flatten)]
        filter: explore::FilterArgs,
        /// Print rows as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Geocode a displayed incident's block and show where the map recenters
    Locate {
        /// Case number of an incident in the current result set
        case_number: String,
        #[command(flatten)]
        filter: explore::FilterArgs,
    },
    /// Geocode free text, or reverse geocode a point
    Geocode {
        /// Address or block to search for
        #[arg(required_unless_present = "reverse")]
        text: Option<String>,
        /// Point as `lat,lng`
        #[arg(long, value_parser = parse_lat_lng, conflicts_with = "text")]
        reverse: Option<LatLng>,
    },
}

fn parse_bbox(s: &str) -> Result<BoundingBox, String> {
    BoundingBox::parse(s).ok_or_else(|| format!("expected west,south,east,north but got '{s}'"))
}

fn parse_lat_lng(s: &str) -> Result<LatLng, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid coordinate in '{s}': {e}"))?;
    match parts.as_slice() {
        [lat, lng] => Ok(LatLng::new(*lat, *lng)),
        _ => Err(format!("expected lat,lng but got '{s}'")),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    crime_browser_incident_models::submission::parse_date(s).map_err(|e| e.to_string())
}

/// Runs the actix server on its own system inside a blocking task so it
/// does not nest inside the tokio runtime.
async fn serve(config: ServerConfig, interactive: bool) -> Result<(), Box<dyn std::error::Error>> {
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(async move {
            if interactive {
                crime_browser_server::interactive::run(config).await
            } else {
                crime_browser_server::run_server(config).await
            }
        })
    })
    .await??;
    Ok(())
}

async fn interactive(multi: &crime_browser_cli_utils::MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("Crime Browser");
    println!();

    let labels = ["Start server", "Seed database", "Import incidents CSV"];
    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match idx {
        0 => serve(ServerConfig::from_env(), true).await,
        1 => store::seed(None),
        _ => {
            let file: String = Input::new().with_prompt("CSV file").interact_text()?;
            store::import(multi, &PathBuf::from(file), None)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crime_browser_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive(&multi).await;
    };

    match command {
        Commands::Serve {
            bind,
            port,
            db,
            static_dir,
            interactive,
        } => {
            let mut config = ServerConfig::from_env();
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(db) = db {
                config.database_path = db;
            }
            if let Some(static_dir) = static_dir {
                config.static_dir = static_dir;
            }
            serve(config, interactive).await?;
        }
        Commands::Seed { db } => store::seed(db)?,
        Commands::Import { file, db } => store::import(&multi, &file, db)?,
        Commands::Query { filter, json } => explore::query(&multi, &filter, json).await?,
        Commands::Locate {
            case_number,
            filter,
        } => explore::locate(&multi, &filter, &case_number).await?,
        Commands::Geocode { text, reverse } => {
            explore::geocode(&multi, text.as_deref(), reverse).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_coordinates() {
        assert_eq!(parse_lat_lng("44.94, -93.17"), Ok(LatLng::new(44.94, -93.17)));
        assert!(parse_lat_lng("44.94").is_err());
        assert!(parse_lat_lng("a,b").is_err());
    }

    #[test]
    fn parses_query_flags() {
        let cli = Cli::try_parse_from([
            "crime_browser",
            "query",
            "--bbox",
            "-93.2,44.9,-93.1,45.0",
            "--types",
            "Theft,Auto Theft",
            "--neighborhoods",
            "11,14",
            "--start",
            "2023-01-01",
            "--limit",
            "50",
        ])
        .unwrap();

        let Some(Commands::Query { filter, json }) = cli.command else {
            panic!("expected query command");
        };
        assert!(!json);
        assert_eq!(filter.types, vec!["Theft".to_string(), "Auto Theft".to_string()]);
        assert_eq!(filter.neighborhoods, vec![11, 14]);
        assert_eq!(filter.start, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(filter.limit, Some(50));
        assert!(filter.bbox.is_some());
    }

    #[test]
    fn geocode_requires_text_or_reverse() {
        assert!(Cli::try_parse_from(["crime_browser", "geocode"]).is_err());
        assert!(Cli::try_parse_from(["crime_browser", "geocode", "--reverse", "44.9,-93.1"]).is_ok());
    }
}
