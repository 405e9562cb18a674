use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use voltway_core::geo::GeoPoint;
use voltway_core::pipeline::TripPlanner;
use voltway_core::providers::StationDirectory;
use voltway_providers::{GreatCircleRouteProvider, InMemoryStationDirectory, PredictedConditions};

mod render;
mod scenario;

use scenario::Scenario;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a trip from a scenario file.
    Plan {
        /// Scenario JSON: endpoints, vehicle, policy, and stations.
        #[arg(short, long)]
        scenario: PathBuf,

        /// Emit the full plan as JSON instead of tables.
        #[arg(long)]
        json: bool,
    },
    /// List stations from a scenario near a point.
    Stations {
        #[arg(short, long)]
        scenario: PathBuf,

        /// Query point as "lat,lng".
        #[arg(short, long, value_parser = parse_point)]
        near: GeoPoint,

        #[arg(short, long, default_value_t = 10.0)]
        radius_km: f64,
    },
}

fn parse_point(raw: &str) -> Result<GeoPoint, String> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lng\", got {raw:?}"))?;
    let point = GeoPoint::new(
        lat.trim().parse().map_err(|e| format!("bad latitude: {e}"))?,
        lng.trim().parse().map_err(|e| format!("bad longitude: {e}"))?,
    );
    if !point.is_valid() {
        return Err(format!("coordinates out of range: {raw}"));
    }
    Ok(point)
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Commands::Plan { scenario, json } => plan(&scenario, json).await,
        Commands::Stations {
            scenario,
            near,
            radius_km,
        } => stations(&scenario, near, radius_km),
    }
}

async fn plan(path: &PathBuf, json: bool) -> Result<(), anyhow::Error> {
    let scenario = Scenario::from_file(path)?;
    let directory = InMemoryStationDirectory::new(scenario.stations.clone());
    let planner = TripPlanner::new(
        GreatCircleRouteProvider::default(),
        PredictedConditions,
        directory,
    );

    let plan = planner.plan_trip(&scenario.request()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("{}", render::summary_table(&plan));
    if !plan.charging_stops.is_empty() {
        println!("{}", render::stops_table(&plan));
    }
    println!("{}", render::recommendation_line(&plan));
    for warning in &plan.warnings {
        warn!("{warning}");
    }
    Ok(())
}

fn stations(path: &PathBuf, near: GeoPoint, radius_km: f64) -> Result<(), anyhow::Error> {
    let scenario = Scenario::from_file(path)?;
    let directory = InMemoryStationDirectory::new(scenario.stations);
    let found = directory.find_near(near, radius_km * 1000.0, None, 50);

    info!(total = directory.len(), matching = found.len(), "station query");
    for station in found {
        println!(
            "{:<24} {:>7.2} km  {:>4.0} kW  {} chargers",
            station.name,
            station.point.haversine_distance(&near) / 1000.0,
            station.power_kw,
            station.number_of_chargers,
        );
    }
    Ok(())
}
