use std::rc::Rc;

use clap::{Parser, Subcommand};
use geo_types::Coord;

use safepath_route_service::layers::crime_store::{NewCrime, SqliteCrimeStore};
use safepath_route_service::layers::geo_util::BBox;
use safepath_route_service::oracle::mapbox::MapboxDirections;
use safepath_route_service::routing::config::RouterConfig;
use safepath_route_service::routing::engine::RouteEngine;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load incident fixtures from a CSV file into the crime database
    Seed {
        #[arg(long)]
        db_path: String,

        #[arg(long)]
        csv_path: String,
    },
    /// Compute a route plan between two coordinates
    Route {
        #[arg(long)]
        db_path: String,

        #[arg(long, default_value = "https://api.mapbox.com/directions/v5/mapbox")]
        oracle_url: String,

        #[arg(long)]
        oracle_token: String,

        /// Start coordinate as "lat,lng"
        #[arg(long)]
        from: String,

        /// End coordinate as "lat,lng"
        #[arg(long)]
        to: String,
    },
    /// Print heatmap statistics for a bounding box
    Heatmap {
        #[arg(long)]
        db_path: String,

        /// Bounding box as "min_lat,min_lng,max_lat,max_lng"
        #[arg(long)]
        bbox: String,
    },
}

fn parse_coord(raw: &str) -> Coord<f64> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|p| p.trim().parse().expect("coordinate must be numeric"))
        .collect();
    assert_eq!(parts.len(), 2, "expected \"lat,lng\", got {raw:?}");
    Coord {
        x: parts[1],
        y: parts[0],
    }
}

fn parse_bbox(raw: &str) -> BBox {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|p| p.trim().parse().expect("bbox bound must be numeric"))
        .collect();
    assert_eq!(parts.len(), 4, "expected four comma-separated bounds");
    BBox {
        min_lat: parts[0],
        min_lng: parts[1],
        max_lat: parts[2],
        max_lng: parts[3],
    }
}

fn seed(db_path: &str, csv_path: &str) {
    println!("Reading fixtures from {csv_path}");
    let mut reader = csv::Reader::from_path(csv_path).unwrap();
    let rows: Vec<NewCrime> = reader
        .deserialize()
        .map(|row| row.expect("malformed fixture row"))
        .collect();

    let config = RouterConfig::default();
    let store = SqliteCrimeStore::new(db_path, config.retention_days);
    store.create_tables().unwrap();
    let inserted = store.insert_crimes(&rows).unwrap();
    println!("Inserted {inserted} incidents into {db_path}");
}

async fn route_once(db_path: &str, oracle_url: &str, oracle_token: &str, from: &str, to: &str) {
    let config = RouterConfig::default();
    let store = Rc::new(SqliteCrimeStore::new(db_path, config.retention_days));
    let oracle = Rc::new(MapboxDirections::new(oracle_url, oracle_token));
    let engine = RouteEngine::new(store, oracle, config);

    let plan = engine
        .optimal_route(parse_coord(from), parse_coord(to))
        .await
        .unwrap();

    println!(
        "Fastest: {:.0} m, {:.0} s, safety {:.1} ({})",
        plan.fastest_route.total_distance,
        plan.fastest_route.total_duration,
        plan.fastest_route.total_safety_score,
        plan.fastest_route.safety_grade,
    );
    println!(
        "Safest:  {:.0} m, {:.0} s, safety {:.1} ({})",
        plan.safest_route.total_distance,
        plan.safest_route.total_duration,
        plan.safest_route.total_safety_score,
        plan.safest_route.safety_grade,
    );
    println!("{}", serde_json::to_string_pretty(&plan.comparison).unwrap());
}

async fn heatmap(db_path: &str, bbox: &str) {
    let config = RouterConfig::default();
    let store = Rc::new(SqliteCrimeStore::new(db_path, config.retention_days));
    // heatmaps never touch the oracle; point it at nothing
    let oracle = Rc::new(MapboxDirections::new("http://127.0.0.1:0", ""));
    let engine = RouteEngine::new(store, oracle, config);

    let summary = engine.crime_density_heatmap(parse_bbox(bbox)).await.unwrap();
    println!("Cells:        {}", summary.heatmap_data.len());
    println!("Total crimes: {}", summary.total_crimes);
    println!("Critical 24h: {}", summary.critical_crimes_24h);
    println!("High severity:{}", summary.high_severity_crimes);
}

#[actix_web::main]
async fn main() {
    env_logger::init();

    let args = Args::parse();
    match args.command {
        Command::Seed { db_path, csv_path } => seed(&db_path, &csv_path),
        Command::Route {
            db_path,
            oracle_url,
            oracle_token,
            from,
            to,
        } => route_once(&db_path, &oracle_url, &oracle_token, &from, &to).await,
        Command::Heatmap { db_path, bbox } => heatmap(&db_path, &bbox).await,
    }
}
