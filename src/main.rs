use clap::Parser;

use safepath_route_service::layers::crime_store::SqliteCrimeStore;
use safepath_route_service::routing::config::RouterConfig;
use safepath_route_service::server::server::{start_server, ServerConfig};

/// Crime-aware pedestrian routing service
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Path to the crime database
    #[clap(long, default_value = "safepath.db")]
    db_path: String,

    /// Base URL of the directions API
    #[clap(long, default_value = "https://api.mapbox.com/directions/v5/mapbox")]
    oracle_url: String,

    /// Directions API access token; falls back to MAPBOX_ACCESS_TOKEN
    #[clap(long)]
    oracle_token: Option<String>,

    /// Server host address
    #[clap(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[clap(long, default_value_t = 8080)]
    port: u16,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let oracle_token = args
        .oracle_token
        .or_else(|| std::env::var("MAPBOX_ACCESS_TOKEN").ok())
        .unwrap_or_default();
    if oracle_token.is_empty() {
        log::warn!("no directions API token configured; oracle calls will fail");
    }

    let defaults = RouterConfig::default();
    let store = SqliteCrimeStore::new(args.db_path.clone(), defaults.retention_days);
    if let Err(err) = store.create_tables() {
        log::error!("could not initialize crime database: {err}");
    }

    start_server(
        ServerConfig {
            db_path: args.db_path,
            oracle_url: args.oracle_url,
            oracle_token,
        },
        &args.host,
        args.port,
    )
    .await
}
