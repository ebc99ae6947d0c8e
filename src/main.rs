//! Command line front end: order destinations into a closed tour and print it as JSON.

use clap::{Parser, ValueEnum};
use tracing::{error, Level};

use route_optimizer::google::{GoogleMapsClient, GoogleMapsConfig};
use route_optimizer::matrix::CostMetric;
use route_optimizer::optimizer::{RouteOptimizer, RouteResponse, TripRequest};
use route_optimizer::solver::{SolveOptions, TourSolver};
use route_optimizer::traits::{DepartureTime, TravelMode};

#[derive(Clone, Copy, ValueEnum)]
enum Metric {
    Distance,
    Duration,
}

impl From<Metric> for CostMetric {
    fn from(metric: Metric) -> Self {
        match metric {
            Metric::Distance => CostMetric::Distance,
            Metric::Duration => CostMetric::Duration,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Order destinations into a closed tour", long_about = None)]
struct Cli {
    /// Destinations to visit. The first one is where the tour starts and ends.
    #[arg(required = true)]
    destinations: Vec<String>,

    /// Transport mode (driving, walking, bicycling, transit)
    #[arg(short, long, default_value = "driving")]
    mode: TravelMode,

    /// Departure time, "now" or a unix timestamp in seconds
    #[arg(long, default_value = "now")]
    departure_time: DepartureTime,

    /// Matrix field used as the transit cost
    #[arg(long, value_enum, default_value_t = Metric::Distance)]
    metric: Metric,

    /// Local search rounds after the first tour (0 keeps the first tour)
    #[arg(long, default_value_t = 100)]
    local_search_iterations: usize,

    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(short, long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.api_key {
        Some(key) => GoogleMapsConfig::from_env_with_key(key.clone())?,
        None => GoogleMapsConfig::from_env()?,
    };

    let provider = GoogleMapsClient::new(config)?;
    let solver = TourSolver::new(SolveOptions {
        local_search_iterations: cli.local_search_iterations,
        ..SolveOptions::default()
    });
    let optimizer = RouteOptimizer::new(provider, solver).with_cost_metric(cli.metric.into());

    let request = TripRequest::new(cli.destinations)
        .mode(cli.mode)
        .departure_time(cli.departure_time);

    let result = optimizer.optimize(&request);
    let failed = result.is_err();
    if let Err(err) = &result {
        error!(retryable = err.is_retryable(), "{}", err);
    }

    println!("{}", serde_json::to_string_pretty(&RouteResponse::from(result))?);

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
