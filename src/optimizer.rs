//! Route orchestration: fetch, validate, solve, extract.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::OptimizeError;
use crate::matrix::{CostMetric, DistanceMatrix};
use crate::solver::tour_cost;
use crate::traits::{DepartureTime, DistanceMatrixProvider, RouteFinder, TravelMode};

/// Vehicles used for every tour.
pub const VEHICLES: usize = 1;

/// Index of the start/end destination.
pub const DEPOT: usize = 0;

/// One optimization request. The first destination is the depot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRequest {
    pub destinations: Vec<String>,
    pub mode: TravelMode,
    pub departure_time: DepartureTime,
}

impl TripRequest {
    pub fn new<I, S>(destinations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            destinations: destinations.into_iter().map(Into::into).collect(),
            mode: TravelMode::default(),
            departure_time: DepartureTime::default(),
        }
    }

    pub fn mode(mut self, mode: TravelMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn departure_time(mut self, departure_time: DepartureTime) -> Self {
        self.departure_time = departure_time;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Destination names in visiting order, starting and ending at the depot.
    pub route: Vec<String>,
    /// Duration text for each traversed edge that carried one.
    pub travel_times: Vec<String>,
    #[serde(skip)]
    pub total_cost: u64,
}

/// JSON shape handed back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteResponse {
    Route {
        route: Vec<String>,
        travel_times: Vec<String>,
    },
    Error {
        error: String,
    },
}

impl From<Result<RouteResult, OptimizeError>> for RouteResponse {
    fn from(result: Result<RouteResult, OptimizeError>) -> Self {
        match result {
            Ok(result) => RouteResponse::Route {
                route: result.route,
                travel_times: result.travel_times,
            },
            Err(err) => RouteResponse::Error {
                error: err.to_string(),
            },
        }
    }
}

pub struct RouteOptimizer<P, F> {
    provider: P,
    finder: F,
    metric: CostMetric,
}

impl<P, F> RouteOptimizer<P, F>
where
    P: DistanceMatrixProvider,
    F: RouteFinder,
{
    pub fn new(provider: P, finder: F) -> Self {
        Self {
            provider,
            finder,
            metric: CostMetric::default(),
        }
    }

    pub fn with_cost_metric(mut self, metric: CostMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn optimize(&self, request: &TripRequest) -> Result<RouteResult, OptimizeError> {
        let destinations = &request.destinations;
        if destinations.is_empty() {
            warn!("optimize called without destinations");
            return Err(OptimizeError::NoDestinations);
        }

        let matrix = self
            .provider
            .matrix_for(destinations, request.mode, request.departure_time)?;
        matrix.validate(destinations)?;

        let costs = matrix.cost_matrix(self.metric);
        debug!(nodes = costs.len(), metric = ?self.metric, "solving tour");

        let tour = self
            .finder
            .find_route(&costs, VEHICLES, DEPOT)
            .ok_or(OptimizeError::NoSolution)?;

        let result = extract_route(destinations, &matrix, &tour, tour_cost(&costs, &tour).unwrap_or_default())?;
        info!(
            stops = result.route.len(),
            total_cost = result.total_cost,
            "route optimized"
        );
        Ok(result)
    }
}

/// Map a closed tour of node ids back to names and leg durations.
fn extract_route(
    destinations: &[String],
    matrix: &DistanceMatrix,
    tour: &[usize],
    total_cost: u64,
) -> Result<RouteResult, OptimizeError> {
    let route = tour
        .iter()
        .map(|&node| destinations.get(node).cloned())
        .collect::<Option<Vec<_>>>()
        .ok_or(OptimizeError::NoSolution)?;

    let travel_times = tour
        .windows(2)
        .filter_map(|leg| matrix.duration_text(leg[0], leg[1]))
        .map(str::to_string)
        .collect();

    Ok(RouteResult {
        route,
        travel_times,
        total_cost,
    })
}
