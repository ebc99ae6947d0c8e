//! Core traits for the route optimizer.
//!
//! These are intentionally minimal. The optimizer only needs something that
//! turns destinations into a distance matrix and something that turns a cost
//! matrix into a closed tour.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::matrix::{CostMatrix, DistanceMatrix};

/// Transport mode requested from the distance provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TravelMode::Driving => "driving",
                TravelMode::Walking => "walking",
                TravelMode::Bicycling => "bicycling",
                TravelMode::Transit => "transit",
            }
        )
    }
}

impl FromStr for TravelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "driving" => Ok(TravelMode::Driving),
            "walking" => Ok(TravelMode::Walking),
            "bicycling" => Ok(TravelMode::Bicycling),
            "transit" => Ok(TravelMode::Transit),
            other => Err(format!("unknown travel mode '{}'", other)),
        }
    }
}

/// Departure time passed to the distance provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepartureTime {
    #[default]
    Now,
    /// Unix timestamp in seconds.
    At(i64),
}

impl fmt::Display for DepartureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepartureTime::Now => write!(f, "now"),
            DepartureTime::At(ts) => write!(f, "{}", ts),
        }
    }
}

impl FromStr for DepartureTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("now") {
            return Ok(DepartureTime::Now);
        }
        s.parse::<i64>()
            .map(DepartureTime::At)
            .map_err(|_| format!("departure time must be 'now' or a unix timestamp, got '{}'", s))
    }
}

/// Provides a distance/duration matrix for a set of destinations.
///
/// The matrix is indexed by the provided destination order, for both origins
/// and destinations.
pub trait DistanceMatrixProvider {
    fn matrix_for(
        &self,
        destinations: &[String],
        mode: TravelMode,
        departure: DepartureTime,
    ) -> Result<DistanceMatrix, ProviderError>;
}

/// Finds a closed tour over a cost matrix.
///
/// Implementations return node ids starting and ending at `depot`, visiting
/// every other node exactly once, or `None` when no feasible tour exists.
pub trait RouteFinder {
    fn find_route(&self, costs: &CostMatrix, vehicles: usize, depot: usize) -> Option<Vec<usize>>;
}

impl<T: DistanceMatrixProvider + ?Sized> DistanceMatrixProvider for &T {
    fn matrix_for(
        &self,
        destinations: &[String],
        mode: TravelMode,
        departure: DepartureTime,
    ) -> Result<DistanceMatrix, ProviderError> {
        (**self).matrix_for(destinations, mode, departure)
    }
}

impl<T: RouteFinder + ?Sized> RouteFinder for &T {
    fn find_route(&self, costs: &CostMatrix, vehicles: usize, depot: usize) -> Option<Vec<usize>> {
        (**self).find_route(costs, vehicles, depot)
    }
}
