//! Single-vehicle tour solver (baseline implementation).
//!
//! Builds a first tour from the depot by cheapest outgoing arc, backtracking
//! when the greedy path dead-ends on untraversable arcs, then optionally
//! improves it with 2-opt and relocate moves.

use tracing::{debug, warn};

use crate::matrix::CostMatrix;
use crate::traits::RouteFinder;

/// Heuristic used to build the initial tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstSolutionStrategy {
    /// Let the solver pick. Currently resolves to `PathCheapestArc`.
    #[default]
    Automatic,
    /// From the last node, extend to the cheapest reachable unvisited node.
    PathCheapestArc,
}

#[derive(Debug, Clone)]
pub struct SolveOptions {
    pub first_solution: FirstSolutionStrategy,
    /// Maximum rounds of local search improvement. Zero keeps the first tour.
    pub local_search_iterations: usize,
    /// Node expansions allowed while constructing the first tour.
    pub max_construction_steps: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            first_solution: FirstSolutionStrategy::Automatic,
            local_search_iterations: 100,
            max_construction_steps: 100_000,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TourSolver {
    options: SolveOptions,
}

impl TourSolver {
    pub fn new(options: SolveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SolveOptions {
        &self.options
    }
}

impl RouteFinder for TourSolver {
    fn find_route(&self, costs: &CostMatrix, vehicles: usize, depot: usize) -> Option<Vec<usize>> {
        let n = costs.len();
        if vehicles != 1 {
            warn!(vehicles, "only single-vehicle tours are supported");
            return None;
        }
        if depot >= n || costs.iter().any(|row| row.len() != n) {
            warn!(nodes = n, depot, "cost matrix is not square or depot is out of range");
            return None;
        }
        if n == 1 {
            return Some(vec![depot, depot]);
        }

        let mut tour = match self.options.first_solution {
            FirstSolutionStrategy::Automatic | FirstSolutionStrategy::PathCheapestArc => {
                path_cheapest_arc(costs, depot, self.options.max_construction_steps)?
            }
        };
        debug!(cost = ?tour_cost(costs, &tour), "constructed first tour");

        local_search(&mut tour, costs, self.options.local_search_iterations);
        Some(tour)
    }
}

/// Cost of the arc `from -> to`, if it can be traversed.
fn arc(costs: &CostMatrix, from: usize, to: usize) -> Option<u64> {
    costs.get(from)?.get(to).copied().flatten()
}

/// Total cost of a closed tour, or `None` if any arc is untraversable.
pub fn tour_cost(costs: &CostMatrix, tour: &[usize]) -> Option<u64> {
    tour.windows(2)
        .try_fold(0u64, |total, leg| Some(total.saturating_add(arc(costs, leg[0], leg[1])?)))
}

struct Construction<'a> {
    costs: &'a CostMatrix,
    depot: usize,
    visited: Vec<bool>,
    path: Vec<usize>,
    steps: usize,
    max_steps: usize,
}

impl Construction<'_> {
    fn extend(&mut self) -> bool {
        let n = self.costs.len();
        let Some(&last) = self.path.last() else {
            return false;
        };
        if self.path.len() == n {
            return arc(self.costs, last, self.depot).is_some();
        }
        if self.steps >= self.max_steps {
            return false;
        }
        self.steps += 1;

        // Cheapest first, ties by lower node id.
        let mut candidates: Vec<(u64, usize)> = (0..n)
            .filter(|&next| !self.visited[next])
            .filter_map(|next| arc(self.costs, last, next).map(|cost| (cost, next)))
            .collect();
        candidates.sort_unstable();

        for (_, next) in candidates {
            self.visited[next] = true;
            self.path.push(next);
            if self.extend() {
                return true;
            }
            self.path.pop();
            self.visited[next] = false;
        }

        false
    }
}

fn path_cheapest_arc(costs: &CostMatrix, depot: usize, max_steps: usize) -> Option<Vec<usize>> {
    let mut visited = vec![false; costs.len()];
    visited[depot] = true;

    let mut construction = Construction {
        costs,
        depot,
        visited,
        path: vec![depot],
        steps: 0,
        max_steps,
    };

    if !construction.extend() {
        debug!(steps = construction.steps, "no feasible first tour");
        return None;
    }

    let mut tour = construction.path;
    tour.push(depot);
    Some(tour)
}

// ============================================================================
// Local Search Operators
// ============================================================================

/// 2-opt: reverse an interior segment of the tour.
/// Returns true if an improvement was made.
///
/// Costs may be asymmetric, so every candidate is priced in full.
fn two_opt_improve(tour: &mut [usize], costs: &CostMatrix) -> bool {
    let Some(current_cost) = tour_cost(costs, tour) else {
        return false;
    };
    let last = tour.len().saturating_sub(1);

    for i in 1..last {
        for j in i + 1..last {
            tour[i..=j].reverse();
            if tour_cost(costs, tour).is_some_and(|cost| cost < current_cost) {
                return true;
            }
            tour[i..=j].reverse();
        }
    }

    false
}

/// Relocate: move one node to another position in the tour.
/// Returns true if an improvement was made.
fn relocate_improve(tour: &mut Vec<usize>, costs: &CostMatrix) -> bool {
    let Some(current_cost) = tour_cost(costs, tour) else {
        return false;
    };
    let last = tour.len().saturating_sub(1);

    for from in 1..last {
        for to in 1..last {
            if to == from {
                continue;
            }
            let mut candidate = tour.clone();
            let node = candidate.remove(from);
            candidate.insert(to, node);

            if tour_cost(costs, &candidate).is_some_and(|cost| cost < current_cost) {
                *tour = candidate;
                return true;
            }
        }
    }

    false
}

/// Run local search until no more improvements or max iterations reached.
fn local_search(tour: &mut Vec<usize>, costs: &CostMatrix, iterations: usize) {
    for round in 0..iterations {
        let improved = two_opt_improve(tour, costs) || relocate_improve(tour, costs);
        if !improved {
            debug!(rounds = round, cost = ?tour_cost(costs, tour), "local search converged");
            break;
        }
    }
}
