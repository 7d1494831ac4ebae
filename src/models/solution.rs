//! Solution and violation types.

use std::collections::HashSet;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::{Instance, Route};

/// A constraint violation found on a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Violation {
    /// Vehicle capacity exceeded.
    CapacityExceeded {
        /// Route index in the solution.
        route_index: usize,
        /// Load carried by the route.
        load: i32,
        /// Vehicle capacity.
        capacity: i32,
    },
    /// Route duration exceeds the instance limit.
    DurationExceeded {
        /// Route index in the solution.
        route_index: usize,
        /// Route duration (travel + service).
        duration: f64,
        /// Duration limit.
        limit: f64,
    },
}

/// Exported solution: timed routes plus totals.
///
/// Produced by [`Individual::to_solution`](crate::ga::Individual::to_solution)
/// for presentation or serialization.
///
/// # Examples
///
/// ```
/// use u_hgs::models::{Solution, Route};
///
/// let mut sol = Solution::new();
/// sol.add_route(Route::new(0));
/// assert_eq!(sol.num_routes(), 1);
/// assert_eq!(sol.num_served(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    routes: Vec<Route>,
    penalized_cost: f64,
}

impl Solution {
    /// Creates an empty solution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route to this solution.
    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// The routes of this solution.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Number of routes (vehicles used).
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Penalized cost at the time of export.
    pub fn penalized_cost(&self) -> f64 {
        self.penalized_cost
    }

    /// Sets the penalized cost.
    pub fn set_penalized_cost(&mut self, cost: f64) {
        self.penalized_cost = cost;
    }

    /// Total distance across all routes.
    pub fn total_distance(&self) -> f64 {
        self.routes.iter().map(|r| r.total_distance()).sum()
    }

    /// Total number of clients served.
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(|r| r.len()).sum()
    }

    /// Checks this solution against an instance.
    ///
    /// Every client must be served exactly once, no route may exceed the
    /// capacity or the duration limit, the fleet size must be respected and
    /// the stored route distances must match the instance distances.
    pub fn verify(&self, instance: &Instance) -> Result<()> {
        let n = instance.nb_clients();
        if self.routes.len() > instance.fleet_size() {
            return Err(anyhow!(
                "Number of routes ({}) exceeds fleet size ({})",
                self.routes.len(),
                instance.fleet_size()
            ));
        }

        let mut seen = HashSet::with_capacity(n);
        for (idx, route) in self.routes.iter().enumerate() {
            let mut prev = 0;
            let mut distance = 0.0;
            let mut load = 0;
            let mut service = 0.0;
            for visit in route.visits() {
                let c = visit.customer_id;
                if c == 0 || c > n {
                    return Err(anyhow!("Route {idx} visits invalid location {c}"));
                }
                if !seen.insert(c) {
                    return Err(anyhow!("Client {c} is visited more than once"));
                }
                distance += instance.distance(prev, c);
                load += instance.demand(c);
                service += instance.service_duration(c);
                prev = c;
            }
            if route.is_empty() {
                continue;
            }
            distance += instance.distance(prev, 0);
            if load > instance.capacity() {
                return Err(anyhow!(
                    "Route {idx} load ({load}) exceeds capacity ({})",
                    instance.capacity()
                ));
            }
            if let Some(limit) = instance.duration_limit() {
                if distance + service > limit + 1e-9 {
                    return Err(anyhow!(
                        "Route {idx} duration ({}) exceeds limit ({limit})",
                        distance + service
                    ));
                }
            }
            if (distance - route.total_distance()).abs() > 1e-6 {
                return Err(anyhow!(
                    "Route {idx} distance is {}, recomputed {distance}",
                    route.total_distance()
                ));
            }
        }

        if seen.len() != n {
            let missing: Vec<usize> = (1..=n).filter(|c| !seen.contains(c)).collect();
            return Err(anyhow!("Clients not served: {missing:?}"));
        }
        Ok(())
    }
}
