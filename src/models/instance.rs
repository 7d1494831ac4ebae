//! Validated CVRP instance.

use crate::distance::DistanceMatrix;
use crate::error::Error;

use super::Customer;

/// Symmetry tolerance accepted for explicit distance matrices.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Immutable CVRP instance data.
///
/// Location 0 is the depot, locations `1..=n` are clients. Besides the raw
/// data it holds, for each client, the other clients sorted by increasing
/// distance; the local search scans a prefix of these lists.
///
/// # Examples
///
/// ```
/// use u_hgs::models::{Customer, Instance};
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 1.0, 0.0, 4, 0.0),
///     Customer::new(2, 2.0, 0.0, 4, 0.0),
///     Customer::new(3, 0.0, 5.0, 4, 0.0),
/// ];
/// let instance = Instance::euclidean(customers, 10).expect("valid");
/// assert_eq!(instance.nb_clients(), 3);
/// assert_eq!(instance.neighbors(1), &[2, 3]);
/// // ceil(1.3 * 12 / 10) + 3
/// assert_eq!(instance.fleet_size(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct Instance {
    customers: Vec<Customer>,
    distances: DistanceMatrix,
    capacity: i32,
    fleet_size: usize,
    duration_limit: Option<f64>,
    neighbors: Vec<Vec<usize>>,
    total_demand: i64,
    max_demand: i32,
}

impl Instance {
    /// Builds an instance from locations (index 0 = depot), an explicit
    /// distance matrix and the vehicle capacity.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCapacity`] if `capacity <= 0`
    /// - [`Error::InvalidParameter`] if the depot is missing or a location id
    ///   does not match its index
    /// - [`Error::DimensionMismatch`] if the matrix size differs from the
    ///   number of locations
    /// - [`Error::NegativeDemand`] for a client with negative demand
    /// - [`Error::NegativeDistance`] / [`Error::AsymmetricDistance`] for a
    ///   matrix the solver cannot use
    pub fn new(
        customers: Vec<Customer>,
        distances: DistanceMatrix,
        capacity: i32,
    ) -> Result<Self, Error> {
        if capacity <= 0 {
            return Err(Error::InvalidCapacity(capacity));
        }
        if customers.is_empty() {
            return Err(Error::InvalidParameter {
                name: "customers",
                reason: "the depot (location 0) is missing".to_string(),
            });
        }
        if let Some((idx, c)) = customers.iter().enumerate().find(|(i, c)| c.id() != *i) {
            return Err(Error::InvalidParameter {
                name: "customers",
                reason: format!("location at index {idx} has id {}", c.id()),
            });
        }
        if distances.size() != customers.len() {
            return Err(Error::DimensionMismatch {
                expected: customers.len(),
                actual: distances.size(),
            });
        }
        if let Some(c) = customers.iter().skip(1).find(|c| c.demand() < 0) {
            return Err(Error::NegativeDemand {
                client: c.id(),
                demand: c.demand(),
            });
        }
        distances.validate(SYMMETRY_TOLERANCE)?;

        let total_demand: i64 = customers.iter().skip(1).map(|c| c.demand() as i64).sum();
        let max_demand = customers.iter().skip(1).map(|c| c.demand()).max().unwrap_or(0);
        let fleet_size = (1.3 * total_demand as f64 / capacity as f64).ceil() as usize + 3;

        let n = customers.len() - 1;
        let mut neighbors = vec![Vec::new(); n + 1];
        for (i, list) in neighbors.iter_mut().enumerate().skip(1) {
            let mut others: Vec<usize> = (1..=n).filter(|&j| j != i).collect();
            others.sort_by(|&a, &b| {
                distances
                    .get(i, a)
                    .total_cmp(&distances.get(i, b))
                    .then(a.cmp(&b))
            });
            *list = others;
        }

        Ok(Self {
            customers,
            distances,
            capacity,
            fleet_size,
            duration_limit: None,
            neighbors,
            total_demand,
            max_demand,
        })
    }

    /// Builds an instance with Euclidean distances computed from coordinates.
    pub fn euclidean(customers: Vec<Customer>, capacity: i32) -> Result<Self, Error> {
        let distances = DistanceMatrix::from_customers(&customers);
        Self::new(customers, distances, capacity)
    }

    /// Overrides the number of available vehicles (at least 1).
    pub fn with_fleet_size(mut self, vehicles: usize) -> Self {
        self.fleet_size = vehicles.max(1);
        self
    }

    /// Limits route duration (travel distance plus service durations).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if `limit` is not positive and finite.
    pub fn with_duration_limit(mut self, limit: f64) -> Result<Self, Error> {
        if !(limit > 0.0 && limit.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "duration_limit",
                reason: format!("must be positive and finite, got {limit}"),
            });
        }
        self.duration_limit = Some(limit);
        Ok(self)
    }

    /// Number of clients (depot excluded).
    pub fn nb_clients(&self) -> usize {
        self.customers.len() - 1
    }

    /// All locations, depot first.
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// Location `id`.
    pub fn customer(&self, id: usize) -> &Customer {
        &self.customers[id]
    }

    /// The depot location.
    pub fn depot(&self) -> &Customer {
        &self.customers[0]
    }

    /// Demand of location `id`.
    #[inline]
    pub fn demand(&self, id: usize) -> i32 {
        self.customers[id].demand()
    }

    /// Service duration of location `id`.
    #[inline]
    pub fn service_duration(&self, id: usize) -> f64 {
        self.customers[id].service_duration()
    }

    /// Distance between two locations.
    #[inline]
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances.get(from, to)
    }

    /// The distance matrix.
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Vehicle capacity.
    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    /// Number of available vehicles.
    pub fn fleet_size(&self) -> usize {
        self.fleet_size
    }

    /// Route duration limit, if any.
    pub fn duration_limit(&self) -> Option<f64> {
        self.duration_limit
    }

    /// Sum of all client demands.
    pub fn total_demand(&self) -> i64 {
        self.total_demand
    }

    /// Largest client demand (0 without clients).
    pub fn max_demand(&self) -> i32 {
        self.max_demand
    }

    /// Other clients sorted by increasing distance from `client`.
    ///
    /// Empty for the depot.
    pub fn neighbors(&self, client: usize) -> &[usize] {
        &self.neighbors[client]
    }

    /// Amount by which `load` exceeds the vehicle capacity.
    #[inline]
    pub fn capacity_excess(&self, load: i32) -> f64 {
        (load - self.capacity).max(0) as f64
    }

    /// Amount by which `duration` exceeds the duration limit (0 if unlimited).
    #[inline]
    pub fn duration_excess(&self, duration: f64) -> f64 {
        match self.duration_limit {
            Some(limit) => (duration - limit).max(0.0),
            None => 0.0,
        }
    }
}
