//! Route and visit types.

use serde::{Deserialize, Serialize};

/// A single client visit within an exported route.
///
/// Times are cumulative from the depot departure: arrival equals travelled
/// distance plus service durations of earlier clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    /// Client ID being visited.
    pub customer_id: usize,
    /// Arrival time at this client.
    pub arrival_time: f64,
    /// Departure time (arrival + service duration).
    pub departure_time: f64,
    /// Cumulative load after this visit.
    pub load_after: i32,
}

/// An ordered sequence of client visits served by one vehicle.
///
/// The route starts and ends at the depot (not stored in `visits`).
///
/// # Examples
///
/// ```
/// use u_hgs::models::{Route, Visit};
///
/// let mut route = Route::new(0);
/// route.push_visit(Visit {
///     customer_id: 1,
///     arrival_time: 10.0,
///     departure_time: 20.0,
///     load_after: 10,
/// });
/// assert_eq!(route.len(), 1);
/// assert_eq!(route.total_load(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    vehicle_id: usize,
    visits: Vec<Visit>,
    total_distance: f64,
    total_duration: f64,
    total_load: i32,
}

impl Route {
    /// Creates an empty route for the given vehicle.
    pub fn new(vehicle_id: usize) -> Self {
        Self {
            vehicle_id,
            visits: Vec::new(),
            total_distance: 0.0,
            total_duration: 0.0,
            total_load: 0,
        }
    }

    /// Appends a visit to the end of this route.
    pub fn push_visit(&mut self, visit: Visit) {
        self.total_load = visit.load_after;
        self.visits.push(visit);
    }

    /// Vehicle (route index) serving this route.
    pub fn vehicle_id(&self) -> usize {
        self.vehicle_id
    }

    /// The ordered visits.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Number of client visits.
    pub fn len(&self) -> usize {
        self.visits.len()
    }

    /// Returns `true` if this route serves no client.
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    /// Client IDs in visit order.
    pub fn customer_ids(&self) -> Vec<usize> {
        self.visits.iter().map(|v| v.customer_id).collect()
    }

    /// Depot-to-depot travel distance.
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Travel distance plus service durations.
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Total demand served.
    pub fn total_load(&self) -> i32 {
        self.total_load
    }

    pub(crate) fn set_totals(&mut self, distance: f64, duration: f64) {
        self.total_distance = distance;
        self.total_duration = duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit(customer_id: usize, arrival_time: f64, load_after: i32) -> Visit {
        Visit {
            customer_id,
            arrival_time,
            departure_time: arrival_time + 5.0,
            load_after,
        }
    }

    #[test]
    fn test_route_empty() {
        let r = Route::new(2);
        assert!(r.is_empty());
        assert_eq!(r.vehicle_id(), 2);
        assert_eq!(r.total_distance(), 0.0);
        assert_eq!(r.total_load(), 0);
    }

    #[test]
    fn test_route_push_visit() {
        let mut r = Route::new(1);
        r.push_visit(visit(5, 10.0, 20));
        r.push_visit(visit(3, 20.0, 35));
        r.set_totals(42.0, 52.0);
        assert_eq!(r.len(), 2);
        assert_eq!(r.customer_ids(), vec![5, 3]);
        assert_eq!(r.total_load(), 35);
        assert_eq!(r.total_duration(), 52.0);
    }

    #[test]
    fn test_route_serializes() {
        let mut r = Route::new(0);
        r.push_visit(visit(1, 1.0, 3));
        let json = serde_json::to_string(&r).expect("serializable");
        assert!(json.contains("\"customer_id\":1"));
        let back: Route = serde_json::from_str(&json).expect("valid");
        assert_eq!(back, r);
    }
}
