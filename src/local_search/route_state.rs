//! Per-route cached data for O(1) move evaluation.
//!
//! Positions are "extended": position 0 is the depot at the start, positions
//! `1..=len` are the clients and position `len + 1` is the depot at the end.

use crate::evaluation::{route_cost, Penalties};
use crate::models::Instance;

/// Angular resolution of [`CircleSector`]: a full turn is 65536 units.
const CIRCLE: i32 = 65536;

/// `i mod 65536` in `[0, 65536)`.
#[inline]
fn positive_mod(i: i32) -> i32 {
    i.rem_euclid(CIRCLE)
}

/// Polar angle of a client around the depot, in `[0, 65536)`.
pub(crate) fn polar_angle(instance: &Instance, client: usize) -> i32 {
    let angle = instance.customer(client).polar_angle(instance.depot());
    positive_mod((32768.0 * angle / std::f64::consts::PI) as i32)
}

/// Smallest circular sector (around the depot) covering a route's clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct CircleSector {
    start: i32,
    end: i32,
}

impl CircleSector {
    /// A sector reduced to one angle.
    pub(crate) fn at(point: i32) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    pub(crate) fn is_enclosed(&self, point: i32) -> bool {
        positive_mod(point - self.start) <= positive_mod(self.end - self.start)
    }

    /// Grows the sector by the shorter side to include `point`.
    pub(crate) fn extend(&mut self, point: i32) {
        if !self.is_enclosed(point) {
            if positive_mod(point - self.end) <= positive_mod(self.start - point) {
                self.end = point;
            } else {
                self.start = point;
            }
        }
    }

    pub(crate) fn overlaps(&self, other: &CircleSector) -> bool {
        positive_mod(other.start - self.start) <= positive_mod(self.end - self.start)
            || positive_mod(self.start - other.start) <= positive_mod(other.end - other.start)
    }
}

/// A route under local search with its prefix sums.
#[derive(Debug, Clone, Default)]
pub(crate) struct RouteState {
    pub(crate) clients: Vec<usize>,
    /// `cum_dist[p]`: travel distance from the start depot to position `p`.
    cum_dist: Vec<f64>,
    /// `cum_load[p]`: demand of positions `1..=p`.
    cum_load: Vec<i32>,
    /// `cum_service[p]`: service duration of positions `1..=p`.
    cum_service: Vec<f64>,
    pub(crate) sector: CircleSector,
    pub(crate) cost: f64,
}

impl RouteState {
    pub(crate) fn new(clients: Vec<usize>) -> Self {
        Self {
            clients,
            ..Self::default()
        }
    }

    /// Recomputes prefix sums, sector and penalized cost from `clients`.
    pub(crate) fn refresh(&mut self, instance: &Instance, penalties: &Penalties) {
        let len = self.clients.len();
        self.cum_dist.clear();
        self.cum_load.clear();
        self.cum_service.clear();
        self.cum_dist.push(0.0);
        self.cum_load.push(0);
        self.cum_service.push(0.0);
        let mut prev = 0;
        for p in 1..=len + 1 {
            let node = self.node(p);
            self.cum_dist
                .push(self.cum_dist[p - 1] + instance.distance(prev, node));
            self.cum_load.push(self.cum_load[p - 1] + instance.demand(node));
            self.cum_service
                .push(self.cum_service[p - 1] + instance.service_duration(node));
            prev = node;
        }

        self.sector = match self.clients.first() {
            Some(&first) => {
                let mut s = CircleSector::at(polar_angle(instance, first));
                for &c in &self.clients[1..] {
                    s.extend(polar_angle(instance, c));
                }
                s
            }
            None => CircleSector::default(),
        };
        self.cost = route_cost(
            instance,
            penalties,
            self.distance(),
            self.load(),
            self.service(),
        );
    }

    /// Number of clients.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.clients.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Location at extended position `p` (depot at both ends).
    #[inline]
    pub(crate) fn node(&self, p: usize) -> usize {
        if p == 0 || p > self.clients.len() {
            0
        } else {
            self.clients[p - 1]
        }
    }

    #[inline]
    pub(crate) fn distance(&self) -> f64 {
        self.cum_dist[self.clients.len() + 1]
    }

    #[inline]
    pub(crate) fn load(&self) -> i32 {
        self.cum_load[self.clients.len() + 1]
    }

    #[inline]
    pub(crate) fn service(&self) -> f64 {
        self.cum_service[self.clients.len() + 1]
    }

    /// Distance travelled from position `p` to the start depot along the route.
    #[inline]
    pub(crate) fn dist_to(&self, p: usize) -> f64 {
        self.cum_dist[p]
    }

    /// Distance travelled from position `p` to the end depot.
    #[inline]
    pub(crate) fn dist_from(&self, p: usize) -> f64 {
        self.distance() - self.cum_dist[p]
    }

    /// Demand of positions `1..=p`.
    #[inline]
    pub(crate) fn load_to(&self, p: usize) -> i32 {
        self.cum_load[p]
    }

    /// Service duration of positions `1..=p`.
    #[inline]
    pub(crate) fn service_to(&self, p: usize) -> f64 {
        self.cum_service[p]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Customer;

    fn instance() -> Instance {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 1.0, 0.0, 2, 1.0),
            Customer::new(2, 2.0, 0.0, 3, 1.0),
            Customer::new(3, 2.0, 2.0, 4, 1.0),
        ];
        Instance::euclidean(customers, 10).expect("valid")
    }

    #[test]
    fn test_refresh_prefix_sums() {
        let inst = instance();
        let p = Penalties::new(1.0, 1.0).expect("valid");
        let mut r = RouteState::new(vec![1, 2, 3]);
        r.refresh(&inst, &p);
        assert_eq!(r.node(0), 0);
        assert_eq!(r.node(2), 2);
        assert_eq!(r.node(4), 0);
        // 1 + 1 + 2 + sqrt(8)
        let total = 4.0 + 8f64.sqrt();
        assert!((r.distance() - total).abs() < 1e-10);
        assert!((r.dist_to(2) - 2.0).abs() < 1e-10);
        assert!((r.dist_from(2) - (total - 2.0)).abs() < 1e-10);
        assert_eq!(r.load(), 9);
        assert_eq!(r.load_to(2), 5);
        assert!((r.service() - 3.0).abs() < 1e-10);
        assert!((r.cost - total).abs() < 1e-10);
    }

    #[test]
    fn test_refresh_empty() {
        let inst = instance();
        let p = Penalties::new(1.0, 1.0).expect("valid");
        let mut r = RouteState::new(vec![]);
        r.refresh(&inst, &p);
        assert_eq!(r.distance(), 0.0);
        assert_eq!(r.load(), 0);
        assert_eq!(r.cost, 0.0);
    }

    #[test]
    fn test_circle_sector() {
        let mut s = CircleSector::at(100);
        s.extend(200);
        assert!(s.is_enclosed(150));
        assert!(!s.is_enclosed(300));
        // Wraps around zero by the shorter side.
        let mut w = CircleSector::at(65000);
        w.extend(300);
        assert!(w.is_enclosed(0));
        assert!(!w.is_enclosed(30000));
        assert!(w.overlaps(&CircleSector::at(10)));
        assert!(!w.overlaps(&CircleSector::at(20000)));
        assert!(s.overlaps(&CircleSector::at(150)));
    }

    #[test]
    fn test_polar_angle_units() {
        let customers = vec![
            Customer::depot(1.0, 1.0),
            Customer::new(1, 11.0, 1.0, 1, 0.0),
            Customer::new(2, 1.0, 11.0, 1, 0.0),
            Customer::new(3, -9.0, 1.0, 1, 0.0),
            Customer::new(4, 1.0, -9.0, 1, 0.0),
        ];
        let inst = Instance::euclidean(customers, 10).expect("valid");
        assert_eq!(polar_angle(&inst, 1), 0);
        assert_eq!(polar_angle(&inst, 2), 16384);
        assert_eq!(polar_angle(&inst, 3), 32768);
        assert!((polar_angle(&inst, 4) - 49152).abs() <= 1);
    }
}
