//! Route metrics and the route evaluator.

use crate::models::{Instance, Route, Violation, Visit};

use super::Penalties;

/// Distance, load and service time of one route.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RouteMetrics {
    /// Depot-to-depot travel distance.
    pub distance: f64,
    /// Sum of client demands.
    pub load: i32,
    /// Sum of client service durations.
    pub service: f64,
}

impl RouteMetrics {
    /// Computes the metrics of a client sequence (depot excluded).
    pub fn of(instance: &Instance, clients: &[usize]) -> Self {
        let mut m = Self::default();
        let mut prev = 0;
        for &c in clients {
            m.distance += instance.distance(prev, c);
            m.load += instance.demand(c);
            m.service += instance.service_duration(c);
            prev = c;
        }
        if !clients.is_empty() {
            m.distance += instance.distance(prev, 0);
        }
        m
    }

    /// Load above capacity.
    pub fn capacity_excess(&self, instance: &Instance) -> f64 {
        instance.capacity_excess(self.load)
    }

    /// Duration (distance + service) above the limit.
    pub fn duration_excess(&self, instance: &Instance) -> f64 {
        instance.duration_excess(self.distance + self.service)
    }

    /// Penalized route cost.
    pub fn penalized_cost(&self, instance: &Instance, penalties: &Penalties) -> f64 {
        route_cost(instance, penalties, self.distance, self.load, self.service)
    }
}

/// `distance + pc·max(0, load − Q) + pd·max(0, distance + service − limit)`.
#[inline]
pub fn route_cost(
    instance: &Instance,
    penalties: &Penalties,
    distance: f64,
    load: i32,
    service: f64,
) -> f64 {
    penalties.penalized(
        distance,
        instance.capacity_excess(load),
        instance.duration_excess(distance + service),
    )
}

/// Builds exported routes with visit timing and load, and lists the
/// capacity and duration violations.
///
/// # Examples
///
/// ```
/// use u_hgs::models::{Customer, Instance};
/// use u_hgs::evaluation::RouteEvaluator;
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 3.0, 4.0, 10, 5.0),
///     Customer::new(2, 6.0, 8.0, 20, 5.0),
/// ];
/// let instance = Instance::euclidean(customers, 100).expect("valid");
///
/// let evaluator = RouteEvaluator::new(&instance);
/// let (route, violations) = evaluator.build_route(0, &[1, 2]);
/// assert_eq!(route.len(), 2);
/// assert!(violations.is_empty());
/// ```
pub struct RouteEvaluator<'a> {
    instance: &'a Instance,
}

impl<'a> RouteEvaluator<'a> {
    /// Creates an evaluator for the given instance.
    pub fn new(instance: &'a Instance) -> Self {
        Self { instance }
    }

    /// Builds route `index` from a sequence of client IDs.
    ///
    /// Returns the route and its violations.
    pub fn build_route(&self, index: usize, customer_ids: &[usize]) -> (Route, Vec<Violation>) {
        let inst = self.instance;
        let mut route = Route::new(index);
        let mut violations = Vec::new();
        let mut time = 0.0;
        let mut distance = 0.0;
        let mut load = 0;
        let mut prev = 0;

        for &cid in customer_ids {
            let travel = inst.distance(prev, cid);
            distance += travel;
            let arrival = time + travel;
            let departure = arrival + inst.service_duration(cid);
            load += inst.demand(cid);
            route.push_visit(Visit {
                customer_id: cid,
                arrival_time: arrival,
                departure_time: departure,
                load_after: load,
            });
            time = departure;
            prev = cid;
        }

        if !customer_ids.is_empty() {
            let back = inst.distance(prev, 0);
            distance += back;
            time += back;
        }
        route.set_totals(distance, time);

        if load > inst.capacity() {
            violations.push(Violation::CapacityExceeded {
                route_index: index,
                load,
                capacity: inst.capacity(),
            });
        }
        if let Some(limit) = inst.duration_limit() {
            if time > limit {
                violations.push(Violation::DurationExceeded {
                    route_index: index,
                    duration: time,
                    limit,
                });
            }
        }

        (route, violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Customer;

    fn setup(capacity: i32) -> Instance {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 3.0, 4.0, 10, 5.0),
            Customer::new(2, 6.0, 8.0, 20, 5.0),
            Customer::new(3, 0.0, 10.0, 15, 5.0),
        ];
        Instance::euclidean(customers, capacity).expect("valid")
    }

    #[test]
    fn test_build_route_empty() {
        let inst = setup(50);
        let (route, violations) = RouteEvaluator::new(&inst).build_route(0, &[]);
        assert!(route.is_empty());
        assert!(violations.is_empty());
        assert_eq!(route.total_distance(), 0.0);
    }

    #[test]
    fn test_build_route_single() {
        let inst = setup(50);
        let (route, violations) = RouteEvaluator::new(&inst).build_route(0, &[1]);
        assert!(violations.is_empty());
        // 0→1→0 = 10, plus service 5
        assert!((route.total_distance() - 10.0).abs() < 1e-10);
        assert!((route.total_duration() - 15.0).abs() < 1e-10);
        assert_eq!(route.total_load(), 10);
    }

    #[test]
    fn test_build_route_capacity_violated() {
        let inst = setup(25);
        let (route, violations) = RouteEvaluator::new(&inst).build_route(2, &[1, 2, 3]);
        assert_eq!(route.len(), 3);
        assert_eq!(
            violations,
            vec![Violation::CapacityExceeded {
                route_index: 2,
                load: 45,
                capacity: 25
            }]
        );
    }

    #[test]
    fn test_build_route_duration_violated() {
        let inst = setup(100).with_duration_limit(12.0).expect("valid");
        let (_, violations) = RouteEvaluator::new(&inst).build_route(0, &[1]);
        assert!(matches!(
            violations[0],
            Violation::DurationExceeded { .. }
        ));
    }

    #[test]
    fn test_timing_chain() {
        let inst = setup(100);
        let (route, _) = RouteEvaluator::new(&inst).build_route(0, &[1, 2]);
        let v1 = &route.visits()[0];
        let v2 = &route.visits()[1];
        assert!((v2.arrival_time - (v1.departure_time + inst.distance(1, 2))).abs() < 1e-10);
    }

    #[test]
    fn test_metrics_and_cost() {
        let inst = setup(25);
        let m = RouteMetrics::of(&inst, &[1, 2]);
        assert!((m.distance - 20.0).abs() < 1e-10);
        assert_eq!(m.load, 30);
        assert!((m.service - 10.0).abs() < 1e-10);
        let p = Penalties::new(2.0, 1.0).expect("valid");
        assert!((m.penalized_cost(&inst, &p) - 30.0).abs() < 1e-10);
        assert_eq!(RouteMetrics::of(&inst, &[]), RouteMetrics::default());
    }
}
